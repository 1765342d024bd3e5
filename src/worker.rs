//! Worker thread management
//!
//! Photo conversion and PNG export run on a small pool of threads; message
//! generation gets its own thread owning a tokio runtime. The UI loop talks
//! to both through one [`WorkerSender`] and drains a single response channel.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, SendError, Sender};

use crate::card::CardData;
use crate::config::ExportPreferences;
use crate::error::{CardError, Result};
use crate::export;
use crate::generation::{GeneratedMessage, MessageClient, TextGenerator};
use crate::photo::EmbeddedPhoto;
use crate::presentation::ExportRequest;

/// Messages sent from the main thread to the workers
#[derive(Debug)]
pub enum WorkerMessage {
    /// Decode, downscale and embed a photo
    LoadPhoto { token: u64, path: PathBuf },
    /// Ask the generation service for the card's message
    Generate { draft: CardData },
    /// Rasterize a face and write it to disk
    Export {
        request: ExportRequest,
        prefs: ExportPreferences,
    },
    Shutdown,
}

/// Responses sent from the workers to the main thread
#[derive(Debug)]
pub enum WorkerResponse {
    PhotoReady {
        token: u64,
        result: std::result::Result<EmbeddedPhoto, String>,
    },
    MessageReady {
        draft: CardData,
        message: GeneratedMessage,
    },
    /// Generation could not run at all
    GenerationAborted(String),
    ExportComplete { path: PathBuf },
    ExportFailed(String),
}

/// Routes requests to the right worker
#[derive(Debug, Clone)]
pub struct WorkerSender {
    pool_tx: Sender<WorkerMessage>,
    generation_tx: Sender<WorkerMessage>,
}

impl WorkerSender {
    /// Wire a sender to caller-owned channels
    pub fn from_channels(pool_tx: Sender<WorkerMessage>, generation_tx: Sender<WorkerMessage>) -> Self {
        Self {
            pool_tx,
            generation_tx,
        }
    }

    pub fn send(&self, message: WorkerMessage) -> std::result::Result<(), SendError<WorkerMessage>> {
        match message {
            WorkerMessage::Generate { .. } => self.generation_tx.send(message),
            WorkerMessage::LoadPhoto { .. }
            | WorkerMessage::Export { .. }
            | WorkerMessage::Shutdown => self.pool_tx.send(message),
        }
    }
}

/// Handle to worker threads and channels
pub struct WorkerHandle {
    sender: WorkerSender,
    pub response_rx: Receiver<WorkerResponse>,
    pool: Vec<JoinHandle<()>>,
    generation: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn sender(&self) -> WorkerSender {
        self.sender.clone()
    }

    /// Shutdown all worker threads
    pub fn shutdown(self) {
        for _ in &self.pool {
            let _ = self.sender.pool_tx.send(WorkerMessage::Shutdown);
        }
        let _ = self.sender.generation_tx.send(WorkerMessage::Shutdown);

        for handle in self.pool {
            let _ = handle.join();
        }
        let _ = self.generation.join();
    }
}

/// Spawn the pool and the generation worker
pub fn spawn_workers(generator: Arc<dyn TextGenerator>) -> Result<WorkerHandle> {
    let (pool_tx, pool_rx) = unbounded::<WorkerMessage>();
    let (generation_tx, generation_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();

    let num_workers = num_cpus().clamp(1, 2);
    let mut pool = Vec::with_capacity(num_workers);

    for id in 0..num_workers {
        let rx = pool_rx.clone();
        let tx = response_tx.clone();

        let handle = thread::Builder::new()
            .name(format!("card-worker-{}", id))
            .spawn(move || pool_loop(rx, tx))?;
        pool.push(handle);
    }

    let client = MessageClient::new(generator);
    let generation = thread::Builder::new()
        .name("generation-worker".to_string())
        .spawn(move || generation_loop(client, generation_rx, response_tx))?;

    Ok(WorkerHandle {
        sender: WorkerSender {
            pool_tx,
            generation_tx,
        },
        response_rx,
        pool,
        generation,
    })
}

fn pool_loop(rx: Receiver<WorkerMessage>, tx: Sender<WorkerResponse>) {
    while let Ok(msg) = rx.recv() {
        let response = match msg {
            WorkerMessage::Shutdown => break,

            WorkerMessage::LoadPhoto { token, path } => {
                let result = EmbeddedPhoto::from_path(&path).map_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "photo load failed");
                    e.to_string()
                });
                WorkerResponse::PhotoReady { token, result }
            }

            WorkerMessage::Export { request, prefs } => {
                match export::save_face(&request, &prefs) {
                    Ok(path) => WorkerResponse::ExportComplete { path },
                    Err(e) => {
                        tracing::error!(error = %e, "export failed");
                        WorkerResponse::ExportFailed(e.to_string())
                    }
                }
            }

            WorkerMessage::Generate { .. } => {
                WorkerResponse::GenerationAborted("generation sent to the wrong worker".to_string())
            }
        };

        if tx.send(response).is_err() {
            break;
        }
    }
}

fn generation_loop(client: MessageClient, rx: Receiver<WorkerMessage>, tx: Sender<WorkerResponse>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CardError::Worker(format!("could not start async runtime: {}", e)));

    while let Ok(msg) = rx.recv() {
        let draft = match msg {
            WorkerMessage::Shutdown => break,
            WorkerMessage::Generate { draft } => draft,
            WorkerMessage::LoadPhoto { .. } | WorkerMessage::Export { .. } => continue,
        };

        let response = match &runtime {
            Ok(runtime) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    runtime.block_on(client.generate(&draft))
                }));
                match outcome {
                    Ok(message) => WorkerResponse::MessageReady { draft, message },
                    Err(_) => {
                        tracing::error!("generation task panicked");
                        WorkerResponse::GenerationAborted("generation task panicked".to_string())
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "generation unavailable");
                WorkerResponse::GenerationAborted(e.to_string())
            }
        };

        if tx.send(response).is_err() {
            break;
        }
    }
}

/// Get number of CPUs (fallback to 1)
fn num_cpus() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
