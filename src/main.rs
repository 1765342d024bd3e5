//! Main entry point for AmourCard

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use crossbeam_channel::TryRecvError;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    panic,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use amourcard::{
    audio::{AudioState, CommandAudio},
    card::CardData,
    config::Config,
    generation::GeminiGenerator,
    input::handle_event,
    logging,
    presentation::{ExportRequest, Face},
    shell::AppState,
    terminal_capabilities::detect_capabilities,
    theme::CardTheme,
    ui,
    worker::{spawn_workers, WorkerHandle, WorkerMessage, WorkerResponse},
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

/// Command line options
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    render_once: bool,
    card: Option<PathBuf>,
    dump_json: bool,
    export: bool,
    face: Face,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(a) = iter.next() {
        match a.as_str() {
            "--config" => {
                args.config = Some(PathBuf::from(iter.next().context("--config needs a path")?));
            }
            "--render-once" => args.render_once = true,
            "--card" => {
                args.card = Some(PathBuf::from(iter.next().context("--card needs a path")?));
            }
            "--dump-json" => args.dump_json = true,
            "--export" => args.export = true,
            "--face" => {
                args.face = match iter.next().as_deref() {
                    Some("front") => Face::Front,
                    Some("back") => Face::Back,
                    other => bail!("--face expects front or back, got {:?}", other),
                };
            }
            other => eprintln!("Ignoring unknown argument '{}'", other),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("could not load config from {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };

    if let Some(path) = logging::init(&config) {
        tracing::info!(log = %path.display(), "amourcard starting");
    }

    // First run: leave an editable copy of the defaults behind
    if args.config.is_none() && !Config::config_path().exists() {
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "could not write default config");
        }
    }

    let generator = GeminiGenerator::new(&config.generation)
        .context("could not set up the message generator")?;
    let workers = spawn_workers(Arc::new(generator))?;

    if args.render_once {
        let result = run_render_once(&args, &config, &workers);
        workers.shutdown();
        return result;
    }

    let capabilities = detect_capabilities();
    let audio = AudioState::new(Box::new(CommandAudio::new(config.audio.clone())));
    let mut app_state = AppState::new(config, capabilities, audio, workers.sender());

    let mut terminal = setup_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app_state, &workers);

    cleanup_terminal(terminal)?;

    // Stops the music before the workers go away
    drop(app_state);
    workers.shutdown();

    result
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, processes worker messages, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
    workers: &WorkerHandle,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);

    loop {
        let frame_start = Instant::now();

        terminal.draw(|frame| ui::render(frame, app_state, frame_start))?;

        // Poll for events with timeout
        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            let event = event::read()?;

            if let Event::Resize(width, height) = event {
                app_state.set_terminal_size(width, height);
            }

            handle_event(event, app_state, Instant::now())?;
        }

        // Process worker responses (non-blocking)
        loop {
            match workers.response_rx.try_recv() {
                Ok(response) => app_state.handle_worker_response(response, Instant::now()),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    app_state.worker_disconnected();
                    break;
                }
            }
        }

        app_state.tick(Instant::now());

        if app_state.should_quit {
            break;
        }
    }

    tracing::info!("shutting down");
    Ok(())
}

/// Batch mode: generate the message for a draft read from disk, then print
/// and/or export the finished card without starting the TUI.
fn run_render_once(args: &Args, config: &Config, workers: &WorkerHandle) -> Result<()> {
    let path = args
        .card
        .as_ref()
        .context("--render-once needs --card <file.json>")?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let draft: CardData = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid card", path.display()))?;

    if !draft.has_names() {
        bail!("the card needs both a sender and a recipient name");
    }
    if !draft.has_memory() {
        bail!("the card needs a favourite memory");
    }

    let wait = Duration::from_secs(config.generation.request_timeout_secs + 5);

    workers
        .sender()
        .send(WorkerMessage::Generate { draft })
        .context("generation worker unavailable")?;

    let card = match workers.response_rx.recv_timeout(wait)? {
        WorkerResponse::MessageReady { draft, message } => draft.finalize(message.text)?,
        WorkerResponse::GenerationAborted(reason) => bail!("generation failed: {}", reason),
        other => bail!("unexpected worker response: {:?}", other),
    };

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&card)?);
    }

    if args.export {
        let prefs = config.export.clone();
        let request = ExportRequest {
            theme: CardTheme::for_vibe(card.vibe),
            face: args.face,
            path: prefs.output_dir.join(card.export_file_name()),
            card: Arc::new(card),
        };
        workers
            .sender()
            .send(WorkerMessage::Export { request, prefs })
            .context("export worker unavailable")?;

        match workers.response_rx.recv_timeout(Duration::from_secs(30))? {
            WorkerResponse::ExportComplete { path } => println!("Saved {}", path.display()),
            WorkerResponse::ExportFailed(error) => bail!("export failed: {}", error),
            other => bail!("unexpected worker response: {:?}", other),
        }
    } else if !args.dump_json {
        if let Some(message) = &card.ai_message {
            println!("{}", message);
        }
    }

    Ok(())
}
