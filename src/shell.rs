//! Application state management
//!
//! Single source of truth for the running app: which view is up, the form,
//! the opened card, music, and the one blocking alert.

use std::sync::Arc;
use std::time::Instant;

use crate::audio::AudioState;
use crate::card::CardData;
use crate::config::Config;
use crate::effects::Timer;
use crate::form::FormWorkflow;
use crate::presentation::{CardView, Face};
use crate::terminal_capabilities::TerminalCapabilities;
use crate::worker::{WorkerMessage, WorkerResponse, WorkerSender};

/// Shown when a submission could not be turned into a card
pub const ORCHESTRATION_ALERT: &str =
    "Something went wrong baking the birthday surprise. Please try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    Card,
}

/// Main application state
pub struct AppState {
    pub view: View,
    pub form: FormWorkflow,
    pub card: Option<CardView>,
    pub audio: AudioState,
    /// Blocking message; all other input waits until it is dismissed
    pub alert: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,

    pub status_message: String,
    pub status_is_error: bool,

    pub terminal_size: (u16, u16),
    pub capabilities: TerminalCapabilities,
    pub config: Config,

    autoplay: Timer,
    worker_tx: WorkerSender,
}

impl AppState {
    pub fn new(
        config: Config,
        capabilities: TerminalCapabilities,
        audio: AudioState,
        worker_tx: WorkerSender,
    ) -> Self {
        Self {
            view: View::Form,
            form: FormWorkflow::new(),
            card: None,
            audio,
            alert: None,
            show_help: false,
            should_quit: false,

            status_message: "Ready - Press [F1] for help".to_string(),
            status_is_error: false,

            terminal_size: capabilities.size,
            capabilities,
            config,

            autoplay: Timer::idle(),
            worker_tx,
        }
    }

    /// Set status message
    pub fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = message.to_string();
        self.status_is_error = is_error;
    }

    /// Update terminal size on resize
    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    pub fn autoplay_pending(&self) -> bool {
        self.autoplay.is_pending()
    }

    /// Commit the photo path typed into the form.
    pub fn choose_photo(&mut self) {
        let Some(request) = self.form.begin_photo() else {
            return;
        };

        self.set_status("Preparing photo...", false);
        let message = WorkerMessage::LoadPhoto {
            token: request.token,
            path: request.path,
        };
        if self.worker_tx.send(message).is_err() {
            self.form
                .complete_photo(request.token, Err("background worker unavailable".to_string()));
            self.set_status("Could not process the photo", true);
        }
    }

    /// Hand the finished form to the generation worker.
    pub fn submit(&mut self) {
        match self.form.submit() {
            Ok(draft) => {
                tracing::info!(
                    recipient = %draft.recipient_name,
                    vibe = draft.vibe.name(),
                    tone = draft.tone.name(),
                    "card submitted"
                );
                self.set_status("Baking your birthday surprise...", false);
                if self.worker_tx.send(WorkerMessage::Generate { draft }).is_err() {
                    self.orchestration_failed("generation worker unavailable");
                }
            }
            Err(e) => self.set_status(&e.to_string(), true),
        }
    }

    /// Handle response from worker thread
    pub fn handle_worker_response(&mut self, response: WorkerResponse, now: Instant) {
        match response {
            WorkerResponse::PhotoReady { token, result } => {
                let failed = result.as_ref().err().cloned();
                if self.form.complete_photo(token, result) {
                    match failed {
                        Some(error) => self.set_status(&format!("Photo failed: {}", error), true),
                        None => self.set_status("Photo attached", false),
                    }
                }
            }

            WorkerResponse::MessageReady { draft, message } => {
                if !self.form.is_submitting() {
                    tracing::debug!("dropping message for a form that is no longer submitting");
                    return;
                }
                match draft.finalize(message.text) {
                    Ok(card) => self.show_card(card, now),
                    Err(e) => self.orchestration_failed(&e.to_string()),
                }
            }

            WorkerResponse::GenerationAborted(reason) => {
                if self.form.is_submitting() {
                    self.orchestration_failed(&reason);
                }
            }

            WorkerResponse::ExportComplete { path } => {
                if let Some(card) = &mut self.card {
                    card.finish_export();
                }
                self.set_status(&format!("Saved {}", path.display()), false);
            }

            WorkerResponse::ExportFailed(error) => {
                if let Some(card) = &mut self.card {
                    card.finish_export();
                }
                self.set_status(&format!("Export failed: {}", error), true);
            }
        }
    }

    fn show_card(&mut self, card: CardData, now: Instant) {
        tracing::info!(id = card.id.as_deref().unwrap_or_default(), "card ready");
        let view = CardView::new(Arc::new(card), self.config.timing.clone());
        self.card = Some(view);
        self.view = View::Card;
        self.autoplay = Timer::start(now, self.config.timing.autoplay_delay());
        self.set_status("Your card is ready! Press [Enter] to open the gift", false);
    }

    /// Submission could not produce a card: alert and hand the form back.
    pub fn orchestration_failed(&mut self, reason: &str) {
        tracing::error!(%reason, "card creation failed");
        self.form.submission_failed();
        self.view = View::Form;
        self.alert = Some(ORCHESTRATION_ALERT.to_string());
        self.set_status("Card creation failed", true);
    }

    /// The worker side hung up while a submission was in flight
    pub fn worker_disconnected(&mut self) {
        if self.form.is_submitting() {
            self.orchestration_failed("worker channel disconnected");
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Poll timers once per frame.
    pub fn tick(&mut self, now: Instant) {
        if let Some(card) = &mut self.card {
            if card.tick(now) {
                self.set_status("Press [F] to read your message", false);
            }
        }

        if self.autoplay.fired(now) {
            self.autoplay_music();
        }

        if self.audio.sync() {
            self.set_status("Music stopped", false);
        }
    }

    fn autoplay_music(&mut self) {
        if self.view != View::Card || self.audio.is_playing() {
            return;
        }
        if let Err(e) = self.audio.play() {
            tracing::debug!(error = %e, "autoplay blocked");
        }
    }

    pub fn toggle_audio(&mut self) {
        match self.audio.toggle() {
            Ok(true) => self.set_status("Music on", false),
            Ok(false) => self.set_status("Music paused", false),
            Err(e) => {
                tracing::debug!(error = %e, "could not start music");
                self.set_status("Music unavailable - install mpv or check [audio] in the config", true);
            }
        }
    }

    /// Open the gift, or flip the card once it is open.
    pub fn activate_card(&mut self, now: Instant) {
        let Some(card) = &mut self.card else {
            return;
        };
        if !card.activate(now) {
            self.flip_card();
        }
    }

    pub fn flip_card(&mut self) {
        if let Some(face) = self.card.as_mut().and_then(|card| card.flip()) {
            match face {
                Face::Front => self.set_status("Front of the card", false),
                Face::Back => self.set_status("A message for you", false),
            }
        }
    }

    /// Start exporting the visible face.
    pub fn export_card(&mut self) {
        let output_dir = self.config.export.output_dir.clone();
        let Some(request) = self
            .card
            .as_mut()
            .and_then(|card| card.begin_export(&output_dir))
        else {
            return;
        };

        self.set_status("Capturing your card...", false);
        let message = WorkerMessage::Export {
            request,
            prefs: self.config.export.clone(),
        };
        if self.worker_tx.send(message).is_err() {
            if let Some(card) = &mut self.card {
                card.finish_export();
            }
            self.set_status("Export failed: background worker unavailable", true);
        }
    }

    /// Drop the card and start over. Music keeps its state.
    pub fn new_card(&mut self) {
        self.card = None;
        self.autoplay.cancel();
        self.form = FormWorkflow::new();
        self.view = View::Form;
        self.set_status("Let's make another one", false);
    }

    /// Put the generated message on the system clipboard.
    pub fn copy_message(&mut self) {
        let Some(text) = self
            .card
            .as_ref()
            .and_then(|card| card.card().ai_message.clone())
        else {
            self.set_status("Nothing to copy yet", false);
            return;
        };

        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text) {
                Ok(_) => {
                    self.set_status("Message copied to clipboard", false);
                }
                Err(e) => {
                    self.set_status(&format!("Copy failed: {}", e), true);
                }
            },
            Err(e) => {
                self.set_status(&format!("Clipboard unavailable: {}", e), true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBackend;
    use crate::error::{CardError, Result};
    use crate::form::FormField;
    use crate::generation::GeneratedMessage;
    use crate::presentation::CardPhase;
    use crossbeam_channel::{unbounded, Receiver};
    use std::time::Duration;

    struct Speaker {
        works: bool,
    }

    impl AudioBackend for Speaker {
        fn play(&mut self) -> Result<()> {
            if self.works {
                Ok(())
            } else {
                Err(CardError::Audio("blocked".to_string()))
            }
        }
        fn pause(&mut self) {}
        fn is_available(&self) -> bool {
            self.works
        }
    }

    /// State wired to in-memory channels so requests can be inspected
    fn app(audio_works: bool) -> (AppState, Receiver<WorkerMessage>, Receiver<WorkerMessage>) {
        let (pool_tx, pool_rx) = unbounded();
        let (generation_tx, generation_rx) = unbounded();
        let sender = WorkerSender::from_channels(pool_tx, generation_tx);
        let state = AppState::new(
            Config::default(),
            TerminalCapabilities::default(),
            AudioState::new(Box::new(Speaker { works: audio_works })),
            sender,
        );
        (state, pool_rx, generation_rx)
    }

    fn fill_and_submit(state: &mut AppState) {
        state.form.set_text(FormField::SenderName, "Alex".to_string());
        state.form.set_text(FormField::RecipientName, "Sam".to_string());
        state.form.advance().unwrap();
        state.form.advance().unwrap();
        state.form.set_text(FormField::FavMemory, "beach trip".to_string());
        state.submit();
    }

    fn deliver(state: &mut AppState, generation_rx: &Receiver<WorkerMessage>, now: Instant) {
        let Ok(WorkerMessage::Generate { draft }) = generation_rx.try_recv() else {
            panic!("no generation request");
        };
        let message = GeneratedMessage {
            text: "Happy birthday Sam!".to_string(),
        };
        state.handle_worker_response(WorkerResponse::MessageReady { draft, message }, now);
    }

    #[test]
    fn test_submit_then_message_shows_card() {
        let (mut state, _pool, generation) = app(true);
        let now = Instant::now();
        fill_and_submit(&mut state);
        assert!(state.form.is_submitting());

        deliver(&mut state, &generation, now);
        assert_eq!(state.view, View::Card);
        let card = state.card.as_ref().unwrap().card();
        assert!(card.is_finalized());
        assert_eq!(card.ai_message.as_deref(), Some("Happy birthday Sam!"));
        assert!(state.autoplay_pending());
    }

    #[test]
    fn test_aborted_generation_raises_alert() {
        let (mut state, _pool, _generation) = app(true);
        fill_and_submit(&mut state);

        state.handle_worker_response(
            WorkerResponse::GenerationAborted("boom".to_string()),
            Instant::now(),
        );
        assert_eq!(state.view, View::Form);
        assert_eq!(state.alert.as_deref(), Some(ORCHESTRATION_ALERT));
        assert!(!state.form.is_submitting());
        assert_eq!(state.form.draft().recipient_name, "Sam");
    }

    #[test]
    fn test_finalized_draft_is_an_orchestration_failure() {
        let (mut state, _pool, _generation) = app(true);
        fill_and_submit(&mut state);

        let draft = CardData::default().finalize("x".to_string()).unwrap();
        let message = GeneratedMessage {
            text: "again".to_string(),
        };
        state.handle_worker_response(WorkerResponse::MessageReady { draft, message }, Instant::now());
        assert!(state.alert.is_some());
        assert!(state.card.is_none());
    }

    #[test]
    fn test_disconnected_worker_while_submitting() {
        let (mut state, _pool, generation) = app(true);
        drop(generation);
        fill_and_submit(&mut state);
        assert!(state.alert.is_some());
        assert!(!state.form.is_submitting());
    }

    #[test]
    fn test_autoplay_after_delay() {
        let (mut state, _pool, generation) = app(true);
        let now = Instant::now();
        fill_and_submit(&mut state);
        deliver(&mut state, &generation, now);

        state.tick(now + Duration::from_millis(1999));
        assert!(!state.audio.is_playing());
        state.tick(now + Duration::from_millis(2000));
        assert!(state.audio.is_playing());
    }

    #[test]
    fn test_blocked_autoplay_is_absorbed() {
        let (mut state, _pool, generation) = app(false);
        let now = Instant::now();
        fill_and_submit(&mut state);
        deliver(&mut state, &generation, now);

        state.tick(now + Duration::from_millis(2000));
        assert!(!state.audio.is_playing());
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_toggle_audio_only_sets_flag_on_success() {
        let (mut state, _pool, _generation) = app(false);
        state.toggle_audio();
        assert!(!state.audio.is_playing());
        assert!(state.status_is_error);
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_new_card_resets_form_and_cancels_autoplay() {
        let (mut state, _pool, generation) = app(true);
        let now = Instant::now();
        fill_and_submit(&mut state);
        deliver(&mut state, &generation, now);

        state.new_card();
        assert_eq!(state.view, View::Form);
        assert!(state.card.is_none());
        assert!(!state.autoplay_pending());
        assert_eq!(state.form.draft(), &CardData::default());

        state.tick(now + Duration::from_secs(5));
        assert!(!state.audio.is_playing());
    }

    #[test]
    fn test_activate_opens_then_flips() {
        let (mut state, _pool, generation) = app(true);
        let now = Instant::now();
        fill_and_submit(&mut state);
        deliver(&mut state, &generation, now);

        state.activate_card(now);
        state.activate_card(now + Duration::from_millis(10));
        assert!(matches!(
            state.card.as_ref().unwrap().phase(),
            CardPhase::Opening { .. }
        ));

        state.tick(now + Duration::from_millis(1200));
        state.activate_card(now + Duration::from_millis(1300));
        assert_eq!(state.card.as_ref().unwrap().visible_face(), Some(Face::Back));
    }

    #[test]
    fn test_export_request_and_completion() {
        let (mut state, pool, generation) = app(true);
        let now = Instant::now();
        fill_and_submit(&mut state);
        deliver(&mut state, &generation, now);
        state.activate_card(now);
        state.tick(now + Duration::from_millis(1200));

        state.export_card();
        let Ok(WorkerMessage::Export { request, .. }) = pool.try_recv() else {
            panic!("no export request");
        };
        assert_eq!(request.face, Face::Front);
        assert!(state.card.as_ref().unwrap().is_exporting());

        state.export_card();
        assert!(pool.try_recv().is_err());

        state.handle_worker_response(WorkerResponse::ExportFailed("disk full".to_string()), now);
        assert!(!state.card.as_ref().unwrap().is_exporting());
        assert!(state.status_is_error);
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_stale_photo_is_ignored() {
        let (mut state, pool, _generation) = app(true);
        state.form.set_text(FormField::Photo, "/tmp/a.png".to_string());
        state.choose_photo();
        state.form.set_text(FormField::Photo, "/tmp/b.png".to_string());
        state.choose_photo();

        let Ok(WorkerMessage::LoadPhoto { token: first, .. }) = pool.try_recv() else {
            panic!("no photo request");
        };
        state.handle_worker_response(
            WorkerResponse::PhotoReady {
                token: first,
                result: Err("late".to_string()),
            },
            Instant::now(),
        );
        assert!(state.form.photo_pending());
    }
}
