//! Integration tests for AmourCard

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use amourcard::audio::{AudioBackend, AudioState};
use amourcard::card::{CardData, Relation, Tone, Vibe};
use amourcard::config::Config;
use amourcard::error::{CardError, GenerationError};
use amourcard::form::FormField;
use amourcard::generation::{TextGenerator, EMPTY_RESPONSE_FALLBACK, SERVICE_FAILURE_FALLBACK};
use amourcard::shell::{AppState, View};
use amourcard::terminal_capabilities::TerminalCapabilities;
use amourcard::worker::{spawn_workers, WorkerHandle, WorkerMessage, WorkerResponse, WorkerSender};
use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver};

/// Generator with a fixed answer
struct Scripted(std::result::Result<&'static str, u16>);

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, _prompt: &str) -> std::result::Result<String, GenerationError> {
        match self.0 {
            Ok(text) => Ok(text.to_string()),
            Err(status) => Err(GenerationError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

struct Mute;

impl AudioBackend for Mute {
    fn play(&mut self) -> amourcard::Result<()> {
        Err(CardError::Audio("no player in tests".to_string()))
    }
    fn pause(&mut self) {}
    fn is_available(&self) -> bool {
        false
    }
}

fn app_with(sender: WorkerSender) -> AppState {
    AppState::new(
        Config::default(),
        TerminalCapabilities::default(),
        AudioState::new(Box::new(Mute)),
        sender,
    )
}

/// State wired to channels nobody serves, for inspecting requests
fn detached_app() -> (AppState, Receiver<WorkerMessage>, Receiver<WorkerMessage>) {
    let (pool_tx, pool_rx) = unbounded();
    let (generation_tx, generation_rx) = unbounded();
    (
        app_with(WorkerSender::from_channels(pool_tx, generation_tx)),
        pool_rx,
        generation_rx,
    )
}

fn fill_alex_and_sam(state: &mut AppState) {
    state.form.set_text(FormField::SenderName, "Alex".to_string());
    state.form.set_text(FormField::RecipientName, "Sam".to_string());
    state.form.cycle_choice(FormField::Relation, true); // Boyfriend -> Girlfriend
    state.form.advance().unwrap();
    state.form.cycle_choice(FormField::Vibe, false); // Vibrant Party -> Soft Pastel
    state.form.advance().unwrap();
    state.form.set_text(FormField::FavMemory, "beach trip".to_string());
}

/// Pump worker responses until the submission settles
fn settle(state: &mut AppState, workers: &WorkerHandle) {
    while state.form.is_submitting() {
        let response = workers
            .response_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("worker response");
        state.handle_worker_response(response, Instant::now());
    }
}

fn submit_with(generator: Scripted) -> CardData {
    let workers = spawn_workers(Arc::new(generator)).unwrap();
    let mut state = app_with(workers.sender());

    fill_alex_and_sam(&mut state);
    state.submit();
    settle(&mut state, &workers);

    assert_eq!(state.view, View::Card);
    assert!(state.alert.is_none());
    let card = state.card.as_ref().unwrap().card().clone();
    workers.shutdown();
    card
}

mod workflow_tests {
    use super::*;

    #[test]
    fn test_submission_yields_finalized_card() {
        let card = submit_with(Scripted(Ok("Happy birthday, Sam!")));

        assert!(card.is_finalized());
        assert!(card.created_at.is_some());
        assert_eq!(card.ai_message.as_deref(), Some("Happy birthday, Sam!"));
        assert_eq!(card.relation, Relation::Girlfriend);
        assert_eq!(card.vibe, Vibe::SoftPastel);
        assert_eq!(card.tone, Tone::Hype);
        assert_eq!(card.fav_memory, "beach trip");
        assert!(card.photo.is_none());
    }

    #[test]
    fn test_failing_service_uses_failure_fallback() {
        let card = submit_with(Scripted(Err(500)));
        assert_eq!(card.ai_message.as_deref(), Some(SERVICE_FAILURE_FALLBACK));
    }

    #[test]
    fn test_empty_answer_uses_empty_fallback() {
        let card = submit_with(Scripted(Ok("")));
        assert_eq!(card.ai_message.as_deref(), Some(EMPTY_RESPONSE_FALLBACK));
    }

    #[test]
    fn test_photo_blocks_submit_until_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("us.png");
        image::DynamicImage::ImageRgb8(image::RgbImage::new(16, 16))
            .save(&path)
            .unwrap();

        let workers = spawn_workers(Arc::new(Scripted(Ok("Hi")))).unwrap();
        let mut state = app_with(workers.sender());
        fill_alex_and_sam(&mut state);

        state
            .form
            .set_text(FormField::Photo, path.display().to_string());
        state.choose_photo();
        assert!(state.form.photo_pending());
        assert!(!state.form.can_submit());

        let response = workers
            .response_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        state.handle_worker_response(response, Instant::now());

        assert!(!state.form.photo_pending());
        assert!(state.form.can_submit());
        let photo = state.form.draft().photo.clone().unwrap();
        assert!(photo.as_data_url().starts_with("data:image/"));

        workers.shutdown();
    }

    #[test]
    fn test_no_photo_does_not_block_submit() {
        let (mut state, _pool, _generation) = detached_app();
        fill_alex_and_sam(&mut state);
        assert!(state.form.draft().photo.is_none());
        assert!(state.form.can_submit());
    }

    #[test]
    fn test_back_keeps_values() {
        let (mut state, _pool, _generation) = detached_app();
        fill_alex_and_sam(&mut state);
        let before = state.form.draft().clone();

        state.form.back();
        state.form.back();
        assert_eq!(state.form.draft(), &before);
    }

    #[test]
    fn test_dropped_workers_raise_alert() {
        let (pool_tx, _pool_rx) = unbounded();
        let (generation_tx, generation_rx) = unbounded();
        let mut state = app_with(WorkerSender::from_channels(pool_tx, generation_tx));
        fill_alex_and_sam(&mut state);
        drop(generation_rx);

        state.submit();
        assert!(state.alert.is_some());
        assert!(!state.form.is_submitting());
        assert_eq!(state.view, View::Form);
    }
}

mod presentation_tests {
    use super::*;
    use amourcard::presentation::{CardPhase, Face};

    fn opened_app() -> (AppState, Receiver<WorkerMessage>, Instant) {
        let (mut state, pool_rx, generation_rx) = detached_app();
        fill_alex_and_sam(&mut state);
        state.submit();

        let Ok(WorkerMessage::Generate { draft }) = generation_rx.try_recv() else {
            panic!("expected a generation request");
        };
        let start = Instant::now();
        state.handle_worker_response(
            WorkerResponse::MessageReady {
                draft,
                message: amourcard::generation::GeneratedMessage {
                    text: "Happy birthday!".to_string(),
                },
            },
            start,
        );
        (state, pool_rx, start)
    }

    #[test]
    fn test_opening_is_idempotent() {
        let (mut state, _pool, start) = opened_app();

        state.activate_card(start);
        let phase = state.card.as_ref().unwrap().phase();
        assert!(matches!(phase, CardPhase::Opening { .. }));

        state.activate_card(start + Duration::from_millis(300));
        state.activate_card(start + Duration::from_millis(600));
        assert_eq!(state.card.as_ref().unwrap().phase(), phase);

        state.tick(start + Duration::from_millis(1200));
        assert_eq!(
            state.card.as_ref().unwrap().phase(),
            CardPhase::Open { face: Face::Front }
        );
    }

    #[test]
    fn test_export_follows_visible_face() {
        let (mut state, pool_rx, start) = opened_app();
        state.activate_card(start);
        state.tick(start + Duration::from_millis(1200));

        state.flip_card();
        state.flip_card();
        assert_eq!(
            state.card.as_ref().unwrap().visible_face(),
            Some(Face::Front)
        );

        state.flip_card();
        state.export_card();
        match pool_rx.try_recv() {
            Ok(WorkerMessage::Export { request, .. }) => {
                assert_eq!(request.face, Face::Back);
                assert_eq!(
                    request.path.file_name().and_then(|n| n.to_str()),
                    Some("Sam-BirthdayCard.png")
                );
            }
            other => panic!("expected an export request, got {:?}", other),
        }

        // Busy until the worker answers
        state.export_card();
        assert!(pool_rx.try_recv().is_err());

        state.handle_worker_response(
            WorkerResponse::ExportFailed("disk full".to_string()),
            start + Duration::from_secs(3),
        );
        assert!(state.status_is_error);
        assert!(state.alert.is_none());
        state.export_card();
        assert!(pool_rx.try_recv().is_ok());
    }

    #[test]
    fn test_new_card_resets_form() {
        let (mut state, _pool, _start) = opened_app();
        state.new_card();
        assert_eq!(state.view, View::Form);
        assert!(state.card.is_none());
        assert_eq!(state.form.draft(), &CardData::default());
        assert!(!state.autoplay_pending());
    }
}

mod input_tests {
    use super::*;
    use amourcard::form::FormStep;
    use amourcard::input::handle_event;
    use amourcard::photo::EmbeddedPhoto;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    fn press(state: &mut AppState, code: KeyCode) {
        let event = Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        handle_event(event, state, Instant::now()).unwrap();
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let (mut state, _pool, _generation) = detached_app();
        type_text(&mut state, "Alex");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Sam");
        press(&mut state, KeyCode::Backspace);
        type_text(&mut state, "m");

        assert_eq!(state.form.draft().sender_name, "Alex");
        assert_eq!(state.form.draft().recipient_name, "Sam");
    }

    #[test]
    fn test_enter_does_not_advance_incomplete_step() {
        let (mut state, _pool, _generation) = detached_app();
        type_text(&mut state, "Alex");
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.form.step(), FormStep::BasicInfo);
        assert!(state.status_is_error);

        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Sam");
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.form.step(), FormStep::StyleAndTone);
    }

    #[test]
    fn test_q_is_text_in_name_fields() {
        let (mut state, _pool, _generation) = detached_app();
        type_text(&mut state, "Quinn");
        assert!(!state.should_quit);
        assert_eq!(state.form.draft().sender_name, "Quinn");
    }

    #[test]
    fn test_alert_swallows_keys_until_dismissed() {
        let (mut state, _pool, _generation) = detached_app();
        state.alert = Some("boom".to_string());

        type_text(&mut state, "Alex");
        assert!(state.form.draft().sender_name.is_empty());

        press(&mut state, KeyCode::Enter);
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_f1_toggles_help() {
        let (mut state, _pool, _generation) = detached_app();
        press(&mut state, KeyCode::F(1));
        assert!(state.show_help);
        press(&mut state, KeyCode::Esc);
        assert!(!state.show_help);
    }

    #[test]
    fn test_page_down_loads_typed_photo_before_submitting() {
        let (mut state, pool, generation) = detached_app();
        fill_alex_and_sam(&mut state);

        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "/tmp/us.png");
        press(&mut state, KeyCode::PageDown);

        let token = match pool.try_recv() {
            Ok(WorkerMessage::LoadPhoto { token, path }) => {
                assert_eq!(path, Path::new("/tmp/us.png"));
                token
            }
            other => panic!("expected a photo request, got {:?}", other.map(|_| ())),
        };
        assert!(generation.try_recv().is_err());
        assert!(!state.form.is_submitting());

        // Still loading: a second press waits
        press(&mut state, KeyCode::PageDown);
        assert!(generation.try_recv().is_err());

        let photo = EmbeddedPhoto::from_image(&image::DynamicImage::ImageRgb8(
            image::RgbImage::new(4, 4),
        ))
        .unwrap();
        state.handle_worker_response(
            WorkerResponse::PhotoReady {
                token,
                result: Ok(photo),
            },
            Instant::now(),
        );

        press(&mut state, KeyCode::PageDown);
        match generation.try_recv() {
            Ok(WorkerMessage::Generate { draft }) => assert!(draft.photo.is_some()),
            other => panic!("expected a generation request, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_enter_on_memory_loads_typed_photo() {
        let (mut state, pool, generation) = detached_app();
        fill_alex_and_sam(&mut state);

        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "/tmp/us.png");
        press(&mut state, KeyCode::BackTab);
        press(&mut state, KeyCode::Enter);

        assert!(matches!(pool.try_recv(), Ok(WorkerMessage::LoadPhoto { .. })));
        assert!(generation.try_recv().is_err());
        assert!(state.form.photo_pending());
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut state, _pool, _generation) = detached_app();
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(event, &mut state, Instant::now()).unwrap();
        assert!(state.should_quit);
    }
}

mod form_properties {
    use super::*;
    use amourcard::form::{FormStep, FormWorkflow};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn advance_requires_both_names(sender in "[ a-zA-Z]{0,8}", recipient in "[ a-zA-Z]{0,8}") {
            let mut form = FormWorkflow::new();
            form.set_text(FormField::SenderName, sender.clone());
            form.set_text(FormField::RecipientName, recipient.clone());

            let expected = !sender.trim().is_empty() && !recipient.trim().is_empty();
            prop_assert_eq!(form.can_advance(), expected);
            prop_assert_eq!(form.advance().is_ok(), expected);
        }

        #[test]
        fn back_never_discards(
            sender in "[a-zA-Z]{1,8}",
            recipient in "[a-zA-Z]{1,8}",
            memory in "[a-z ]{0,20}",
            vibe_steps in 0usize..4,
        ) {
            let mut form = FormWorkflow::new();
            form.set_text(FormField::SenderName, sender);
            form.set_text(FormField::RecipientName, recipient);
            form.advance().unwrap();
            for _ in 0..vibe_steps {
                form.cycle_choice(FormField::Vibe, true);
            }
            form.advance().unwrap();
            form.set_text(FormField::FavMemory, memory);
            let before = form.draft().clone();

            prop_assert_eq!(form.back(), FormStep::StyleAndTone);
            prop_assert_eq!(form.back(), FormStep::BasicInfo);
            prop_assert_eq!(form.back(), FormStep::BasicInfo);
            prop_assert_eq!(form.draft(), &before);
        }
    }
}

mod gemini_tests {
    use super::*;
    use amourcard::config::GenerationPreferences;
    use amourcard::generation::GeminiGenerator;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prefs(server: &MockServer) -> GenerationPreferences {
        GenerationPreferences {
            base_url: server.uri(),
            model: "test-model".to_string(),
            api_key: Some("secret".to_string()),
            ..GenerationPreferences::default()
        }
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Happy birthday!" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&prefs(&server)).unwrap();
        let text = generator.generate("hello").await.unwrap();
        assert_eq!(text, "Happy birthday!");
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&prefs(&server)).unwrap();
        match generator.generate("hello").await {
            Err(GenerationError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&prefs(&server)).unwrap();
        assert!(matches!(
            generator.generate("hello").await,
            Err(GenerationError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut prefs = prefs(&server);
        prefs.api_key = Some(String::new());
        let generator = GeminiGenerator::new(&prefs).unwrap();

        // The environment may still provide a key; only assert when it does not
        if prefs.resolve_api_key().is_none() {
            assert!(matches!(
                generator.generate("hello").await,
                Err(GenerationError::MissingApiKey)
            ));
        }
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.timing.gift_open_ms = 500;
        config.export.output_dir = Path::new("/tmp/cards").to_path_buf();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timing.gift_open_ms, 500);
        assert_eq!(loaded.export.output_dir, Path::new("/tmp/cards"));
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.timing.gift_open_ms, 1200);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timing]\nconfetti_ms = 100\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timing.confetti_ms, 100);
        assert_eq!(loaded.timing.autoplay_delay_ms, 2000);
        assert_eq!(loaded.generation.model, Config::default().generation.model);
    }
}
