//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::form::{FieldKind, FormField, FormStep};
use crate::shell::{AppState, View};

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState, now: Instant) -> Result<()> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state, now)
        }
        Event::Resize(_, _) => Ok(()), // Already handled in main loop
        _ => Ok(()),
    }
}

/// Handle a key event
fn handle_key_event(key: KeyEvent, state: &mut AppState, now: Instant) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return Ok(());
    }

    // The alert blocks everything else
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            state.dismiss_alert();
        }
        return Ok(());
    }

    // Handle help overlay
    if state.show_help {
        return handle_help_input(key, state);
    }

    if key.code == KeyCode::F(1) {
        state.show_help = true;
        return Ok(());
    }

    match state.view {
        View::Form => handle_form_input(key, state),
        View::Card => handle_card_input(key, state, now),
    }
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char('?') | KeyCode::F(1) | KeyCode::Esc | KeyCode::Enter => {
            state.show_help = false;
        }
        _ => {}
    }
    Ok(())
}

fn handle_form_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.form.is_submitting() {
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
            state.should_quit = true;
        }
        return Ok(());
    }

    let field = state.form.focused_field();

    // Navigation shared by every field
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            state.form.focus_next();
            return Ok(());
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.form.focus_prev();
            return Ok(());
        }
        KeyCode::Esc => {
            state.form.back();
            return Ok(());
        }
        KeyCode::PageDown => {
            forward(state);
            return Ok(());
        }
        _ => {}
    }

    match field.kind() {
        FieldKind::Text => handle_text_field(key, state, field),
        FieldKind::Path => handle_photo_field(key, state),
        FieldKind::Choice => handle_choice_field(key, state, field),
    }
    Ok(())
}

/// Next step, or submit on the last one. A photo path that was typed but
/// never loaded is loaded first; submit waits for it.
fn forward(state: &mut AppState) {
    if state.form.step() == FormStep::Personalize {
        if state.form.photo_uncommitted() {
            state.choose_photo();
            if state.form.photo_pending() {
                return;
            }
        }
        state.submit();
        return;
    }
    if let Err(e) = state.form.advance() {
        state.set_status(&e.to_string(), true);
    } else {
        state.set_status(state.form.step().title(), false);
    }
}

fn is_chord(key: &KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn handle_text_field(key: KeyEvent, state: &mut AppState, field: FormField) {
    match key.code {
        KeyCode::Enter => forward(state),
        KeyCode::Backspace => {
            let mut value = state.form.text_value(field);
            value.pop();
            state.form.set_text(field, value);
        }
        KeyCode::Char(c) if !is_chord(&key) => {
            let mut value = state.form.text_value(field);
            value.push(c);
            state.form.set_text(field, value);
        }
        _ => {}
    }
}

fn handle_photo_field(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Enter => {
            if state.form.photo_uncommitted() {
                state.choose_photo();
            } else {
                forward(state);
            }
        }
        KeyCode::Delete => {
            state.form.clear_photo();
            state.set_status("Photo removed", false);
        }
        KeyCode::Backspace => {
            let mut value = state.form.text_value(FormField::Photo);
            value.pop();
            state.form.set_text(FormField::Photo, value);
        }
        KeyCode::Char(c) if !is_chord(&key) => {
            let mut value = state.form.text_value(FormField::Photo);
            value.push(c);
            state.form.set_text(FormField::Photo, value);
        }
        _ => {}
    }
}

fn handle_choice_field(key: KeyEvent, state: &mut AppState, field: FormField) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => state.form.cycle_choice(field, false),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            state.form.cycle_choice(field, true)
        }
        KeyCode::Enter => forward(state),
        KeyCode::Char('q') | KeyCode::Char('Q') => state.should_quit = true,
        KeyCode::Char('?') => state.show_help = true,
        _ => {}
    }
}

fn handle_card_input(key: KeyEvent, state: &mut AppState, now: Instant) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => state.should_quit = true,
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Enter | KeyCode::Char(' ') => state.activate_card(now),
        KeyCode::Char('f') | KeyCode::Char('F') => state.flip_card(),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('d') | KeyCode::Char('D') => {
            state.export_card()
        }
        KeyCode::Char('m') | KeyCode::Char('M') => state.toggle_audio(),
        KeyCode::Char('c') | KeyCode::Char('C') => state.copy_message(),
        KeyCode::Char('n') | KeyCode::Char('N') => state.new_card(),
        _ => {}
    }
    Ok(())
}
