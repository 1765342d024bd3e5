//! Background music
//!
//! Playback is delegated to an external player process. Starting it can
//! fail (no player installed, audio disabled); callers decide whether that
//! matters.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::config::AudioPreferences;
use crate::error::{CardError, Result};

/// Something that can start and stop the music
pub trait AudioBackend: Send {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn is_available(&self) -> bool;

    /// Whether the last successful `play` is still going. Backends that
    /// cannot tell report true.
    fn is_running(&mut self) -> bool {
        true
    }
}

/// Spawns the configured player command
pub struct CommandAudio {
    prefs: AudioPreferences,
    child: Option<Child>,
}

impl CommandAudio {
    pub fn new(prefs: AudioPreferences) -> Self {
        Self { prefs, child: None }
    }

    fn command_line(&self) -> Option<(String, Vec<String>)> {
        let (program, args) = self.prefs.player.split_first()?;
        let args = args
            .iter()
            .map(|arg| arg.replace("{track}", &self.prefs.track))
            .collect();
        Some((program.clone(), args))
    }
}

impl AudioBackend for CommandAudio {
    fn play(&mut self) -> Result<()> {
        if !self.prefs.enabled {
            return Err(CardError::Audio("music is disabled in the config".to_string()));
        }
        if self.is_running() {
            return Ok(());
        }

        let (program, args) = self
            .command_line()
            .ok_or_else(|| CardError::Audio("no player command configured".to_string()))?;

        tracing::debug!(%program, "starting music player");
        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CardError::Audio(format!("{}: {}", program, e)))?;

        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_available(&self) -> bool {
        self.prefs.enabled
            && self
                .prefs
                .player
                .first()
                .map(|program| program_on_path(program))
                .unwrap_or(false)
    }

    /// Reaps a player that exited on its own
    fn is_running(&mut self) -> bool {
        match self.child.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                tracing::debug!(%status, "music player exited");
                self.child = None;
                false
            }
            Some(Err(_)) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for CommandAudio {
    fn drop(&mut self) {
        self.pause();
    }
}

fn program_on_path(program: &str) -> bool {
    let program = Path::new(program);
    if program.components().count() > 1 {
        return program.exists();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).exists()))
        .unwrap_or(false)
}

/// The shell's view of the music: a backend plus the playing flag.
///
/// The flag only turns on after a successful `play` and drops again once
/// `sync` sees the player gone.
pub struct AudioState {
    backend: Box<dyn AudioBackend>,
    playing: bool,
}

impl AudioState {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn play(&mut self) -> Result<()> {
        self.backend.play()?;
        self.playing = true;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.playing = false;
    }

    /// Clear the flag if the player stopped by itself. Returns true when
    /// that happened.
    pub fn sync(&mut self) -> bool {
        if self.playing && !self.backend.is_running() {
            self.playing = false;
            return true;
        }
        false
    }

    /// Flip between playing and paused; returns the new flag.
    pub fn toggle(&mut self) -> Result<bool> {
        self.sync();
        if self.playing {
            self.pause();
        } else {
            self.play()?;
        }
        Ok(self.playing)
    }
}
