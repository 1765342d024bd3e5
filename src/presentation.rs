//! Card presentation state machine
//!
//! `Closed -> Opening -> Open { Front | Back }`. The gift can be opened once;
//! after that only the face changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;

use crate::card::CardData;
use crate::config::TimingPreferences;
use crate::effects::{ConfettiBurst, Timer};
use crate::theme::CardTheme;

/// Card side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Face {
    #[default]
    Front,
    Back,
}

impl Face {
    pub fn flipped(&self) -> Self {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }

    /// Label of the button that flips away from this face
    pub fn flip_label(&self) -> &'static str {
        match self {
            Face::Front => "Read Message",
            Face::Back => "Show Front",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    Closed,
    Opening { reveal: Timer },
    Open { face: Face },
}

/// A face capture to run in the background
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub card: Arc<CardData>,
    pub theme: CardTheme,
    pub face: Face,
    pub path: PathBuf,
}

pub struct CardView {
    card: Arc<CardData>,
    theme: CardTheme,
    /// Decoded once for the terminal preview
    photo: Option<DynamicImage>,
    phase: CardPhase,
    confetti: Option<ConfettiBurst>,
    celebrated: bool,
    exporting: bool,
    timing: TimingPreferences,
}

impl CardView {
    pub fn new(card: Arc<CardData>, timing: TimingPreferences) -> Self {
        let theme = CardTheme::for_vibe(card.vibe);
        let photo = card.photo.as_ref().and_then(|photo| match photo.decode() {
            Ok(image) => Some(image),
            Err(error) => {
                tracing::warn!(%error, "embedded photo could not be decoded");
                None
            }
        });
        Self {
            card,
            theme,
            photo,
            phase: CardPhase::Closed,
            confetti: None,
            celebrated: false,
            exporting: false,
            timing,
        }
    }

    pub fn card(&self) -> &CardData {
        &self.card
    }

    pub fn theme(&self) -> &CardTheme {
        &self.theme
    }

    pub fn photo(&self) -> Option<&DynamicImage> {
        self.photo.as_ref()
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    pub fn confetti(&self) -> Option<&ConfettiBurst> {
        self.confetti.as_ref()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Open the gift. Returns false when it is already opening or open.
    pub fn activate(&mut self, now: Instant) -> bool {
        match self.phase {
            CardPhase::Closed => {
                tracing::debug!(recipient = %self.card.recipient_name, "opening gift");
                self.phase = CardPhase::Opening {
                    reveal: Timer::start(now, self.timing.gift_open()),
                };
                true
            }
            CardPhase::Opening { .. } | CardPhase::Open { .. } => false,
        }
    }

    /// Poll timers and advance the confetti. Returns true on the frame the
    /// card opens.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut opened = false;

        if let CardPhase::Opening { reveal } = &mut self.phase {
            if reveal.fired(now) {
                self.phase = CardPhase::Open { face: Face::Front };
                opened = true;
                if !self.celebrated {
                    self.celebrated = true;
                    self.confetti = Some(ConfettiBurst::new(now, self.timing.confetti()));
                }
            }
        }

        if let Some(burst) = &mut self.confetti {
            burst.tick(now);
            if burst.is_finished(now) {
                self.confetti = None;
            }
        }

        opened
    }

    /// Fraction of the opening animation done, while opening
    pub fn opening_progress(&self, now: Instant) -> Option<f32> {
        match &self.phase {
            CardPhase::Opening { reveal } => reveal.progress(now),
            CardPhase::Closed | CardPhase::Open { .. } => None,
        }
    }

    /// Turn the card over. Returns the new face, `None` before the card is open.
    pub fn flip(&mut self) -> Option<Face> {
        match &mut self.phase {
            CardPhase::Open { face } => {
                *face = face.flipped();
                Some(*face)
            }
            CardPhase::Closed | CardPhase::Opening { .. } => None,
        }
    }

    pub fn visible_face(&self) -> Option<Face> {
        match self.phase {
            CardPhase::Open { face } => Some(face),
            CardPhase::Closed | CardPhase::Opening { .. } => None,
        }
    }

    /// Capture the visible face. `None` while closed or while an export is
    /// already running.
    pub fn begin_export(&mut self, output_dir: &Path) -> Option<ExportRequest> {
        let face = self.visible_face()?;
        if self.exporting {
            return None;
        }

        self.exporting = true;
        Some(ExportRequest {
            card: Arc::clone(&self.card),
            theme: self.theme,
            face,
            path: output_dir.join(self.card.export_file_name()),
        })
    }

    pub fn finish_export(&mut self) {
        self.exporting = false;
    }
}
