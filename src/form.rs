//! Form workflow
//!
//! A three-step wizard that fills in a [`CardData`]. Steps only move one at a
//! time, going back never touches the record, and every edit replaces the
//! whole record instead of mutating a field in place.

use std::path::PathBuf;

use crate::card::CardData;
use crate::error::FormError;
use crate::photo::EmbeddedPhoto;

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStep {
    #[default]
    BasicInfo,
    StyleAndTone,
    Personalize,
}

impl FormStep {
    pub fn title(&self) -> &'static str {
        match self {
            FormStep::BasicInfo => "Who is it for?",
            FormStep::StyleAndTone => "Style & Tone",
            FormStep::Personalize => "Make it personal",
        }
    }

    /// 1-based position shown in the progress indicator
    pub fn number(&self) -> usize {
        match self {
            FormStep::BasicInfo => 1,
            FormStep::StyleAndTone => 2,
            FormStep::Personalize => 3,
        }
    }

    pub const COUNT: usize = 3;

    pub fn next(&self) -> Option<Self> {
        match self {
            FormStep::BasicInfo => Some(FormStep::StyleAndTone),
            FormStep::StyleAndTone => Some(FormStep::Personalize),
            FormStep::Personalize => None,
        }
    }

    pub fn prev(&self) -> Option<Self> {
        match self {
            FormStep::BasicInfo => None,
            FormStep::StyleAndTone => Some(FormStep::BasicInfo),
            FormStep::Personalize => Some(FormStep::StyleAndTone),
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self {
            FormStep::BasicInfo => &[
                FormField::SenderName,
                FormField::RecipientName,
                FormField::Relation,
                FormField::Age,
            ],
            FormStep::StyleAndTone => &[FormField::Vibe, FormField::Tone],
            FormStep::Personalize => &[FormField::FavMemory, FormField::Photo],
        }
    }
}

/// Every input on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    SenderName,
    RecipientName,
    Relation,
    Age,
    Vibe,
    Tone,
    FavMemory,
    Photo,
}

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
    /// Text naming a file; committed with Enter
    Path,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::SenderName => "Your name",
            FormField::RecipientName => "Their name",
            FormField::Relation => "Relation",
            FormField::Age => "Turning (optional)",
            FormField::Vibe => "Vibe",
            FormField::Tone => "Message tone",
            FormField::FavMemory => "Favourite memory",
            FormField::Photo => "Photo (optional)",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FormField::SenderName
            | FormField::RecipientName
            | FormField::Age
            | FormField::FavMemory => FieldKind::Text,
            FormField::Relation | FormField::Vibe | FormField::Tone => FieldKind::Choice,
            FormField::Photo => FieldKind::Path,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            FormField::SenderName | FormField::RecipientName | FormField::FavMemory
        )
    }
}

/// Single photo slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhotoState {
    #[default]
    Empty,
    Loading { token: u64, path: PathBuf },
    Ready { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

/// Background photo conversion to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRequest {
    pub token: u64,
    pub path: PathBuf,
}

/// Wizard state
#[derive(Debug, Clone, Default)]
pub struct FormWorkflow {
    step: FormStep,
    draft: CardData,
    focused: usize,
    photo: PhotoState,
    photo_input: String,
    next_token: u64,
    submitting: bool,
}

impl FormWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    /// Read-only view of the record being built
    pub fn draft(&self) -> &CardData {
        &self.draft
    }

    pub fn photo_state(&self) -> &PhotoState {
        &self.photo
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn focused_field(&self) -> FormField {
        let fields = self.step.fields();
        fields[self.focused.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        let count = self.step.fields().len();
        self.focused = (self.focused + 1) % count;
    }

    pub fn focus_prev(&mut self) {
        let count = self.step.fields().len();
        self.focused = (self.focused + count - 1) % count;
    }

    /// Swap in a new record. Ignored while a submission is in flight.
    pub fn replace(&mut self, draft: CardData) {
        if self.submitting {
            return;
        }
        self.draft = draft;
    }

    /// Current text of a text or path field
    pub fn text_value(&self, field: FormField) -> String {
        match field {
            FormField::SenderName => self.draft.sender_name.clone(),
            FormField::RecipientName => self.draft.recipient_name.clone(),
            FormField::Age => self.draft.age.clone().unwrap_or_default(),
            FormField::FavMemory => self.draft.fav_memory.clone(),
            FormField::Photo => self.photo_input.clone(),
            FormField::Relation => self.draft.relation.name().to_string(),
            FormField::Vibe => self.draft.vibe.name().to_string(),
            FormField::Tone => self.draft.tone.name().to_string(),
        }
    }

    /// Set the text of a text or path field; choice fields are left alone.
    pub fn set_text(&mut self, field: FormField, value: String) {
        if self.submitting {
            return;
        }
        let draft = self.draft.clone();
        match field {
            FormField::SenderName => self.replace(draft.with_sender_name(value)),
            FormField::RecipientName => self.replace(draft.with_recipient_name(value)),
            FormField::Age => self.replace(draft.with_age(value)),
            FormField::FavMemory => self.replace(draft.with_fav_memory(value)),
            FormField::Photo => self.photo_input = value,
            FormField::Relation | FormField::Vibe | FormField::Tone => {}
        }
    }

    /// Step through the options of a choice field
    pub fn cycle_choice(&mut self, field: FormField, forward: bool) {
        if self.submitting {
            return;
        }
        let draft = self.draft.clone();
        let draft = match field {
            FormField::Relation => {
                let relation = if forward {
                    draft.relation.next()
                } else {
                    draft.relation.prev()
                };
                draft.with_relation(relation)
            }
            FormField::Vibe => {
                let vibe = if forward { draft.vibe.next() } else { draft.vibe.prev() };
                draft.with_vibe(vibe)
            }
            FormField::Tone => {
                let tone = if forward { draft.tone.next() } else { draft.tone.prev() };
                draft.with_tone(tone)
            }
            FormField::SenderName
            | FormField::RecipientName
            | FormField::Age
            | FormField::FavMemory
            | FormField::Photo => return,
        };
        self.replace(draft);
    }

    pub fn can_advance(&self) -> bool {
        if self.submitting {
            return false;
        }
        match self.step {
            FormStep::BasicInfo => self.draft.has_names(),
            FormStep::StyleAndTone => true,
            FormStep::Personalize => false,
        }
    }

    pub fn advance(&mut self) -> Result<FormStep, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        if !self.can_advance() {
            return Err(FormError::StepIncomplete);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
            self.focused = 0;
        }
        Ok(self.step)
    }

    /// One step back; the record is kept as is.
    pub fn back(&mut self) -> FormStep {
        if !self.submitting {
            if let Some(prev) = self.step.prev() {
                self.step = prev;
                self.focused = 0;
            }
        }
        self.step
    }

    /// Start converting the file named in the photo field.
    ///
    /// An empty path clears the photo. Any attached photo is detached until
    /// the new one is ready.
    pub fn begin_photo(&mut self) -> Option<PhotoRequest> {
        if self.submitting {
            return None;
        }

        let input = self.photo_input.trim();
        if input.is_empty() {
            self.clear_photo();
            return None;
        }

        self.next_token += 1;
        let request = PhotoRequest {
            token: self.next_token,
            path: PathBuf::from(input),
        };

        self.draft = self.draft.clone().with_photo(None);
        self.photo = PhotoState::Loading {
            token: request.token,
            path: request.path.clone(),
        };

        Some(request)
    }

    /// Apply the result of a photo conversion. Returns false for results
    /// that belong to an earlier request.
    pub fn complete_photo(&mut self, token: u64, result: Result<EmbeddedPhoto, String>) -> bool {
        let path = match &self.photo {
            PhotoState::Loading { token: current, path } if *current == token => path.clone(),
            _ => return false,
        };

        match result {
            Ok(photo) => {
                self.draft = self.draft.clone().with_photo(Some(photo));
                self.photo = PhotoState::Ready { path };
            }
            Err(error) => {
                self.draft = self.draft.clone().with_photo(None);
                self.photo = PhotoState::Failed { path, error };
            }
        }
        true
    }

    pub fn clear_photo(&mut self) {
        if self.submitting {
            return;
        }
        self.draft = self.draft.clone().with_photo(None);
        self.photo = PhotoState::Empty;
        self.photo_input.clear();
    }

    pub fn photo_pending(&self) -> bool {
        matches!(self.photo, PhotoState::Loading { .. })
    }

    /// Whether the photo field names a file that has not been requested yet
    pub fn photo_uncommitted(&self) -> bool {
        let typed = self.photo_input.trim();
        if typed.is_empty() {
            return false;
        }
        match &self.photo {
            PhotoState::Empty => true,
            PhotoState::Loading { path, .. }
            | PhotoState::Ready { path }
            | PhotoState::Failed { path, .. } => path.as_os_str() != typed,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting
            && self.step == FormStep::Personalize
            && self.draft.has_memory()
            && !self.photo_pending()
            && !self.photo_uncommitted()
    }

    /// Hand the finished record over and lock the form.
    pub fn submit(&mut self) -> Result<CardData, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        if self.step != FormStep::Personalize
            || self.photo_pending()
            || self.photo_uncommitted()
        {
            return Err(FormError::NotReady);
        }
        if !self.draft.has_memory() {
            return Err(FormError::StepIncomplete);
        }

        self.submitting = true;
        Ok(self.draft.clone())
    }

    /// Unlock after an aborted submission so the user can retry.
    pub fn submission_failed(&mut self) {
        self.submitting = false;
    }
}
