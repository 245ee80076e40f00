//! The upload state machine.
//!
//! ```text
//! Idle ──select──▶ Previewing ──submit──▶ Submitting ──settle──▶ Succeeded | Failed
//!  ▲                  │  ▲                                          │
//!  └──────clear───────┘  └───────────────select─────────────────────┘
//! ```
//!
//! `clear` is available from every state with a selection except
//! `Submitting`; `select` replaces the selection from any state but
//! `Submitting`.

use crate::error::TransitionError;
use crate::intake::ImageFile;
use crate::upload::ClassificationResult;

/// The chosen image and its preview handle.
///
/// The handle is released when the selection is dropped, which happens when
/// it is replaced or cleared.
#[derive(Debug)]
pub struct Selection<H> {
    file: ImageFile,
    preview: H,
}

impl<H> Selection<H> {
    pub fn new(file: ImageFile, preview: H) -> Self {
        Self { file, preview }
    }

    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    pub fn preview(&self) -> &H {
        &self.preview
    }
}

#[derive(Debug)]
pub enum UploadState<H> {
    Idle,
    Previewing(Selection<H>),
    Submitting(Selection<H>),
    Succeeded {
        selection: Selection<H>,
        label: String,
        score: f64,
    },
    Failed(Selection<H>),
}

impl<H> Default for UploadState<H> {
    fn default() -> Self {
        Self::Idle
    }
}

/// The three flags a flat UI model would carry, derived from the state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateFlags {
    pub has_preview: bool,
    pub result: Option<ClassificationResult>,
    pub in_flight: bool,
}

impl<H> UploadState<H> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Previewing(_) => "previewing",
            Self::Submitting(_) => "submitting",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed(_) => "failed",
        }
    }

    pub fn selection(&self) -> Option<&Selection<H>> {
        match self {
            Self::Idle => None,
            Self::Previewing(s) | Self::Submitting(s) | Self::Failed(s) => Some(s),
            Self::Succeeded { selection, .. } => Some(selection),
        }
    }

    pub fn in_flight(&self) -> bool {
        matches!(self, Self::Submitting(_))
    }

    pub fn result(&self) -> Option<ClassificationResult> {
        match self {
            Self::Succeeded { label, score, .. } => Some(ClassificationResult::Success {
                label: label.clone(),
                score: *score,
            }),
            Self::Failed(_) => Some(ClassificationResult::Failure),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Previewing(_))
    }

    pub fn can_clear(&self) -> bool {
        matches!(
            self,
            Self::Previewing(_) | Self::Succeeded { .. } | Self::Failed(_)
        )
    }

    pub fn flags(&self) -> StateFlags {
        StateFlags {
            has_preview: self.selection().is_some(),
            result: self.result(),
            in_flight: self.in_flight(),
        }
    }

    fn refuse(&self, action: &'static str) -> TransitionError {
        TransitionError {
            action,
            state: self.name(),
        }
    }

    /// Replaces any selection and result with `selection`.
    pub fn select(&mut self, selection: Selection<H>) -> Result<(), TransitionError> {
        if self.in_flight() {
            return Err(self.refuse("select"));
        }
        let previous = std::mem::replace(self, Self::Previewing(selection));
        if let Some(old) = previous.selection() {
            tracing::debug!("releasing preview of {}", old.file().name);
        }
        drop(previous);
        Ok(())
    }

    /// Moves to `Submitting` and returns a copy of the file to upload.
    pub fn begin_submit(&mut self) -> Result<ImageFile, TransitionError> {
        match std::mem::take(self) {
            Self::Previewing(selection) => {
                let file = selection.file().clone();
                *self = Self::Submitting(selection);
                tracing::debug!("state: previewing -> submitting");
                Ok(file)
            }
            other => {
                *self = other;
                Err(self.refuse("submit"))
            }
        }
    }

    /// Records the outcome of the outstanding request.
    pub fn settle(&mut self, result: ClassificationResult) -> Result<(), TransitionError> {
        match std::mem::take(self) {
            Self::Submitting(selection) => {
                *self = match result {
                    ClassificationResult::Success { label, score } => Self::Succeeded {
                        selection,
                        label,
                        score,
                    },
                    ClassificationResult::Failure => Self::Failed(selection),
                };
                tracing::debug!("state: submitting -> {}", self.name());
                Ok(())
            }
            other => {
                *self = other;
                Err(self.refuse("settle"))
            }
        }
    }

    /// Drops the selection and any result. A no-op when idle.
    pub fn clear(&mut self) -> Result<(), TransitionError> {
        if self.in_flight() {
            return Err(self.refuse("clear"));
        }
        if let Some(old) = self.selection() {
            tracing::debug!("clearing {}", old.file().name);
        }
        *self = Self::Idle;
        Ok(())
    }
}
