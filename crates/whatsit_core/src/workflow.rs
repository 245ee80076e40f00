//! The upload workflow: intake, preview, submission and result in one place.
//!
//! The GUI owns one [`UploadWorkflow`], feeds it input events every frame and
//! draws whatever [`UploadWorkflow::view`] returns. The preview handle type
//! `H` is chosen by the caller; in the GUI it is a texture.

use crate::error::{IntakeRejection, TransitionError};
use crate::intake::{
    Candidate, HoverCandidate, ImageFile, IntakeLimits, hover_acceptable, validate,
};
use crate::render::{self, DROP_ACTIVE_PROMPT, DROP_PROMPT, IN_PROGRESS_MESSAGE};
use crate::state::{Selection, UploadState};
use crate::upload::{ClassificationResult, Classifier, PendingUpload, spawn_upload};
use std::sync::Arc;

/// Visual state of the drop target. Each maps to its own border color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropTargetState {
    #[default]
    Idle,
    Focused,
    Accept,
    Reject,
}

/// What the window should show.
#[derive(Debug)]
pub enum WorkflowView<'a, H> {
    DropTarget {
        style: DropTargetState,
        prompt: &'static str,
    },
    Preview {
        selection: &'a Selection<H>,
        show_clear: bool,
        show_submit: bool,
        progress: Option<&'static str>,
        result_text: Option<String>,
    },
}

pub struct UploadWorkflow<H> {
    state: UploadState<H>,
    limits: IntakeLimits,
    focused: bool,
    /// `Some(acceptable)` while a drag hovers the window.
    hovering: Option<bool>,
    last_rejected: bool,
    pending: Option<PendingUpload>,
}

impl<H> Default for UploadWorkflow<H> {
    fn default() -> Self {
        Self::new(IntakeLimits::default())
    }
}

impl<H> UploadWorkflow<H> {
    pub fn new(limits: IntakeLimits) -> Self {
        Self {
            state: UploadState::Idle,
            limits,
            focused: false,
            hovering: None,
            last_rejected: false,
            pending: None,
        }
    }

    pub fn state(&self) -> &UploadState<H> {
        &self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight()
    }

    /// Reject wins over accept, which wins over focus.
    pub fn drop_target(&self) -> DropTargetState {
        match self.hovering {
            Some(true) => DropTargetState::Accept,
            Some(false) => DropTargetState::Reject,
            None if self.last_rejected => DropTargetState::Reject,
            None if self.focused => DropTargetState::Focused,
            None => DropTargetState::Idle,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// A drag is over the window.
    pub fn hover(&mut self, files: &[HoverCandidate]) {
        if self.hovering.is_none() {
            self.last_rejected = false;
        }
        self.hovering = Some(hover_acceptable(files, &self.limits));
    }

    pub fn end_hover(&mut self) {
        self.hovering = None;
    }

    /// Validates a drop or picker selection and makes it the current one.
    ///
    /// `make_preview` acquires the preview handle for the accepted file.
    /// Rejections leave any existing selection untouched and only show on
    /// the drop target.
    pub fn intake<F>(
        &mut self,
        candidates: Vec<Candidate>,
        make_preview: F,
    ) -> Result<(), IntakeRejection>
    where
        F: FnOnce(&ImageFile) -> Result<H, IntakeRejection>,
    {
        self.hovering = None;
        let outcome = self.try_intake(candidates, make_preview);
        match &outcome {
            Ok(()) => self.last_rejected = false,
            // The drop target is hidden while uploading.
            Err(IntakeRejection::Busy) => tracing::info!("ignored drop while uploading"),
            Err(reason) => {
                tracing::info!("rejected dropped file: {reason}");
                self.last_rejected = true;
            }
        }
        outcome
    }

    fn try_intake<F>(
        &mut self,
        candidates: Vec<Candidate>,
        make_preview: F,
    ) -> Result<(), IntakeRejection>
    where
        F: FnOnce(&ImageFile) -> Result<H, IntakeRejection>,
    {
        if self.in_flight() {
            return Err(IntakeRejection::Busy);
        }
        let file = validate(candidates, &self.limits)?;
        let preview = make_preview(&file)?;
        tracing::info!("selected {} ({}, {} bytes)", file.name, file.mime, file.size());
        self.state
            .select(Selection::new(file, preview))
            .map_err(|_| IntakeRejection::Busy)
    }

    /// Starts classifying the current selection.
    ///
    /// `notify` is called from the worker once the result is ready.
    pub fn submit<F>(
        &mut self,
        classifier: Arc<dyn Classifier>,
        notify: F,
    ) -> Result<(), TransitionError>
    where
        F: FnOnce() + Send + 'static,
    {
        let file = self.state.begin_submit()?;
        self.pending = Some(spawn_upload(classifier, file, notify));
        Ok(())
    }

    /// Applies a finished upload. Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(result) = self.pending.as_ref().and_then(PendingUpload::try_settle) else {
            return false;
        };
        self.pending = None;
        self.settle(result)
    }

    /// Blocks until the outstanding upload settles.
    pub fn wait(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                let result = pending.wait();
                self.settle(result)
            }
            None => false,
        }
    }

    fn settle(&mut self, result: ClassificationResult) -> bool {
        match self.state.settle(result) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("dropping upload result: {e}");
                false
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), TransitionError> {
        self.state.clear()?;
        self.last_rejected = false;
        Ok(())
    }

    pub fn view(&self) -> WorkflowView<'_, H> {
        match self.state.selection() {
            None => WorkflowView::DropTarget {
                style: self.drop_target(),
                prompt: if self.hovering.is_some() {
                    DROP_ACTIVE_PROMPT
                } else {
                    DROP_PROMPT
                },
            },
            Some(selection) => {
                let in_flight = self.state.in_flight();
                WorkflowView::Preview {
                    selection,
                    show_clear: self.state.can_clear(),
                    show_submit: self.state.can_submit(),
                    progress: in_flight.then_some(IN_PROGRESS_MESSAGE),
                    result_text: render::format_result(self.state.result().as_ref()),
                }
            }
        }
    }
}
