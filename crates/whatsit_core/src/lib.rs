//! GUI-free core of Whatsit: take one image, preview it, send it to a remote
//! classifier and describe the answer.

pub mod config;
pub mod error;
pub mod intake;
pub mod preview;
pub mod render;
pub mod state;
pub mod upload;
pub mod workflow;

pub use config::ClientConfig;
pub use error::{ConfigError, IntakeRejection, TransitionError, UploadError};
pub use intake::{Candidate, HoverCandidate, ImageFile, IntakeLimits};
pub use preview::{PREVIEW_MAX_HEIGHT, PREVIEW_WIDTH, PreviewImage, decode_preview};
pub use state::{Selection, StateFlags, UploadState};
pub use upload::{ClassificationResult, Classifier, HttpClassifier, Prediction};
pub use workflow::{DropTargetState, UploadWorkflow, WorkflowView};
