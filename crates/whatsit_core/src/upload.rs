//! Upload client: sends the selected image to the classification endpoint.

use crate::config::ClientConfig;
use crate::error::{ConfigError, UploadError};
use crate::intake::ImageFile;
use reqwest::Url;
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";

/// Outcome of a submission as the user sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationResult {
    Success { label: String, score: f64 },
    Failure,
}

impl ClassificationResult {
    /// Collapses every error into [`ClassificationResult::Failure`], logging the cause.
    pub fn from_outcome(outcome: Result<Prediction, UploadError>) -> Self {
        match outcome {
            Ok(Prediction { label, score }) => Self::Success { label, score },
            Err(e) => {
                tracing::warn!("classification failed: {e}");
                Self::Failure
            }
        }
    }
}

/// A label with its probability in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// Something that can classify an image. Called from a worker thread.
pub trait Classifier: Send + Sync {
    fn classify(&self, file: &ImageFile) -> Result<Prediction, UploadError>;
}

/// Posts the image as multipart form data to a remote endpoint.
pub struct HttpClassifier {
    client: Client,
    endpoint: Url,
}

impl HttpClassifier {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint()?;
        let client = Client::builder().build()?;
        Ok(Self { client, endpoint })
    }

    /// Uses a preconfigured client, e.g. one with proxies disabled.
    pub fn with_client(client: Client, config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            endpoint: config.endpoint()?,
        })
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, file: &ImageFile) -> Result<Prediction, UploadError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let start = Instant::now();
        let resp = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()?;
        let status = resp.status();
        tracing::debug!("{} answered {status} in {:.1?}", self.endpoint, start.elapsed());
        if !status.is_success() {
            return Err(UploadError::Status(status));
        }
        let body = resp.text()?;
        parse_prediction(&body)
    }
}

#[derive(Deserialize)]
struct RawPrediction {
    label: String,
    score: RawScore,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

/// Parses a response body with at least `label` and `score`.
///
/// The score may be a number or a numeric string and must lie in [0,1].
pub fn parse_prediction(body: &str) -> Result<Prediction, UploadError> {
    let raw: RawPrediction =
        serde_json::from_str(body).map_err(|e| UploadError::MalformedBody(e.to_string()))?;
    let score = match raw.score {
        RawScore::Number(n) => n,
        RawScore::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| UploadError::MalformedBody(format!("score {s:?}: {e}")))?,
    };
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(UploadError::MalformedBody(format!(
            "score {score} outside [0,1]"
        )));
    }
    Ok(Prediction {
        label: raw.label,
        score,
    })
}

/// A submission running on a worker thread.
///
/// Settles exactly once. A worker that dies without answering settles as
/// [`ClassificationResult::Failure`].
pub struct PendingUpload {
    rx: Receiver<ClassificationResult>,
}

impl PendingUpload {
    /// Non-blocking; `None` while the request is still outstanding.
    pub fn try_settle(&self) -> Option<ClassificationResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(ClassificationResult::from_outcome(Err(UploadError::WorkerLost)))
            }
        }
    }

    /// Blocks until the request settles.
    pub fn wait(self) -> ClassificationResult {
        self.rx
            .recv()
            .unwrap_or_else(|_| ClassificationResult::from_outcome(Err(UploadError::WorkerLost)))
    }
}

/// Starts classifying `file` in the background. `notify` runs once the
/// result has been sent, so a UI can schedule a repaint.
pub fn spawn_upload<F>(
    classifier: Arc<dyn Classifier>,
    file: ImageFile,
    notify: F,
) -> PendingUpload
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("whatsit-upload".to_string())
        .spawn(move || {
            tracing::info!("uploading {} ({} bytes)", file.name, file.size());
            let result = ClassificationResult::from_outcome(classifier.classify(&file));
            // The receiver may be gone if the app shut down mid-request.
            let _ = tx.send(result);
            notify();
        });
    if let Err(e) = spawned {
        // The sender was dropped with the closure, so the upload settles as a failure.
        tracing::warn!("could not start upload worker: {e}");
    }
    PendingUpload { rx }
}
