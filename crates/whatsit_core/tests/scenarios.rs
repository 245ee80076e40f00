//! End-to-end walks through the upload workflow, from drop to result text.

mod support;

use anyhow::Result;
use reqwest::blocking::Client;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use support::{Tracked, serve_once};
use whatsit_core::render::{DROP_PROMPT, FAILURE_MESSAGE, IN_PROGRESS_MESSAGE};
use whatsit_core::{
    Candidate, ClassificationResult, Classifier, ClientConfig, DropTargetState, HttpClassifier,
    ImageFile, IntakeRejection, Prediction, StateFlags, UploadError, UploadWorkflow, WorkflowView,
};

fn dropped(name: &str, mime: &str, len: usize) -> Vec<Candidate> {
    vec![Candidate::from_bytes(name, Some(mime.to_string()), vec![7u8; len])]
}

fn tracked(
    released: &Rc<Cell<usize>>,
) -> impl FnOnce(&ImageFile) -> Result<Tracked, IntakeRejection> {
    let released = released.clone();
    move |_: &ImageFile| Ok(Tracked(released))
}

fn http(url: &str) -> Result<Arc<dyn Classifier>> {
    let client = Client::builder().no_proxy().build()?;
    Ok(Arc::new(HttpClassifier::with_client(client, &ClientConfig::new(url)?)?))
}

/// Counts calls and never touches the network.
#[derive(Default)]
struct Counting(AtomicUsize);

impl Classifier for Counting {
    fn classify(&self, _file: &ImageFile) -> Result<Prediction, UploadError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Prediction {
            label: "cat".to_string(),
            score: 0.5,
        })
    }
}

/// Holds the request open until the test releases it.
struct Gated(Mutex<mpsc::Receiver<()>>);

impl Classifier for Gated {
    fn classify(&self, _file: &ImageFile) -> Result<Prediction, UploadError> {
        let gate = self.0.lock().map_err(|_| UploadError::WorkerLost)?;
        gate.recv().map_err(|_| UploadError::WorkerLost)?;
        Ok(Prediction {
            label: "kanye".to_string(),
            score: 0.75,
        })
    }
}

fn result_text<H>(wf: &UploadWorkflow<H>) -> Option<String> {
    match wf.view() {
        WorkflowView::Preview { result_text, .. } => result_text,
        WorkflowView::DropTarget { .. } => None,
    }
}

fn buttons<H>(wf: &UploadWorkflow<H>) -> Option<(bool, bool)> {
    match wf.view() {
        WorkflowView::Preview {
            show_clear,
            show_submit,
            ..
        } => Some((show_clear, show_submit)),
        WorkflowView::DropTarget { .. } => None,
    }
}

#[test]
fn cat_is_recognised() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("cat.png", "image/png", 2_000_000), tracked(&released))?;
    assert_ne!(wf.drop_target(), DropTargetState::Reject);
    assert_eq!(buttons(&wf), Some((true, true)));

    let server = serve_once("200 OK", r#"{"label": "cat", "score": "0.987"}"#);
    wf.submit(http(server.url())?, || {})?;
    assert!(wf.wait());

    assert_eq!(
        result_text(&wf).as_deref(),
        Some("I am 98.70% sure that's cat")
    );
    assert_eq!(buttons(&wf), Some((true, false)));
    assert!(server.request().body_text().contains(r#"name="image""#));
    Ok(())
}

#[test]
fn server_error_shows_apology() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("pikachu.jpg", "image/jpeg", 1_000_000), tracked(&released))?;

    let server = serve_once("500 Internal Server Error", "");
    wf.submit(http(server.url())?, || {})?;
    assert!(wf.wait());

    assert_eq!(result_text(&wf).as_deref(), Some(FAILURE_MESSAGE));
    assert_eq!(wf.state().result(), Some(ClassificationResult::Failure));
    assert!(!wf.in_flight());
    server.request();
    Ok(())
}

#[test]
fn oversized_drop_is_rejected_silently() {
    let released = Rc::new(Cell::new(0));
    let mut wf = UploadWorkflow::default();
    let err = wf.intake(dropped("huge.png", "image/png", 6_000_000), tracked(&released));

    assert!(matches!(err, Err(IntakeRejection::TooLarge { .. })));
    assert_eq!(wf.drop_target(), DropTargetState::Reject);
    assert!(wf.state().selection().is_none());
    assert!(buttons(&wf).is_none());
    assert!(wf.submit(Arc::new(Counting::default()), || {}).is_err());
    // The preview was never acquired.
    assert_eq!(released.get(), 0);
}

#[test]
fn clear_before_submit_makes_no_request() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let counting = Arc::new(Counting::default());
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("cat.png", "image/png", 1_000), tracked(&released))?;
    wf.clear()?;

    assert!(matches!(
        wf.view(),
        WorkflowView::DropTarget {
            prompt: DROP_PROMPT,
            ..
        }
    ));
    assert_eq!(released.get(), 1);
    assert!(wf.submit(counting.clone(), || {}).is_err());
    assert!(!wf.wait());
    assert_eq!(counting.0.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn invalid_drop_keeps_the_current_selection() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("cat.png", "image/png", 1_000), tracked(&released))?;

    assert!(wf.intake(dropped("notes.txt", "text/plain", 10), tracked(&released)).is_err());
    assert!(wf.intake(dropped("big.png", "image/png", 5_000_001), tracked(&released)).is_err());

    let selection = wf.state().selection().expect("selection kept");
    assert_eq!(selection.file().name, "cat.png");
    assert_eq!(released.get(), 0);
    Ok(())
}

#[test]
fn dropping_two_images_keeps_the_current_selection() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("cat.png", "image/png", 1_000), tracked(&released))?;

    let mut pair = dropped("kanye.png", "image/png", 10);
    pair.extend(dropped("pikachu.png", "image/png", 10));
    let err = wf.intake(pair, tracked(&released));

    assert!(matches!(
        err,
        Err(IntakeRejection::TooManyFiles { count: 2, max: 1 })
    ));
    assert_eq!(wf.drop_target(), DropTargetState::Reject);
    let selection = wf.state().selection().expect("selection kept");
    assert_eq!(selection.file().name, "cat.png");
    assert_eq!(buttons(&wf), Some((true, true)));
    assert_eq!(released.get(), 0);
    Ok(())
}

#[test]
fn new_drop_replaces_selection_and_result() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("first.png", "image/png", 10), tracked(&released))?;
    wf.submit(Arc::new(Counting::default()), || {})?;
    wf.wait();
    assert!(result_text(&wf).is_some());

    wf.intake(dropped("second.png", "image/png", 10), tracked(&released))?;
    assert_eq!(released.get(), 1);
    assert_eq!(result_text(&wf), None);
    assert_eq!(buttons(&wf), Some((true, true)));
    Ok(())
}

#[test]
fn in_flight_spans_exactly_the_request() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let (open_gate, gate) = mpsc::channel();
    let mut wf = UploadWorkflow::default();
    wf.intake(dropped("kanye.png", "image/png", 10), tracked(&released))?;
    assert!(!wf.in_flight());

    let (notify_tx, notified) = mpsc::channel();
    wf.submit(Arc::new(Gated(Mutex::new(gate))), move || {
        let _ = notify_tx.send(());
    })?;

    assert_eq!(
        wf.state().flags(),
        StateFlags {
            has_preview: true,
            result: None,
            in_flight: true
        }
    );
    assert!(!wf.poll());
    match wf.view() {
        WorkflowView::Preview {
            show_clear,
            show_submit,
            progress,
            result_text,
            ..
        } => {
            assert!(!show_clear && !show_submit);
            assert_eq!(progress, Some(IN_PROGRESS_MESSAGE));
            assert_eq!(result_text, None);
        }
        other => panic!("expected preview, got {other:?}"),
    }
    assert!(wf.clear().is_err());
    assert!(
        wf.intake(dropped("other.png", "image/png", 10), tracked(&released))
            .is_err()
    );
    assert_eq!(released.get(), 0);
    assert_ne!(wf.drop_target(), DropTargetState::Reject);

    open_gate.send(())?;
    notified.recv()?;
    assert!(wf.poll());
    assert_eq!(
        wf.state().flags(),
        StateFlags {
            has_preview: true,
            result: Some(ClassificationResult::Success {
                label: "kanye".to_string(),
                score: 0.75
            }),
            in_flight: false
        }
    );
    Ok(())
}

#[test]
fn clear_always_lands_on_the_empty_state() -> Result<()> {
    let released = Rc::new(Cell::new(0));
    let mut wf: UploadWorkflow<Tracked> = UploadWorkflow::default();
    wf.clear()?;

    wf.intake(dropped("cat.png", "image/png", 10), tracked(&released))?;
    wf.submit(Arc::new(Counting::default()), || {})?;
    wf.wait();
    wf.clear()?;
    wf.clear()?;

    assert_eq!(
        wf.state().flags(),
        StateFlags {
            has_preview: false,
            result: None,
            in_flight: false
        }
    );
    assert_eq!(released.get(), 1);
    Ok(())
}
