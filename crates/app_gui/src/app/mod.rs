//! Main window: drop target, preview, result and settings.

mod drop_zone;
mod settings;

use eframe::{App, Frame, egui};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use whatsit_core::intake::IMAGE_EXTENSIONS;
use whatsit_core::render::TITLE;
use whatsit_core::{
    Candidate, Classifier, ClientConfig, HoverCandidate, HttpClassifier, ImageFile,
    IntakeRejection, PREVIEW_MAX_HEIGHT, PREVIEW_WIDTH, UploadWorkflow, WorkflowView,
    decode_preview,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    Upload,
    Settings,
}

/// Texture of the current selection. egui frees it when the last handle drops.
pub(crate) struct PreviewTexture {
    texture: egui::TextureHandle,
    size: egui::Vec2,
}

impl Drop for PreviewTexture {
    fn drop(&mut self) {
        tracing::debug!("released preview texture {}", self.texture.name());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Pick,
    Clear,
    Submit,
}

pub(crate) struct UiApp {
    workflow: UploadWorkflow<PreviewTexture>,
    classifier: Option<Arc<dyn Classifier>>,
    config: ClientConfig,
    config_path: Option<PathBuf>,
    panel: Panel,
    endpoint_input: String,
    status: String,
    app_version: &'static str,
}

impl UiApp {
    pub(crate) fn new(config: ClientConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            workflow: UploadWorkflow::default(),
            classifier: build_classifier(&config),
            endpoint_input: config.endpoint_url.clone(),
            config,
            config_path,
            panel: Panel::Upload,
            status: String::new(),
            app_version: env!("WHATSIT_VERSION"),
        }
    }

    fn intake(&mut self, ctx: &egui::Context, candidates: Vec<Candidate>) {
        // Rejections only show on the drop target border.
        if self
            .workflow
            .intake(candidates, |file| load_preview(ctx, file))
            .is_ok()
        {
            self.panel = Panel::Upload;
        }
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let (hovered, dropped) =
            ctx.input(|i| (i.raw.hovered_files.clone(), i.raw.dropped_files.clone()));
        if hovered.is_empty() {
            self.workflow.end_hover();
        } else {
            let files: Vec<HoverCandidate> = hovered.iter().map(hover_candidate).collect();
            self.workflow.hover(&files);
        }
        if !dropped.is_empty() {
            let candidates = dropped.iter().map(dropped_candidate).collect();
            self.intake(ctx, candidates);
        }
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        let picked = FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .set_directory(".")
            .pick_file();
        if let Some(path) = picked {
            self.intake(ctx, vec![Candidate::from_path(path)]);
        }
    }

    fn submit(&mut self, ctx: &egui::Context) {
        let Some(classifier) = self.classifier.clone() else {
            self.status = "No usable classification endpoint, see Settings".to_string();
            return;
        };
        let repaint = ctx.clone();
        if let Err(e) = self.workflow.submit(classifier, move || repaint.request_repaint()) {
            tracing::warn!("submit ignored: {e}");
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Pick => self.pick_file(ctx),
            Action::Submit => self.submit(ctx),
            Action::Clear => {
                if let Err(e) = self.workflow.clear() {
                    tracing::warn!("clear ignored: {e}");
                }
            }
        }
    }

    /// Draws the workflow and reports what the user clicked.
    fn draw_workflow(&self, ui: &mut egui::Ui) -> (Option<Action>, bool) {
        let mut action = None;
        let mut focused = false;
        match self.workflow.view() {
            WorkflowView::DropTarget { style, prompt } => {
                let response = drop_zone::show(ui, style, prompt);
                focused = response.hovered() || response.has_focus();
                if response.clicked() {
                    action = Some(Action::Pick);
                }
            }
            WorkflowView::Preview {
                selection,
                show_clear,
                show_submit,
                progress,
                result_text,
            } => {
                let preview = selection.preview();
                ui.add(egui::Image::new(&preview.texture).fit_to_exact_size(preview.size));
                ui.add_space(8.0);
                if show_clear || show_submit {
                    ui.horizontal(|ui| {
                        if show_clear && ui.button("Clear").clicked() {
                            action = Some(Action::Clear);
                        }
                        if show_submit {
                            ui.add_space(10.0);
                            if ui.button("Submit").clicked() {
                                action = Some(Action::Submit);
                            }
                        }
                    });
                }
                if let Some(text) = result_text {
                    ui.label(text);
                }
                if let Some(message) = progress {
                    ui.label(message);
                }
            }
        }
        (action, focused)
    }

    fn render_upload_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (action, focused) = egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(TITLE);
                    ui.add_space(12.0);
                    self.draw_workflow(ui)
                })
                .inner
            })
            .inner;
        self.workflow.set_focused(focused);
        if let Some(action) = action {
            self.apply(ctx, action);
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if self.workflow.poll() {
            tracing::debug!("upload settled: {}", self.workflow.state().name());
        }
        if self.workflow.in_flight() {
            // The worker also requests a repaint; this covers a worker that died.
            ctx.request_repaint_after(Duration::from_millis(250));
        }
        self.handle_file_drops(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.panel, Panel::Upload, "Classify");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Upload => self.render_upload_panel(ctx, ui),
            Panel::Settings => self.render_settings_panel(ui),
        });
    }
}

fn build_classifier(config: &ClientConfig) -> Option<Arc<dyn Classifier>> {
    match HttpClassifier::new(config) {
        Ok(classifier) => Some(Arc::new(classifier) as Arc<dyn Classifier>),
        Err(e) => {
            tracing::error!("cannot classify via {}: {e}", config.endpoint_url);
            None
        }
    }
}

fn load_preview(
    ctx: &egui::Context,
    file: &ImageFile,
) -> Result<PreviewTexture, IntakeRejection> {
    let max_side = ctx.input(|i| i.max_texture_side);
    let max_height = u32::try_from(max_side).map_or(PREVIEW_MAX_HEIGHT, |side| {
        side.min(PREVIEW_MAX_HEIGHT)
    });
    let image = decode_preview(file, PREVIEW_WIDTH.min(max_height), max_height)?;
    let size = [image.width as usize, image.height as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, &image.rgba);
    let name = format!("preview:{}", file.name);
    let texture = ctx.load_texture(name, color, egui::TextureOptions::LINEAR);
    let [w, h] = image.display_size(PREVIEW_WIDTH as f32);
    Ok(PreviewTexture {
        texture,
        size: egui::vec2(w, h),
    })
}

fn dropped_candidate(file: &egui::DroppedFile) -> Candidate {
    Candidate {
        name: file.name.clone(),
        mime: (!file.mime.is_empty()).then(|| file.mime.clone()),
        path: file.path.clone(),
        bytes: file.bytes.as_ref().map(|b| b.to_vec()),
    }
}

fn hover_candidate(file: &egui::HoveredFile) -> HoverCandidate {
    HoverCandidate {
        mime: (!file.mime.is_empty()).then(|| file.mime.clone()),
        path: file.path.clone(),
    }
}
