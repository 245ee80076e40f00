//! Settings panel rendering for the classification endpoint.

use super::{Panel, UiApp, build_classifier};
use eframe::egui;
use whatsit_core::ClientConfig;

impl UiApp {
    /// Renders the settings screen: endpoint editor and version info.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Classification endpoint");
            ui.text_edit_singleline(&mut self.endpoint_input);
        });
        ui.add_space(4.0);
        ui.label("Images are posted as multipart form data to this URL.");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let changed = self.endpoint_input.trim() != self.config.endpoint_url;
            if ui
                .add_enabled(
                    changed && !self.workflow.in_flight(),
                    egui::Button::new("Apply"),
                )
                .clicked()
            {
                self.apply_endpoint();
            }
            if ui.button("Reset to default").clicked() {
                self.endpoint_input = ClientConfig::default().endpoint_url;
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading("Version");
        ui.label(format!("App version: {}", self.app_version));
        if let Some(path) = &self.config_path {
            ui.label(format!("Config file: {}", path.display()));
        }
    }

    fn apply_endpoint(&mut self) {
        let config = match ClientConfig::new(self.endpoint_input.clone()) {
            Ok(config) => config,
            Err(e) => {
                self.status = format!("Endpoint not changed: {e}");
                return;
            }
        };
        self.classifier = build_classifier(&config);
        self.status = match &self.config_path {
            Some(path) => match config.save(path) {
                Ok(()) => "Endpoint saved.".to_string(),
                Err(e) => {
                    tracing::warn!("could not save config: {e}");
                    format!("Endpoint applied but not saved: {e}")
                }
            },
            None => "Endpoint applied for this session.".to_string(),
        };
        self.endpoint_input = config.endpoint_url.clone();
        self.config = config;
        self.panel = Panel::Upload;
    }
}
