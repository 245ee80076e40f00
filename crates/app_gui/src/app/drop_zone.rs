//! The drop target shown while nothing is selected.

use eframe::egui::{self, Color32};
use whatsit_core::DropTargetState;

const BASE_BORDER: Color32 = Color32::from_rgb(0xee, 0xee, 0xee);
const FOCUSED_BORDER: Color32 = Color32::from_rgb(0x21, 0x96, 0xf3);
const ACCEPT_BORDER: Color32 = Color32::from_rgb(0x00, 0xe6, 0x76);
const REJECT_BORDER: Color32 = Color32::from_rgb(0xff, 0x17, 0x44);
const FILL: Color32 = Color32::from_rgb(0xfa, 0xfa, 0xfa);
const TEXT: Color32 = Color32::from_rgb(0xbd, 0xbd, 0xbd);

const MIN_WIDTH: f32 = 320.0;

pub(super) fn border_color(state: DropTargetState) -> Color32 {
    match state {
        DropTargetState::Idle => BASE_BORDER,
        DropTargetState::Focused => FOCUSED_BORDER,
        DropTargetState::Accept => ACCEPT_BORDER,
        DropTargetState::Reject => REJECT_BORDER,
    }
}

/// Clicking the returned response should open the file picker.
pub(super) fn show(ui: &mut egui::Ui, state: DropTargetState, prompt: &str) -> egui::Response {
    let width = (ui.available_width() * 0.4).max(MIN_WIDTH);
    let frame = egui::Frame::new()
        .fill(FILL)
        .stroke(egui::Stroke::new(2.0, border_color(state)))
        .corner_radius(egui::CornerRadius::same(2))
        .inner_margin(egui::Margin::same(32));
    frame
        .show(ui, |ui| {
            ui.set_width(width);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(prompt).color(TEXT));
            });
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
}
