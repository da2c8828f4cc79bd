//! Drop target for importing PDF files

use eframe::egui;

use crate::app::PdfVaultApp;

/// Drag-and-drop area with a click-to-browse fallback
pub struct DropZonePanel;

impl DropZonePanel {
    /// Show the drop zone
    pub fn show(ui: &mut egui::Ui, app: &mut PdfVaultApp) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());

        let stroke = if hovering {
            egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
        } else {
            egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
        };

        egui::Frame::group(ui.style())
            .stroke(stroke)
            .corner_radius(egui::CornerRadius::same(6))
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("\u{1F4C4}").size(28.0));
                    ui.label("Drag & drop PDF files here");
                    ui.add_space(4.0);
                    if ui.button("Select PDFs...").clicked() {
                        if let Some(paths) = rfd::FileDialog::new()
                            .add_filter("PDF files", &["pdf"])
                            .pick_files()
                        {
                            app.import_paths(paths);
                        }
                    }
                });
            });
    }
}
