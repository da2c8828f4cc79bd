//! Page viewer panel: current page image, indicator and navigation

use eframe::egui;

use crate::app::PdfVaultApp;
use crate::core::viewer::ViewerSession;

/// Viewer panel showing the open document
pub struct ViewerPanel;

impl ViewerPanel {
    /// Show the viewer
    pub fn show(ui: &mut egui::Ui, app: &mut PdfVaultApp) {
        app.ensure_page_texture(ui.ctx());

        let open = match app.viewer.session() {
            ViewerSession::Open(doc) => Some((doc.name.clone(), doc.page, doc.page_count)),
            ViewerSession::Closed => None,
        };

        let Some((name, page, page_count)) = open else {
            ui.centered_and_justified(|ui| {
                ui.label("Select a file to view");
            });
            return;
        };

        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(page > 1, egui::Button::new("\u{25C0} Previous"))
                    .clicked()
                {
                    app.viewer.previous_page();
                }
                ui.label(format!("Page {} / {}", page, page_count));
                if ui
                    .add_enabled(page < page_count, egui::Button::new("Next \u{25B6}"))
                    .clicked()
                {
                    app.viewer.next_page();
                }
                ui.separator();
                ui.label(egui::RichText::new(&name).weak());
            });
        });

        ui.separator();

        egui::ScrollArea::both()
            .id_salt("viewer_scroll")
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    if let Some(texture) = &app.page_texture {
                        ui.add(
                            egui::Image::new(&texture.handle).max_width(ui.available_width()),
                        );
                    } else {
                        ui.spinner();
                    }
                });
            });
    }
}
