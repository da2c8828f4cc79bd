//! Saved-file list with per-record actions

use eframe::egui;

use crate::app::PdfVaultApp;

/// Action selected on a library row, applied after the list is drawn
enum LibraryAction {
    View(String),
    Download(String),
    Delete { id: String, name: String },
}

/// Library panel listing all saved records
pub struct LibraryPanel;

impl LibraryPanel {
    /// Show the saved-file list
    pub fn show(ui: &mut egui::Ui, app: &mut PdfVaultApp) {
        ui.horizontal(|ui| {
            ui.heading("Library");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("\u{21BB}").on_hover_text("Refresh").clicked() {
                    app.refresh_files();
                }
            });
        });

        ui.separator();

        if app.repository.is_none() {
            ui.label("Storage is unavailable in this environment.");
            return;
        }

        if app.files.is_empty() {
            ui.label("No saved files yet.");
            return;
        }

        let mut action = None;

        egui::ScrollArea::vertical()
            .id_salt("library_scroll")
            .show(ui, |ui| {
                for i in 0..app.files.len() {
                    let (id, name, date) = {
                        let record = &app.files[i];
                        (
                            record.id.clone(),
                            record.name.clone(),
                            record.upload_date_display(),
                        )
                    };
                    let is_open = app.viewer.is_viewing(&id);

                    ui.vertical(|ui| {
                        if ui
                            .selectable_label(is_open, egui::RichText::new(&name).strong())
                            .clicked()
                        {
                            action = Some(LibraryAction::View(id.clone()));
                        }
                        ui.label(egui::RichText::new(&date).small().weak());
                        ui.horizontal(|ui| {
                            if ui.small_button("View").clicked() {
                                action = Some(LibraryAction::View(id.clone()));
                            }
                            if ui.small_button("Save As...").clicked() {
                                action = Some(LibraryAction::Download(id.clone()));
                            }
                            if ui.small_button("Delete").clicked() {
                                action = Some(LibraryAction::Delete {
                                    id: id.clone(),
                                    name: name.clone(),
                                });
                            }
                        });
                    });
                    ui.separator();
                }
            });

        match action {
            Some(LibraryAction::View(id)) => app.view_file(&id),
            Some(LibraryAction::Download(id)) => app.download_file(&id),
            Some(LibraryAction::Delete { id, name }) => app.request_delete(id, name),
            None => {}
        }
    }
}
