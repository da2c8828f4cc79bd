//! Modal dialogs: delete confirmation and error display

use eframe::egui;

/// A delete waiting for the user's confirmation
pub struct PendingDelete {
    pub id: String,
    pub name: String,
}

/// Modal confirmation shown before a record is deleted
pub struct ConfirmDeleteDialog;

impl ConfirmDeleteDialog {
    /// Show the dialog while a delete is pending.
    ///
    /// Returns the record id once the user confirms; clears the pending
    /// state on either confirm or cancel.
    pub fn show(ctx: &egui::Context, pending: &mut Option<PendingDelete>) -> Option<String> {
        let mut confirmed = None;
        let mut dismiss = false;

        if let Some(delete) = pending.as_ref() {
            egui::Window::new("Delete file")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Delete \"{}\"?", delete.name));
                    ui.label("This cannot be undone.");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            dismiss = true;
                        }
                        if ui.button("Delete").clicked() {
                            confirmed = Some(delete.id.clone());
                            dismiss = true;
                        }
                    });
                });
        }

        if dismiss {
            *pending = None;
        }
        confirmed
    }
}

/// Modal error message with a single dismiss button
pub struct ErrorDialog;

impl ErrorDialog {
    /// Show the dialog while an error message is set
    pub fn show(ctx: &egui::Context, error: &mut Option<String>) {
        let mut dismiss = false;

        if let Some(message) = error.as_ref() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        dismiss = true;
                    }
                });
        }

        if dismiss {
            *error = None;
        }
    }
}
