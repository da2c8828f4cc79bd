//! Main application state and UI coordination

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::core::{
    config::AppConfig,
    repository::{FileRepository, IncomingFile, StoredFileRecord},
    store::SledStore,
    viewer::{ViewerController, ViewerSession},
};
use crate::ui::{
    dialogs::{ConfirmDeleteDialog, ErrorDialog, PendingDelete},
    drop_zone::DropZonePanel,
    library::LibraryPanel,
    viewer::ViewerPanel,
};

/// Uploaded texture for the currently rendered page
pub struct PageTexture {
    pub id: String,
    pub page: u16,
    pub handle: egui::TextureHandle,
}

/// Main application state
pub struct PdfVaultApp {
    /// Application configuration
    pub config: AppConfig,
    /// Saved-file repository, `None` when the record store failed to open
    pub repository: Option<FileRepository>,
    /// Viewer controller owning the open document
    pub viewer: ViewerController,
    /// Cached record list shown in the library panel
    pub files: Vec<StoredFileRecord>,
    /// Delete awaiting user confirmation
    pub pending_delete: Option<PendingDelete>,
    /// Error message awaiting dismissal
    pub last_error: Option<String>,
    /// Texture for the current page, keyed by record id and page number
    pub page_texture: Option<PageTexture>,
}

impl PdfVaultApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_default();

        let repository = match SledStore::open(&config.record_db_path()) {
            Ok(store) => Some(FileRepository::new(Arc::new(store))),
            Err(err) => {
                tracing::error!("Record store unavailable: {}", err);
                None
            }
        };

        let mut app = Self {
            viewer: ViewerController::new(config.viewer.render_scale),
            config,
            repository,
            files: Vec::new(),
            pending_delete: None,
            last_error: None,
            page_texture: None,
        };
        app.apply_theme(&cc.egui_ctx);
        app.refresh_files();
        app
    }

    /// Re-read the record list from storage; degrades to an empty list
    /// when the store is unreachable
    pub fn refresh_files(&mut self) {
        self.files = match &self.repository {
            Some(repo) => match repo.list_files() {
                Ok(records) => records,
                Err(err) => {
                    tracing::error!("Failed to list saved files: {}", err);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
    }

    /// Read files from disk and hand them to the repository
    pub fn import_paths(&mut self, paths: Vec<PathBuf>) {
        let mut files = Vec::new();
        let mut failures = Vec::new();
        for path in paths {
            match std::fs::read(&path) {
                Ok(bytes) => files.push(IncomingFile {
                    name: path
                        .file_name()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.to_string_lossy().to_string()),
                    bytes,
                }),
                Err(err) => failures.push(format!("{}: {}", path.display(), err)),
            }
        }
        if !failures.is_empty() {
            self.last_error = Some(format!("Some files could not be read:\n{}", failures.join("\n")));
        }
        self.import_files(files);
    }

    /// Persist a batch of incoming files and refresh the list
    pub fn import_files(&mut self, files: Vec<IncomingFile>) {
        if files.is_empty() {
            return;
        }
        let Some(repo) = &self.repository else {
            self.last_error = Some("Storage is unavailable; files were not saved.".to_string());
            return;
        };
        let report = repo.save_files(files);
        if !report.failures.is_empty() {
            let lines: Vec<String> = report
                .failures
                .iter()
                .map(|(name, err)| format!("{name}: {err}"))
                .collect();
            self.last_error = Some(format!("Some files could not be saved:\n{}", lines.join("\n")));
        }
        self.refresh_files();
    }

    /// Open a record in the viewer. A missing record is a silent no-op.
    pub fn view_file(&mut self, id: &str) {
        let Some(repo) = &self.repository else {
            return;
        };
        match repo.get_file(id) {
            Ok(Some(record)) => {
                self.page_texture = None;
                if let Err(err) = self.viewer.open(&record) {
                    self.last_error = Some(format!("Could not open {}: {}", record.name, err));
                }
            }
            Ok(None) => {}
            Err(err) => {
                self.last_error = Some(format!("Could not load record: {}", err));
            }
        }
    }

    /// Write a record's decoded bytes to a user-chosen path
    pub fn download_file(&mut self, id: &str) {
        let Some(repo) = &self.repository else {
            return;
        };
        let record = match repo.get_file(id) {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(err) => {
                self.last_error = Some(format!("Could not load record: {}", err));
                return;
            }
        };
        let bytes = match record.decoded_data() {
            Ok(bytes) => bytes,
            Err(err) => {
                self.last_error = Some(format!("Could not decode {}: {}", record.name, err));
                return;
            }
        };
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&record.name)
            .save_file()
        {
            if let Err(err) = std::fs::write(&path, bytes) {
                self.last_error = Some(format!("Could not write {}: {}", path.display(), err));
            } else {
                tracing::info!("Exported {} to {}", record.name, path.display());
            }
        }
    }

    /// Ask for confirmation before deleting a record
    pub fn request_delete(&mut self, id: String, name: String) {
        self.pending_delete = Some(PendingDelete { id, name });
    }

    /// Remove a record; closes the viewer if it shows that record
    pub fn delete_file(&mut self, id: &str) {
        let Some(repo) = &self.repository else {
            return;
        };
        if let Err(err) = repo.delete_file(id) {
            self.last_error = Some(format!("Could not delete file: {}", err));
            return;
        }
        if self.viewer.is_viewing(id) {
            self.viewer.close();
            self.page_texture = None;
        }
        self.refresh_files();
    }

    /// Render the current page if needed and sync it to a texture
    pub fn ensure_page_texture(&mut self, ctx: &egui::Context) {
        let (id, page, needs_render) = match self.viewer.session() {
            ViewerSession::Open(doc) => (doc.id.clone(), doc.page, doc.rendered.is_none()),
            ViewerSession::Closed => {
                self.page_texture = None;
                return;
            }
        };

        if needs_render {
            if let Err(err) = self.viewer.render_current_page() {
                tracing::error!("Page render failed: {}", err);
                self.last_error = Some(format!("Could not render page: {}", err));
                self.viewer.close();
                self.page_texture = None;
                return;
            }
        }

        let stale = self
            .page_texture
            .as_ref()
            .map(|t| t.id != id || t.page != page)
            .unwrap_or(true);
        if stale {
            if let ViewerSession::Open(doc) = self.viewer.session() {
                if let Some(rendered) = &doc.rendered {
                    let image = egui::ColorImage::from_rgba_unmultiplied(
                        [rendered.width as usize, rendered.height as usize],
                        &rendered.rgba,
                    );
                    let handle = ctx.load_texture("pdf_page", image, egui::TextureOptions::LINEAR);
                    self.page_texture = Some(PageTexture { id, page, handle });
                }
            }
        }
    }

    /// Toggle between the light and dark theme and persist the choice
    pub fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.config.ui.theme = if self.config.ui.theme == "dark" {
            "light".to_string()
        } else {
            "dark".to_string()
        };
        self.apply_theme(ctx);
        let _ = self.config.save();
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        if self.config.ui.theme == "light" {
            ctx.set_visuals(egui::Visuals::light());
        } else {
            ctx.set_visuals(egui::Visuals::dark());
        }
    }

    /// Convert dropped files into incoming files and import them
    fn handle_dropped_files(&mut self, dropped: Vec<egui::DroppedFile>) {
        let mut files = Vec::new();
        let mut failures = Vec::new();
        for file in dropped {
            if let Some(bytes) = &file.bytes {
                let name = if file.name.is_empty() {
                    "dropped.pdf".to_string()
                } else {
                    file.name.clone()
                };
                files.push(IncomingFile {
                    name,
                    bytes: bytes.to_vec(),
                });
            } else if let Some(path) = &file.path {
                match std::fs::read(path) {
                    Ok(bytes) => files.push(IncomingFile {
                        name: path
                            .file_name()
                            .map(|s| s.to_string_lossy().to_string())
                            .unwrap_or_else(|| path.to_string_lossy().to_string()),
                        bytes,
                    }),
                    Err(err) => failures.push(format!("{}: {}", path.display(), err)),
                }
            }
        }
        if !failures.is_empty() {
            self.last_error = Some(format!("Some files could not be read:\n{}", failures.join("\n")));
        }
        self.import_files(files);
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Add PDFs...").clicked() {
                        if let Some(paths) = rfd::FileDialog::new()
                            .add_filter("PDF files", &["pdf"])
                            .pick_files()
                        {
                            self.import_paths(paths);
                        }
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Theme").clicked() {
                        self.toggle_theme(ctx);
                        ui.close();
                    }
                    if ui.button("Close Document").clicked() {
                        self.viewer.close();
                        self.page_texture = None;
                        ui.close();
                    }
                });
            });
        });
    }
}

impl eframe::App for PdfVaultApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Files dropped anywhere on the window are treated as uploads
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            self.handle_dropped_files(dropped);
        }

        // Keyboard page navigation
        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowRight) {
                self.viewer.next_page();
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                self.viewer.previous_page();
            }
        });

        // Render menu bar
        self.render_menu_bar(ctx);

        // Modal dialogs
        if let Some(id) = ConfirmDeleteDialog::show(ctx, &mut self.pending_delete) {
            self.delete_file(&id);
        }
        ErrorDialog::show(ctx, &mut self.last_error);

        // Library sidebar with drop zone and saved-file list
        egui::SidePanel::left("library_panel")
            .resizable(true)
            .default_width(self.config.ui.sidebar_width)
            .min_width(200.0)
            .show(ctx, |ui| {
                DropZonePanel::show(ui, self);
                ui.separator();
                LibraryPanel::show(ui, self);
            });

        // Viewer fills the remaining space
        egui::CentralPanel::default().show(ctx, |ui| {
            ViewerPanel::show(ui, self);
        });
    }
}
