//! UI components for PdfVault

pub mod dialogs;
pub mod drop_zone;
pub mod library;
pub mod viewer;
