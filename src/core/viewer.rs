//! Viewer controller: the open-document session and page rendering

use pdfium_render::prelude::*;

use super::error::{Result, VaultError};
use super::repository::StoredFileRecord;

/// Display scale applied when rendering a page
pub const DEFAULT_RENDER_SCALE: f32 = 1.3;

/// A rendered page as raw RGBA pixels, ready for texture upload
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Rendering capability consumed by the viewer.
///
/// Page indices are 0-based here; the session's page cursor is 1-based.
pub trait RenderEngine {
    /// Number of pages in the document
    fn page_count(&self, data: &[u8]) -> Result<u16>;

    /// Render one page at the given scale factor
    fn render_page(&self, data: &[u8], index: u16, scale: f32) -> Result<RenderedPage>;
}

/// PDFium-backed [`RenderEngine`]
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Bind the PDFium library, preferring a copy next to the executable
    /// and falling back to the system library.
    pub fn init() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| VaultError::EngineInit(err.to_string()))?;
        tracing::info!("PDFium rendering engine initialized");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    fn load<'a>(&'a self, data: &'a [u8]) -> Result<PdfDocument<'a>> {
        self.pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|err| VaultError::BadDocument(err.to_string()))
    }
}

impl RenderEngine for PdfiumEngine {
    fn page_count(&self, data: &[u8]) -> Result<u16> {
        Ok(self.load(data)?.pages().len())
    }

    fn render_page(&self, data: &[u8], index: u16, scale: f32) -> Result<RenderedPage> {
        let document = self.load(data)?;
        let page = document
            .pages()
            .get(index)
            .map_err(|_| VaultError::PageOutOfRange(index + 1))?;
        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().scale_page_by_factor(scale))
            .map_err(|err| VaultError::BadDocument(err.to_string()))?;
        let image: image::RgbaImage = bitmap.as_image().into_rgba8();
        Ok(RenderedPage {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }
}

/// The currently open document and its page cursor
#[derive(Debug)]
pub struct OpenDocument {
    /// Record id the document was opened from
    pub id: String,
    /// Display name
    pub name: String,
    /// Decoded file bytes, kept for per-page rendering
    data: Vec<u8>,
    /// Total number of pages
    pub page_count: u16,
    /// Current page, 1-based
    pub page: u16,
    /// Cached render of the current page, cleared on navigation
    pub rendered: Option<RenderedPage>,
}

/// Viewer session state
#[derive(Debug, Default)]
pub enum ViewerSession {
    #[default]
    Closed,
    Open(OpenDocument),
}

/// Owns the viewer session and the lazily bound rendering engine
pub struct ViewerController {
    engine: Option<Box<dyn RenderEngine>>,
    session: ViewerSession,
    scale: f32,
}

impl ViewerController {
    /// Controller with the default PDFium engine, bound on first open
    pub fn new(scale: f32) -> Self {
        Self {
            engine: None,
            session: ViewerSession::Closed,
            scale,
        }
    }

    /// Controller with an injected engine (used by tests)
    pub fn with_engine(engine: Box<dyn RenderEngine>, scale: f32) -> Self {
        Self {
            engine: Some(engine),
            session: ViewerSession::Closed,
            scale,
        }
    }

    /// Current session state
    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    /// Whether `id` is the currently open record
    pub fn is_viewing(&self, id: &str) -> bool {
        matches!(&self.session, ViewerSession::Open(doc) if doc.id == id)
    }

    /// Open a record for viewing.
    ///
    /// Any previously open document is released first. On failure the
    /// session is left `Closed`.
    pub fn open(&mut self, record: &StoredFileRecord) -> Result<()> {
        self.session = ViewerSession::Closed;
        let data = record.decoded_data()?;
        let page_count = self.engine()?.page_count(&data)?;
        tracing::info!("Opened {} ({} pages)", record.name, page_count);
        self.session = ViewerSession::Open(OpenDocument {
            id: record.id.clone(),
            name: record.name.clone(),
            data,
            page_count,
            page: 1,
            rendered: None,
        });
        Ok(())
    }

    /// Render the current page into the session's cache
    pub fn render_current_page(&mut self) -> Result<()> {
        if matches!(self.session, ViewerSession::Closed) {
            return Err(VaultError::NoOpenDocument);
        }
        if self.engine.is_none() {
            self.engine = Some(Box::new(PdfiumEngine::init()?));
        }
        let (engine, doc) = match (&self.engine, &mut self.session) {
            (Some(engine), ViewerSession::Open(doc)) => (engine, doc),
            _ => return Err(VaultError::NoOpenDocument),
        };
        doc.rendered = Some(engine.render_page(&doc.data, doc.page - 1, self.scale)?);
        Ok(())
    }

    /// Advance the page cursor; no-op on the last page or when closed
    pub fn next_page(&mut self) {
        if let ViewerSession::Open(doc) = &mut self.session {
            if doc.page < doc.page_count {
                doc.page += 1;
                doc.rendered = None;
            }
        }
    }

    /// Move the page cursor back; no-op on page 1 or when closed
    pub fn previous_page(&mut self) {
        if let ViewerSession::Open(doc) = &mut self.session {
            if doc.page > 1 {
                doc.page -= 1;
                doc.rendered = None;
            }
        }
    }

    /// Release the open document
    pub fn close(&mut self) {
        if let ViewerSession::Open(doc) = &self.session {
            tracing::info!("Closed {}", doc.name);
        }
        self.session = ViewerSession::Closed;
    }

    fn engine(&mut self) -> Result<&dyn RenderEngine> {
        if self.engine.is_none() {
            self.engine = Some(Box::new(PdfiumEngine::init()?));
        }
        match &self.engine {
            Some(engine) => Ok(engine.as_ref()),
            None => Err(VaultError::EngineInit("engine missing after init".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    struct FakeEngine {
        pages: u16,
        fail: bool,
    }

    impl RenderEngine for FakeEngine {
        fn page_count(&self, _data: &[u8]) -> Result<u16> {
            if self.fail {
                return Err(VaultError::BadDocument("fake parse failure".into()));
            }
            Ok(self.pages)
        }

        fn render_page(&self, _data: &[u8], index: u16, _scale: f32) -> Result<RenderedPage> {
            if index >= self.pages {
                return Err(VaultError::PageOutOfRange(index + 1));
            }
            Ok(RenderedPage {
                width: 1,
                height: 1,
                rgba: vec![0, 0, 0, 255],
            })
        }
    }

    fn record(name: &str) -> StoredFileRecord {
        StoredFileRecord {
            id: "pdf:1_aaaaaaaa".to_string(),
            name: name.to_string(),
            data: format!(
                "data:application/pdf;base64,{}",
                BASE64.encode(b"%PDF-1.4 fake")
            ),
            upload_date: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn controller(pages: u16) -> ViewerController {
        ViewerController::with_engine(
            Box::new(FakeEngine { pages, fail: false }),
            DEFAULT_RENDER_SCALE,
        )
    }

    #[test]
    fn test_open_starts_at_page_one() {
        let mut viewer = controller(3);
        viewer.open(&record("a.pdf")).unwrap();
        match viewer.session() {
            ViewerSession::Open(doc) => {
                assert_eq!(doc.page, 1);
                assert_eq!(doc.page_count, 3);
                assert!(doc.rendered.is_none());
            }
            ViewerSession::Closed => panic!("expected open session"),
        }
    }

    #[test]
    fn test_open_failure_leaves_session_closed() {
        let mut viewer = ViewerController::with_engine(
            Box::new(FakeEngine {
                pages: 0,
                fail: true,
            }),
            DEFAULT_RENDER_SCALE,
        );
        assert!(viewer.open(&record("bad.pdf")).is_err());
        assert!(matches!(viewer.session(), ViewerSession::Closed));
    }

    #[test]
    fn test_open_bad_payload_leaves_session_closed() {
        let mut viewer = controller(3);
        let mut rec = record("a.pdf");
        rec.data = "not-a-data-uri".to_string();
        assert!(viewer.open(&rec).is_err());
        assert!(matches!(viewer.session(), ViewerSession::Closed));
    }

    #[test]
    fn test_navigation_respects_bounds() {
        let mut viewer = controller(2);
        viewer.open(&record("a.pdf")).unwrap();

        viewer.previous_page(); // already at page 1
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.page == 1));

        viewer.next_page();
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.page == 2));

        viewer.next_page(); // already at last page
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.page == 2));

        viewer.previous_page();
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.page == 1));
    }

    #[test]
    fn test_navigation_invalidates_cached_render() {
        let mut viewer = controller(2);
        viewer.open(&record("a.pdf")).unwrap();
        viewer.render_current_page().unwrap();
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.rendered.is_some()));

        viewer.next_page();
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.rendered.is_none()));
    }

    #[test]
    fn test_render_requires_open_session() {
        let mut viewer = controller(2);
        assert!(matches!(
            viewer.render_current_page(),
            Err(VaultError::NoOpenDocument)
        ));
    }

    #[test]
    fn test_close_releases_document() {
        let mut viewer = controller(2);
        viewer.open(&record("a.pdf")).unwrap();
        assert!(viewer.is_viewing("pdf:1_aaaaaaaa"));

        viewer.close();
        assert!(matches!(viewer.session(), ViewerSession::Closed));
        assert!(!viewer.is_viewing("pdf:1_aaaaaaaa"));
    }

    #[test]
    fn test_reopen_resets_cursor() {
        let mut viewer = controller(3);
        viewer.open(&record("a.pdf")).unwrap();
        viewer.next_page();
        viewer.open(&record("b.pdf")).unwrap();
        assert!(matches!(viewer.session(), ViewerSession::Open(d) if d.page == 1));
    }
}
