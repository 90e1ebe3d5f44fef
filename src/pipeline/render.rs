//! First-page rasterisation: PDF → grayscale `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is not safe to drive from async contexts. Rendering runs on
//! tokio's blocking pool so the runtime's worker threads never stall.
//!
//! Only the first page is rendered: the student's name is always in the
//! form header.

use crate::error::DocumentError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns a document into a single grayscale page image.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, document: &Path) -> Result<DynamicImage, DocumentError>;
}

/// [`Rasterizer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    /// Rendering resolution for an A4/Letter page. Range: 72–600.
    pub dpi: u32,
    /// Cap on the longest rendered edge, in pixels.
    pub max_rendered_pixels: u32,
    /// User password for encrypted scans.
    pub password: Option<String>,
    /// Explicit pdfium library; `None` binds through `pdfium-auto`.
    pub library_path: Option<PathBuf>,
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 3000,
            password: None,
            library_path: None,
        }
    }
}

impl PdfiumRasterizer {
    /// Target width in pixels for a letter-width page (8.5in) at `dpi`.
    fn target_width(&self) -> i32 {
        let width = (self.dpi as f32 * 8.5).round() as u32;
        width.min(self.max_rendered_pixels) as i32
    }
}

#[async_trait]
impl Rasterizer for PdfiumRasterizer {
    async fn rasterize(&self, document: &Path) -> Result<DynamicImage, DocumentError> {
        let path = document.to_path_buf();
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.rasterize_blocking(&path))
            .await
            .map_err(|e| DocumentError::RasterizeFailed {
                detail: format!("render task panicked: {}", e),
            })?
    }
}

impl PdfiumRasterizer {
    fn rasterize_blocking(&self, pdf_path: &Path) -> Result<DynamicImage, DocumentError> {
        let pdfium = match &self.library_path {
            Some(lib) => pdfium_auto::bind_pdfium_from_path(lib),
            None => pdfium_auto::bind_pdfium_silent(),
        }
        .map_err(|e| DocumentError::RasterizeFailed {
            detail: format!("pdfium unavailable: {}", e),
        })?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, self.password.as_deref())
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                let detail = if err_str.to_lowercase().contains("password") {
                    "document is encrypted; provide --password".to_string()
                } else {
                    format!("cannot open PDF: {}", err_str)
                };
                DocumentError::RasterizeFailed { detail }
            })?;

        let pages = document.pages();
        let page = pages.first().map_err(|e| DocumentError::RasterizeFailed {
            detail: format!("document has no pages: {:?}", e),
        })?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.target_width())
            .set_maximum_height(self.max_rendered_pixels as i32);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| DocumentError::RasterizeFailed {
                    detail: format!("{:?}", e),
                })?;

        let image = DynamicImage::ImageLuma8(bitmap.as_image().into_luma8());
        debug!(
            "Rendered first page of '{}' → {}x{} px",
            pdf_path.display(),
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
