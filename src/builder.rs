//! Invoice rendering entry point.

use std::time::Duration;

use genpdf::fonts::{FontData, FontFamily};
use genpdf::PaperSize;
use log::{debug, info};

use crate::elements::InvoicePage;
use crate::error::InvoiceError;
use crate::fonts::{self, FontSource};
use crate::layout::LayoutConfig;
use crate::logo::{Logo, LogoSource, DEFAULT_LOGO_TIMEOUT};
use crate::model::{Invoice, Totals};

/// Output of a successful render.
#[derive(Clone, Debug)]
pub struct RenderedInvoice {
    /// The complete PDF byte stream.
    pub bytes: Vec<u8>,
    pub totals: Totals,
}

/// Renders invoices into A4 PDF documents.
///
/// A render runs three stages in order: `fonts`, `logo` and `render`.  A failure
/// in any stage aborts the render and no bytes are produced.
#[derive(Clone, Debug)]
pub struct InvoiceRenderer {
    fonts: FontSource,
    layout: LayoutConfig,
    logo_timeout: Duration,
}

impl Default for InvoiceRenderer {
    fn default() -> Self {
        Self {
            fonts: FontSource::default(),
            layout: LayoutConfig::default(),
            logo_timeout: DEFAULT_LOGO_TIMEOUT,
        }
    }
}

impl InvoiceRenderer {
    /// Creates a renderer with the bundled fonts and the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where the regular and bold fonts are loaded from.
    pub fn with_fonts(mut self, fonts: FontSource) -> Self {
        self.fonts = fonts;
        self
    }

    /// Replaces the page geometry.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Bounds the time spent fetching a remote logo.
    pub fn with_logo_timeout(mut self, timeout: Duration) -> Self {
        self.logo_timeout = timeout;
        self
    }

    /// Renders `invoice`, loading its logo reference if one is set.
    pub fn render(&self, invoice: &Invoice) -> Result<RenderedInvoice, InvoiceError> {
        let family = self.load_fonts()?;
        let logo = match invoice.logo() {
            Some(reference) => Some(LogoSource::parse(reference).load(self.logo_timeout)?),
            None => None,
        };
        self.render_document(family, invoice, logo)
    }

    /// Renders `invoice` with an already loaded logo, ignoring the invoice's logo reference.
    pub fn render_with_logo(
        &self,
        invoice: &Invoice,
        logo: Option<Logo>,
    ) -> Result<RenderedInvoice, InvoiceError> {
        let family = self.load_fonts()?;
        self.render_document(family, invoice, logo)
    }

    fn load_fonts(&self) -> Result<FontFamily<FontData>, InvoiceError> {
        fonts::load_font_family(&self.fonts).map_err(InvoiceError::FontLoad)
    }

    fn render_document(
        &self,
        family: FontFamily<FontData>,
        invoice: &Invoice,
        logo: Option<Logo>,
    ) -> Result<RenderedInvoice, InvoiceError> {
        info!(
            "Rendering invoice {} with {} line item(s)",
            invoice.id,
            invoice.items.len()
        );
        if let Some(logo) = &logo {
            let (width, height) = logo.scaled_to_width(self.layout.logo_width);
            debug!("Logo scaled to {:.1} x {:.1} pt", width, height);
        }

        let mut document = genpdf::Document::new(family);
        document.set_paper_size(PaperSize::A4);
        document.set_title(invoice.title.clone());
        document.push(InvoicePage::new(
            invoice.clone(),
            logo,
            self.layout.clone(),
        ));

        let mut bytes = Vec::new();
        document
            .render(&mut bytes)
            .map_err(InvoiceError::Render)?;
        info!("Rendered invoice {} ({} bytes)", invoice.id, bytes.len());

        Ok(RenderedInvoice {
            bytes,
            totals: invoice.totals(),
        })
    }
}

/// Renders `invoice` with the default renderer settings and returns the PDF bytes.
pub fn generate_invoice(invoice: &Invoice) -> Result<Vec<u8>, InvoiceError> {
    InvoiceRenderer::new()
        .render(invoice)
        .map(|rendered| rendered.bytes)
}
