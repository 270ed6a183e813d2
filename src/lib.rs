//! Renders structured invoice records into single-page PDF documents.
//!
//! ```no_run
//! use invoice_pdf::builder::InvoiceRenderer;
//! use invoice_pdf::model::example_invoice;
//!
//! let rendered = InvoiceRenderer::new().render(&example_invoice())?;
//! std::fs::write("invoice.pdf", &rendered.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod canvas;
pub mod currency;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod logo;
pub mod model;

pub use builder::{generate_invoice, InvoiceRenderer, RenderedInvoice};
pub use error::InvoiceError;
pub use model::{Invoice, LineItem, Party};
