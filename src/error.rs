//! Error type shared by every invoice render stage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the invoice pipeline.
///
/// Every variant belongs to exactly one stage; see [`InvoiceError::stage`].
#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("failed to read invoice input {}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse invoice JSON")]
    InputParse(#[source] serde_json::Error),

    #[error("failed to serialize invoice JSON")]
    OutputSerialize(#[source] serde_json::Error),

    #[error("failed to load invoice fonts")]
    FontLoad(#[source] genpdf::error::Error),

    #[error("failed to fetch logo from {url}")]
    LogoFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read logo file {}", path.display())]
    LogoRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode logo image")]
    LogoDecode(#[source] image::ImageError),

    #[error("logo image has zero width or height")]
    EmptyLogo,

    #[error("failed to render invoice document")]
    Render(#[source] genpdf::error::Error),
}

impl InvoiceError {
    /// Name of the pipeline stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InputRead { .. } | Self::InputParse(_) => "input",
            Self::FontLoad(_) => "fonts",
            Self::LogoFetch { .. }
            | Self::LogoRead { .. }
            | Self::LogoDecode(_)
            | Self::EmptyLogo => "logo",
            Self::Render(_) => "render",
            Self::OutputSerialize(_) => "output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_named_after_the_failing_step() {
        let err = InvoiceError::LogoRead {
            path: PathBuf::from("missing.png"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.stage(), "logo");
        assert_eq!(err.to_string(), "failed to read logo file missing.png");

        let err = InvoiceError::FontLoad(genpdf::error::Error::new(
            "no fonts",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        ));
        assert_eq!(err.stage(), "fonts");
        assert_eq!(InvoiceError::EmptyLogo.stage(), "logo");
    }

    #[test]
    fn serialization_failures_are_not_reported_as_parse_errors() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = InvoiceError::OutputSerialize(source);
        assert_eq!(err.stage(), "output");
        assert_eq!(err.to_string(), "failed to serialize invoice JSON");
    }
}
