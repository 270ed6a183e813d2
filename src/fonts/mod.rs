//! Font loading utilities for the invoice renderer.
//!
//! The invoice uses two TrueType faces of the Inter family, regular and bold.
//! They are looked up on disk (see [`FontSource::Bundled`]) or supplied as raw
//! bytes by the caller.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::debug;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Inter";

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "INVOICE_PDF_FONTS_DIR";

const REGULAR_FONT_FILE: &str = "Inter-Regular.ttf";
const BOLD_FONT_FILE: &str = "Inter-Bold.ttf";
const FONT_FILES: &[&str] = &[REGULAR_FONT_FILE, BOLD_FONT_FILE];

/// Where the regular and bold font data is taken from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FontSource {
    /// Search `$INVOICE_PDF_FONTS_DIR`, `<exe dir>/assets/fonts` and the crate's
    /// `assets/fonts`, in that order.
    #[default]
    Bundled,
    /// Load both files from the given directory.
    Directory(PathBuf),
    /// Use in-memory TrueType data.
    Bytes { regular: Vec<u8>, bold: Vec<u8> },
}

/// Directory holding the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(path) = env::var(FONTS_DIR_ENV) {
        if !path.trim().is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.iter().any(|existing| existing == &candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates
        .iter()
        .any(|existing| existing == &manifest_candidate)
    {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn describe_attempt(candidate: &Path) -> Option<String> {
    if !candidate.is_dir() {
        return Some(format!("{} (directory missing)", candidate.display()));
    }

    let missing = missing_font_files(candidate);
    if missing.is_empty() {
        return None;
    }

    let missing_list = missing
        .iter()
        .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "{} (missing files [{}])",
        candidate.display(),
        missing_list
    ))
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        match describe_attempt(&candidate) {
            None => return Ok(candidate),
            Some(reason) => attempts.push(reason),
        }
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate the {} font directory. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME, summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

fn load_font_file(directory: &Path, file: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::InvalidData
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load font {}: {}", path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_font_bytes(data: &[u8], style: &str) -> Result<FontData, Error> {
    FontData::new(data.to_vec(), None).map_err(|err| {
        Error::new(
            format!("Failed to parse {} font data: {}", style, err),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

/// Regular data doubles as italic and bold data as bold italic.
fn family_from(regular: FontData, bold: FontData) -> FontFamily<FontData> {
    FontFamily {
        italic: regular.clone(),
        regular,
        bold_italic: bold.clone(),
        bold,
    }
}

fn load_from_directory(directory: &Path) -> Result<FontFamily<FontData>, Error> {
    if let Some(reason) = describe_attempt(directory) {
        return Err(Error::new(
            format!("Font directory unusable: {}", reason),
            io::Error::new(io::ErrorKind::NotFound, "font files not found"),
        ));
    }

    debug!("Loading {} fonts from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());
    Ok(family_from(
        load_font_file(directory, REGULAR_FONT_FILE)?,
        load_font_file(directory, BOLD_FONT_FILE)?,
    ))
}

/// Loads the invoice font family from `source`.
pub fn load_font_family(source: &FontSource) -> Result<FontFamily<FontData>, Error> {
    match source {
        FontSource::Bundled => load_from_directory(&resolve_font_directory()?),
        FontSource::Directory(directory) => load_from_directory(directory),
        FontSource::Bytes { regular, bold } => Ok(family_from(
            load_font_bytes(regular, "regular")?,
            load_font_bytes(bold, "bold")?,
        )),
    }
}

/// Indicates whether the bundled font search finds both font files.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_reports_missing_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = load_font_family(&FontSource::Directory(dir.path().to_path_buf())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(REGULAR_FONT_FILE), "{message}");
        assert!(message.contains(BOLD_FONT_FILE), "{message}");
    }

    #[test]
    fn absent_directory_is_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("nope");
        let err = load_font_family(&FontSource::Directory(missing)).unwrap_err();
        assert!(err.to_string().contains("directory missing"));
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let source = FontSource::Bytes {
            regular: b"not a font".to_vec(),
            bold: b"not a font either".to_vec(),
        };
        assert!(load_font_family(&source).is_err());
    }
}
