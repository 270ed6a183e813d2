//! Logo resolution, fetching and decoding.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba};
use log::debug;

use crate::error::InvoiceError;

/// Upper bound on the time spent fetching a remote logo.
pub const DEFAULT_LOGO_TIMEOUT: Duration = Duration::from_secs(10);

/// Where logo bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoSource {
    /// Fetched with an HTTP GET request.
    Url(String),
    /// Read from the local file system.
    Path(PathBuf),
    /// Already in memory.
    Bytes(Vec<u8>),
}

impl LogoSource {
    /// Interprets an invoice logo reference as a URL or a file path.
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::Url(reference.to_owned())
        } else {
            Self::Path(PathBuf::from(reference))
        }
    }

    /// Loads and decodes the logo.
    pub fn load(&self, timeout: Duration) -> Result<Logo, InvoiceError> {
        debug!("Loading logo from {}", self);
        match self {
            Self::Url(url) => Logo::from_bytes(fetch(url, timeout)?),
            Self::Path(path) => {
                let bytes = fs::read(path).map_err(|source| InvoiceError::LogoRead {
                    path: path.clone(),
                    source,
                })?;
                Logo::from_bytes(bytes)
            }
            Self::Bytes(bytes) => Logo::from_bytes(bytes),
        }
    }
}

impl fmt::Display for LogoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} in-memory bytes>", bytes.len()),
        }
    }
}

fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>, InvoiceError> {
    let wrap = |source| InvoiceError::LogoFetch {
        url: url.to_owned(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(wrap)?;
    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(wrap)?;
    let bytes = response.bytes().map_err(wrap)?;
    Ok(bytes.to_vec())
}

/// A decoded raster logo.
#[derive(Clone)]
pub struct Logo {
    image: DynamicImage,
}

impl Logo {
    /// Decodes an image in any format supported by the [`image`] crate.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, InvoiceError> {
        let image = image::load_from_memory(bytes.as_ref()).map_err(InvoiceError::LogoDecode)?;
        Self::from_dynamic_image(image)
    }

    /// Wraps an already decoded image.
    ///
    /// genpdf cannot embed images with an alpha channel, so transparent images
    /// are composited onto a white background.
    pub fn from_dynamic_image(image: DynamicImage) -> Result<Self, InvoiceError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(InvoiceError::EmptyLogo);
        }
        if image.color().has_alpha() {
            debug!("Flattening {}x{} logo with alpha onto white", width, height);
            return Ok(Self {
                image: flatten_onto_white(&image),
            });
        }
        Ok(Self { image })
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Native size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Returns the size of the logo scaled to `width`, preserving the aspect ratio.
    pub fn scaled_to_width(&self, width: f64) -> (f64, f64) {
        let (px_width, px_height) = self.dimensions();
        (width, f64::from(px_height) * width / f64::from(px_width))
    }
}

fn flatten_onto_white(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([red, green, blue, alpha]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(alpha);
        let blend = |channel: u8| {
            ((u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(red), blend(green), blend(blue)])
    });
    DynamicImage::ImageRgb8(flattened)
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("Logo")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{Cursor, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use image::{ImageBuffer, ImageOutputFormat};

    use super::*;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    /// Left half fully transparent, right half opaque red.
    pub(crate) fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    fn http_response(status: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    fn read_request(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(read) => request.extend_from_slice(&chunk[..read]),
            }
        }
    }

    /// Serves a single connection on loopback and returns the logo URL.
    fn serve_once(response: Option<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let address = listener.local_addr().expect("local address");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                match response {
                    Some(response) => {
                        let _ = stream.write_all(&response);
                    }
                    None => thread::sleep(Duration::from_secs(5)),
                }
            }
        });
        format!("http://{address}/logo.png")
    }

    #[test]
    fn references_are_classified_by_scheme() {
        assert_eq!(
            LogoSource::parse("https://cdn.example.com/logo.png"),
            LogoSource::Url("https://cdn.example.com/logo.png".to_owned())
        );
        assert_eq!(
            LogoSource::parse("http://localhost/logo.png"),
            LogoSource::Url("http://localhost/logo.png".to_owned())
        );
        assert_eq!(
            LogoSource::parse("assets/logo.png"),
            LogoSource::Path(PathBuf::from("assets/logo.png"))
        );
    }

    #[test]
    fn scaling_preserves_aspect_ratio() {
        let logo = Logo::from_bytes(png_bytes(400, 100)).expect("decode png");
        assert_eq!(logo.dimensions(), (400, 100));
        assert_eq!(logo.scaled_to_width(100.0), (100.0, 25.0));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = LogoSource::Bytes(b"definitely not an image".to_vec())
            .load(DEFAULT_LOGO_TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, InvoiceError::LogoDecode(_)));
    }

    #[test]
    fn logo_is_read_from_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("logo.png");
        fs::write(&path, png_bytes(50, 20)).expect("write logo");

        let logo = LogoSource::Path(path).load(DEFAULT_LOGO_TIMEOUT).expect("load logo");
        assert_eq!(logo.dimensions(), (50, 20));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = LogoSource::Path(dir.path().join("absent.png"))
            .load(DEFAULT_LOGO_TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, InvoiceError::LogoRead { .. }));
        assert_eq!(err.stage(), "logo");
    }

    #[test]
    fn transparent_logo_is_flattened_onto_white() {
        let logo = Logo::from_bytes(rgba_png_bytes(200, 50)).expect("decode png");
        let image = logo.image();

        assert!(!image.color().has_alpha());
        assert_eq!(logo.dimensions(), (200, 50));
        assert_eq!(image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(199, 49), Rgba([255, 0, 0, 255]));
        assert!(genpdf::elements::Image::from_dynamic_image(image.clone()).is_ok());
    }

    #[test]
    fn logo_is_fetched_over_http() {
        let url = serve_once(Some(http_response("200 OK", &png_bytes(64, 32))));
        let logo = LogoSource::parse(&url)
            .load(DEFAULT_LOGO_TIMEOUT)
            .expect("fetch logo");
        assert_eq!(logo.dimensions(), (64, 32));
    }

    #[test]
    fn http_error_status_is_a_fetch_error() {
        let url = serve_once(Some(http_response("404 Not Found", b"")));
        let err = LogoSource::parse(&url)
            .load(DEFAULT_LOGO_TIMEOUT)
            .unwrap_err();
        assert!(matches!(&err, InvoiceError::LogoFetch { url: failed, .. } if *failed == url));
        assert_eq!(err.stage(), "logo");
    }

    #[test]
    fn slow_server_hits_the_fetch_timeout() {
        let url = serve_once(None);
        let err = LogoSource::parse(&url)
            .load(Duration::from_millis(200))
            .unwrap_err();
        assert!(matches!(err, InvoiceError::LogoFetch { .. }));
    }
}
