//! Drawing primitives the layout engine targets.
//!
//! Coordinates are PDF points measured from the top-left corner of the page.
//! The [`Canvas`] trait mirrors a cursor-driven page API: text cells are written
//! at the cursor and push it right by their width, and line breaks return the
//! cursor to the left margin.

use crate::logo::Logo;

/// An RGB color used for text and strokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// A neutral grey with all channels set to `level`.
    pub const fn grey(level: u8) -> Self {
        Self(level, level, level)
    }
}

/// Font weights available on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font selection for subsequent text cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub weight: FontWeight,
    /// Size in points.
    pub size: f64,
}

impl FontSpec {
    pub const fn regular(size: f64) -> Self {
        Self {
            weight: FontWeight::Regular,
            size,
        }
    }

    pub const fn bold(size: f64) -> Self {
        Self {
            weight: FontWeight::Bold,
            size,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::regular(10.0)
    }
}

/// A position on the page in points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Write position shared by canvas implementations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    left_margin: f64,
    position: Point,
}

impl Cursor {
    /// Creates a cursor at the top-left corner of the content box.
    pub fn new(left_margin: f64, top_margin: f64) -> Self {
        Self {
            left_margin,
            position: Point::new(left_margin, top_margin),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_x(&mut self, x: f64) {
        self.position.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.position.y = y;
    }

    /// Moves right by `width`.
    pub fn advance(&mut self, width: f64) {
        self.position.x += width;
    }

    /// Returns to the left margin and moves down by `height`.
    pub fn line_break(&mut self, height: f64) {
        self.position.x = self.left_margin;
        self.position.y += height;
    }
}

/// A page surface that positions styled text, rules and images.
pub trait Canvas {
    fn set_text_color(&mut self, color: Rgb);

    fn set_stroke_color(&mut self, color: Rgb);

    fn set_font(&mut self, font: FontSpec);

    /// Changes the size of the current font while keeping its weight.
    fn set_font_size(&mut self, size: f64);

    /// Writes `text` at the cursor and advances the cursor by its width.
    fn cell(&mut self, text: &str);

    /// Returns the cursor to the left margin and moves down by `height`.
    fn br(&mut self, height: f64);

    fn set_x(&mut self, x: f64);

    fn set_y(&mut self, y: f64);

    fn x(&self) -> f64;

    fn y(&self) -> f64;

    /// Strokes a straight line in the current stroke color.
    fn line(&mut self, from: Point, to: Point);

    /// Draws `logo` with its top-left corner at `at`, stretched to `width` x `height`.
    fn image(&mut self, logo: &Logo, at: Point, width: f64, height: f64);
}
