//! `genpdf` element that draws the invoice layout onto a page.
//!
//! [`InvoicePage`] owns everything needed for one render and, when `genpdf`
//! lays it out, runs [`layout::layout_invoice`] against a [`PdfCanvas`] that
//! wraps the page [`render::Area`].  The canvas keeps the layout engine's
//! top-left point coordinates and converts them to millimetres on the way out.

use image::GenericImageView;
use log::warn;

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Scale, Size};

use crate::canvas::{Canvas, Cursor, FontSpec, FontWeight, Point, Rgb};
use crate::layout::{self, LayoutConfig};
use crate::logo::Logo;
use crate::model::Invoice;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn mm_from_pt(points: f64) -> Mm {
    mm_from_f64(points * MM_PER_INCH / POINTS_PER_INCH)
}

fn mm_to_pt(value: Mm) -> f64 {
    mm_to_f64(value) * POINTS_PER_INCH / MM_PER_INCH
}

fn position_from(point: Point) -> Position {
    Position::new(mm_from_pt(point.x), mm_from_pt(point.y))
}

fn color_from(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// The single page of an invoice.
pub struct InvoicePage {
    invoice: Invoice,
    logo: Option<Logo>,
    config: LayoutConfig,
}

impl InvoicePage {
    pub fn new(invoice: Invoice, logo: Option<Logo>, config: LayoutConfig) -> Self {
        Self {
            invoice,
            logo,
            config,
        }
    }
}

impl Element for InvoicePage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let size = area.size();
        let mut canvas = PdfCanvas::new(context, area, style, &self.config);
        layout::layout_invoice(&mut canvas, &self.invoice, self.logo.as_ref(), &self.config);
        canvas.finish()?;

        let mut result = RenderResult::default();
        result.size = size;
        Ok(result)
    }
}

/// [`Canvas`] backed by a `genpdf` render area.
///
/// Drawing calls cannot fail through the [`Canvas`] API, so the first backend
/// error is kept and returned by [`PdfCanvas::finish`].
pub struct PdfCanvas<'c, 'p> {
    context: &'c genpdf::Context,
    area: render::Area<'p>,
    base_style: Style,
    cursor: Cursor,
    font: FontSpec,
    text_color: Rgb,
    stroke_color: Rgb,
    error: Option<Error>,
}

impl<'c, 'p> PdfCanvas<'c, 'p> {
    pub fn new(
        context: &'c genpdf::Context,
        area: render::Area<'p>,
        base_style: Style,
        config: &LayoutConfig,
    ) -> Self {
        Self {
            context,
            area,
            base_style,
            cursor: Cursor::new(config.margin, config.margin),
            font: FontSpec::default(),
            text_color: Rgb::grey(0),
            stroke_color: Rgb::grey(0),
            error: None,
        }
    }

    /// Returns the first drawing error, if any occurred.
    pub fn finish(self) -> Result<(), Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn text_style(&self) -> Style {
        let size = self.font.size.round().clamp(1.0, f64::from(u8::MAX)) as u8;
        let mut style = Style::new()
            .with_font_size(size)
            .with_color(color_from(self.text_color));
        if self.font.weight == FontWeight::Bold {
            style.set_bold();
        }
        self.base_style.and(style)
    }
}

impl Canvas for PdfCanvas<'_, '_> {
    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke_color = color;
    }

    fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    fn set_font_size(&mut self, size: f64) {
        self.font.size = size;
    }

    fn cell(&mut self, text: &str) {
        let style = self.text_style();
        let width = StyledString::new(text.to_owned(), style).width(&self.context.font_cache);
        let position = position_from(self.cursor.position());

        let printed = self
            .area
            .text_section(&self.context.font_cache, position, style)
            .map(|mut section| section.print_str(text, style));
        match printed {
            Some(Ok(())) => {}
            Some(Err(err)) => self.record(err),
            None => warn!(
                "Text '{}' at ({:.1}, {:.1}) does not fit on the page",
                text,
                self.cursor.position().x,
                self.cursor.position().y
            ),
        }

        self.cursor.advance(mm_to_pt(width));
    }

    fn br(&mut self, height: f64) {
        self.cursor.line_break(height);
    }

    fn set_x(&mut self, x: f64) {
        self.cursor.set_x(x);
    }

    fn set_y(&mut self, y: f64) {
        self.cursor.set_y(y);
    }

    fn x(&self) -> f64 {
        self.cursor.position().x
    }

    fn y(&self) -> f64 {
        self.cursor.position().y
    }

    fn line(&mut self, from: Point, to: Point) {
        let line_style = Style::new().with_color(color_from(self.stroke_color));
        self.area
            .draw_line(vec![position_from(from), position_from(to)], line_style);
    }

    fn image(&mut self, logo: &Logo, at: Point, width: f64, height: f64) {
        let natural = estimated_image_size(logo.image(), DEFAULT_IMAGE_DPI);
        let natural_width = mm_to_f64(natural.width);
        let natural_height = mm_to_f64(natural.height);
        if natural_width <= f64::EPSILON || natural_height <= f64::EPSILON {
            return;
        }

        let mut image = match Image::from_dynamic_image(logo.image().clone()) {
            Ok(image) => image,
            Err(err) => {
                self.record(err);
                return;
            }
        };
        image.set_scale(Scale::new(
            mm_to_f64(mm_from_pt(width)) / natural_width,
            mm_to_f64(mm_from_pt(height)) / natural_height,
        ));

        let mut area = self.area.clone();
        area.add_offset(position_from(at));
        if let Err(err) = image.render(self.context, area, self.base_style) {
            self.record(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_convert_to_millimetres() {
        assert!((mm_to_f64(mm_from_pt(72.0)) - 25.4).abs() < 1e-9);
        assert!((mm_to_pt(mm_from_f64(25.4)) - 72.0).abs() < 1e-9);
    }

    #[test]
    fn image_size_is_estimated_from_dpi() {
        let image = image::DynamicImage::new_rgb8(300, 150);
        let size = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
        assert!((mm_to_f64(size.width) - 25.4).abs() < 1e-9);
        assert!((mm_to_f64(size.height) - 12.7).abs() < 1e-9);
    }
}
