//! Fixed-position invoice layout.
//!
//! The layout is a straight sequence of blocks: header, title, bill-to, table
//! header, item rows, notes, totals, due date and footer.  Each block writes to a
//! [`Canvas`] and leaves the cursor where the next block expects it.  Most
//! positions are absolute; only the blocks above the item table flow from the
//! height of the logo and the party lines.

use crate::canvas::{Canvas, FontSpec, Point, Rgb};
use crate::currency::format_money;
use crate::logo::Logo;
use crate::model::{split_lines, Invoice, LineItem, Totals};

const INK: Rgb = Rgb::grey(0);
const BODY: Rgb = Rgb::grey(55);
const LABEL: Rgb = Rgb::grey(75);
const MUTED: Rgb = Rgb::grey(100);
const SEPARATOR: Rgb = Rgb::grey(150);
const RULE: Rgb = Rgb::grey(225);

const LABEL_FONT: FontSpec = FontSpec::regular(9.0);
const LABEL_ADVANCE: f64 = 18.0;
const BODY_FONT_SIZE: f64 = 10.0;
const BODY_ADVANCE: f64 = 15.0;

const SENDER_NAME_SIZE: f64 = 12.0;
const SENDER_NAME_ADVANCE: f64 = 18.0;
const HEADER_NOTE_SIZE: f64 = 8.0;
const HEADER_NOTE_PADDING: f64 = 4.0;
const HEADER_RULE_GAP_ABOVE: f64 = 21.0;
const HEADER_RULE_GAP_BELOW: f64 = 36.0;

const TITLE_FONT: FontSpec = FontSpec::bold(24.0);
const TITLE_ADVANCE: f64 = 36.0;
const TITLE_META_FONT: FontSpec = FontSpec::regular(12.0);
const TITLE_META_SEPARATOR: &str = "  ·  ";
const TITLE_GAP: f64 = 48.0;

const RECIPIENT_NAME_SIZE: f64 = 15.0;
const RECIPIENT_NAME_ADVANCE: f64 = 20.0;
const BILL_TO_GAP: f64 = 46.0;

const ROW_FONT: FontSpec = FontSpec::regular(11.0);

const NOTE_FONT_SIZE: f64 = 12.0;
const NOTES_GAP: f64 = 48.0;

const TOTAL_VALUE_SIZE: f64 = 12.0;
const GRAND_TOTAL_FONT: FontSpec = FontSpec::bold(11.5);
const DUE_DATE_VALUE_SIZE: f64 = 11.0;
const DUE_DATE_ADVANCE: f64 = 12.0;

const FOOTER_FONT: FontSpec = FontSpec::regular(10.0);
const FOOTER_RULE_INDENT: f64 = 10.0;
const FOOTER_RULE_DROP: f64 = 6.0;
const FOOTER_GAP: f64 = 48.0;

pub const SUBTOTAL_LABEL: &str = "Subtotal";
pub const TAX_LABEL: &str = "Tax";
pub const DISCOUNT_LABEL: &str = "Discount";
pub const FEES_LABEL: &str = "Fees";
pub const TOTAL_LABEL: &str = "Total";
pub const DUE_DATE_LABEL: &str = "Due Date";

/// Page geometry of the invoice layout, in points from the top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Margin applied on every side of the page.
    pub margin: f64,
    pub logo_width: f64,
    /// Vertical gap between the logo and the sender block.
    pub logo_gap: f64,
    /// Right end of the rule that closes the sender block.
    pub header_rule_end_x: f64,
    pub quantity_column: f64,
    pub rate_column: f64,
    pub amount_column: f64,
    /// Column of the values in the totals and due-date rows.
    pub total_value_column: f64,
    pub notes_anchor_y: f64,
    pub totals_anchor_y: f64,
    pub footer_anchor_y: f64,
    pub footer_rule_end_x: f64,
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 40.0,
            logo_width: 100.0,
            logo_gap: 24.0,
            header_rule_end_x: 260.0,
            quantity_column: 360.0,
            rate_column: 405.0,
            amount_column: 480.0,
            total_value_column: 465.0,
            notes_anchor_y: 600.0,
            totals_anchor_y: 600.0,
            footer_anchor_y: 800.0,
            footer_rule_end_x: 550.0,
            row_height: 24.0,
        }
    }
}

/// Runs every layout block in order.
pub fn layout_invoice<C>(
    canvas: &mut C,
    invoice: &Invoice,
    logo: Option<&Logo>,
    config: &LayoutConfig,
) where
    C: Canvas + ?Sized,
{
    write_header(
        canvas,
        config,
        logo,
        &invoice.from.block_lines(),
        invoice.header_note(),
    );
    write_title(
        canvas,
        &invoice.title,
        &invoice.id,
        invoice.number(),
        &invoice.date,
    );
    write_bill_to(canvas, &invoice.to.block_lines());
    write_header_row(canvas, config, invoice.amount_only);

    for item in &invoice.items {
        write_row(canvas, config, item, &invoice.currency, invoice.amount_only);
    }

    if let Some(note) = invoice.note() {
        write_notes(canvas, config, note);
    }

    write_totals(canvas, config, &invoice.totals(), &invoice.currency);

    if let Some(due) = invoice.due() {
        write_due_date(canvas, config, due);
    }
    write_footer(canvas, config, &invoice.id);
}

/// Writes party lines, skipping empty ones. The line at index 0 uses `name_size`.
fn write_party_lines<C>(
    canvas: &mut C,
    lines: &[String],
    name_size: f64,
    name_advance: f64,
) where
    C: Canvas + ?Sized,
{
    for (index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }

        if index == 0 {
            canvas.set_font(FontSpec::regular(name_size));
            canvas.cell(line);
            canvas.br(name_advance);
        } else {
            canvas.set_font(FontSpec::regular(BODY_FONT_SIZE));
            canvas.cell(line);
            canvas.br(BODY_ADVANCE);
        }
    }
}

/// Logo, sender block and optional header note, closed by a short rule.
pub fn write_header<C>(
    canvas: &mut C,
    config: &LayoutConfig,
    logo: Option<&Logo>,
    sender_lines: &[String],
    header_note: Option<&str>,
) where
    C: Canvas + ?Sized,
{
    if let Some(logo) = logo {
        let (width, height) = logo.scaled_to_width(config.logo_width);
        let at = Point::new(canvas.x(), canvas.y());
        canvas.image(logo, at, width, height);
        canvas.br(height + config.logo_gap);
    }

    canvas.set_text_color(LABEL);
    canvas.set_font(LABEL_FONT);
    canvas.cell("INVOICE FROM");
    canvas.br(LABEL_ADVANCE);

    canvas.set_text_color(BODY);
    write_party_lines(canvas, sender_lines, SENDER_NAME_SIZE, SENDER_NAME_ADVANCE);

    if let Some(note) = header_note {
        canvas.br(HEADER_NOTE_PADDING);
        canvas.set_text_color(MUTED);
        canvas.set_font(FontSpec::regular(HEADER_NOTE_SIZE));
        canvas.cell(note);
        canvas.br(HEADER_NOTE_PADDING);
        canvas.set_text_color(BODY);
    }

    canvas.br(HEADER_RULE_GAP_ABOVE);
    canvas.set_stroke_color(RULE);
    let y = canvas.y();
    canvas.line(Point::new(canvas.x(), y), Point::new(config.header_rule_end_x, y));
    canvas.br(HEADER_RULE_GAP_BELOW);
}

/// Title line followed by the id, optional number and date.
pub fn write_title<C>(canvas: &mut C, title: &str, id: &str, number: Option<&str>, date: &str)
where
    C: Canvas + ?Sized,
{
    canvas.set_font(TITLE_FONT);
    canvas.set_text_color(INK);
    canvas.cell(title);
    canvas.br(TITLE_ADVANCE);

    canvas.set_font(TITLE_META_FONT);
    canvas.set_text_color(MUTED);
    canvas.cell(id);
    canvas.set_text_color(SEPARATOR);
    canvas.cell(TITLE_META_SEPARATOR);
    if let Some(number) = number {
        canvas.set_text_color(MUTED);
        canvas.cell(number);
        canvas.set_text_color(SEPARATOR);
        canvas.cell(TITLE_META_SEPARATOR);
    }
    canvas.set_text_color(MUTED);
    canvas.cell(date);
    canvas.br(TITLE_GAP);
}

/// Recipient block.
pub fn write_bill_to<C>(canvas: &mut C, recipient_lines: &[String])
where
    C: Canvas + ?Sized,
{
    canvas.set_text_color(LABEL);
    canvas.set_font(LABEL_FONT);
    canvas.cell("INVOICE TO");
    canvas.br(LABEL_ADVANCE);

    canvas.set_text_color(LABEL);
    write_party_lines(
        canvas,
        recipient_lines,
        RECIPIENT_NAME_SIZE,
        RECIPIENT_NAME_ADVANCE,
    );
    canvas.br(BILL_TO_GAP);
}

/// Column captions of the item table.
pub fn write_header_row<C>(canvas: &mut C, config: &LayoutConfig, amount_only: bool)
where
    C: Canvas + ?Sized,
{
    canvas.set_font(LABEL_FONT);
    canvas.set_text_color(BODY);
    canvas.cell("ITEM");
    if !amount_only {
        canvas.set_x(config.quantity_column);
        canvas.cell("QTY");
        canvas.set_x(config.rate_column);
        canvas.cell("RATE");
    }
    canvas.set_x(config.amount_column);
    canvas.cell("AMOUNT");
    canvas.br(config.row_height);
}

/// Writes one item row.
pub fn write_row<C>(
    canvas: &mut C,
    config: &LayoutConfig,
    item: &LineItem,
    currency: &str,
    amount_only: bool,
) where
    C: Canvas + ?Sized,
{
    canvas.set_font(ROW_FONT);
    canvas.set_text_color(INK);

    canvas.cell(&item.description);
    if !amount_only {
        canvas.set_x(config.quantity_column);
        canvas.cell(&item.quantity.to_string());
        canvas.set_x(config.rate_column);
        canvas.cell(&format_money(currency, item.rate));
    }
    canvas.set_x(config.amount_column);
    canvas.cell(&format_money(currency, item.amount()));
    canvas.br(config.row_height);
}

/// Notes block in the left column below the table. Blank note lines are kept.
pub fn write_notes<C>(canvas: &mut C, config: &LayoutConfig, note: &str)
where
    C: Canvas + ?Sized,
{
    canvas.set_y(config.notes_anchor_y);

    canvas.set_font(LABEL_FONT);
    canvas.set_text_color(BODY);
    canvas.cell("NOTES");
    canvas.br(LABEL_ADVANCE);

    canvas.set_font(FontSpec::regular(NOTE_FONT_SIZE));
    canvas.set_text_color(INK);
    for line in split_lines(note) {
        canvas.cell(&line);
        canvas.br(BODY_ADVANCE);
    }

    canvas.br(NOTES_GAP);
}

/// Subtotal, tax, positive discount and fees, then the grand total.
pub fn write_totals<C>(canvas: &mut C, config: &LayoutConfig, totals: &Totals, currency: &str)
where
    C: Canvas + ?Sized,
{
    canvas.set_y(config.totals_anchor_y);

    write_total(canvas, config, SUBTOTAL_LABEL, totals.subtotal, currency);
    write_total(canvas, config, TAX_LABEL, totals.tax, currency);
    if totals.discount > 0.0 {
        write_total(canvas, config, DISCOUNT_LABEL, totals.discount, currency);
    }
    if totals.fees > 0.0 {
        write_total(canvas, config, FEES_LABEL, totals.fees, currency);
    }
    write_total(canvas, config, TOTAL_LABEL, totals.total, currency);
}

fn write_total<C>(canvas: &mut C, config: &LayoutConfig, label: &str, value: f64, currency: &str)
where
    C: Canvas + ?Sized,
{
    canvas.set_font(LABEL_FONT);
    canvas.set_text_color(LABEL);
    canvas.set_x(config.rate_column);
    canvas.cell(label);

    canvas.set_text_color(INK);
    canvas.set_font_size(TOTAL_VALUE_SIZE);
    canvas.set_x(config.total_value_column);
    if label == TOTAL_LABEL {
        canvas.set_font(GRAND_TOTAL_FONT);
    }
    canvas.cell(&format_money(currency, value));
    canvas.br(config.row_height);
}

/// Due date row, styled like the totals.
pub fn write_due_date<C>(canvas: &mut C, config: &LayoutConfig, due: &str)
where
    C: Canvas + ?Sized,
{
    canvas.set_font(LABEL_FONT);
    canvas.set_text_color(LABEL);
    canvas.set_x(config.rate_column);
    canvas.cell(DUE_DATE_LABEL);

    canvas.set_text_color(INK);
    canvas.set_font_size(DUE_DATE_VALUE_SIZE);
    canvas.set_x(config.total_value_column);
    canvas.cell(due);
    canvas.br(DUE_DATE_ADVANCE);
}

/// Invoice id and a full-width rule near the bottom of the page.
pub fn write_footer<C>(canvas: &mut C, config: &LayoutConfig, id: &str)
where
    C: Canvas + ?Sized,
{
    canvas.set_y(config.footer_anchor_y);

    canvas.set_font(FOOTER_FONT);
    canvas.set_text_color(BODY);
    canvas.cell(id);

    canvas.set_stroke_color(RULE);
    let rule_y = canvas.y() + FOOTER_RULE_DROP;
    canvas.line(
        Point::new(canvas.x() + FOOTER_RULE_INDENT, rule_y),
        Point::new(config.footer_rule_end_x, rule_y),
    );
    canvas.br(FOOTER_GAP);
}
