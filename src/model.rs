//! Data structures describing the invoice record handed to the renderer.
//!
//! The types are plain serde records so callers can build them in code or load
//! them from JSON via [`Invoice::from_json_str`] and [`Invoice::from_path`].  The
//! input format accepts both explicit line-item objects and the positional
//! `items` / `quantities` / `rates` lists; the latter are folded into
//! [`LineItem`] values on load so the renderer never indexes parallel lists.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;

/// Title used when an input document does not provide one.
pub const DEFAULT_TITLE: &str = "INVOICE";

const DEFAULT_QUANTITY: i64 = 1;
const DEFAULT_RATE: f64 = 0.0;

/// A sender or recipient of an invoice.
///
/// All fields are opaque display strings and are not validated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    /// Suppresses the address lines of the block while keeping its label.
    pub hide: bool,
    pub name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub country: String,
    pub state: String,
    pub postal_code: String,
    pub tax_id: String,
    pub email: String,
    pub website: String,
}

impl Party {
    /// Creates a party with only a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Composes the multi-line block text printed for the party.
    ///
    /// The single space line is a visible spacer between the postal address and
    /// the contact details.
    pub fn block_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}, {} {}\n{}\n{}\n \n{}\n{}",
            self.name,
            self.address_line_1,
            self.address_line_2,
            self.city,
            self.state,
            self.postal_code,
            self.country,
            self.tax_id,
            self.email,
            self.website
        )
    }

    /// Returns the block lines, empty entries included, so line indexes stay stable.
    pub fn block_lines(&self) -> Vec<String> {
        if self.hide {
            return Vec::new();
        }
        split_lines(&self.block_text())
    }
}

/// Splits `text` on real line breaks and on literal `\n` markers.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .split('\n')
        .map(str::to_owned)
        .collect()
}

/// One billable row of the invoice table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default = "default_rate")]
    pub rate: f64,
}

fn default_quantity() -> i64 {
    DEFAULT_QUANTITY
}

fn default_rate() -> f64 {
    DEFAULT_RATE
}

impl LineItem {
    /// Creates a line item.
    pub fn new(description: impl Into<String>, quantity: i64, rate: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
        }
    }

    /// Amount billed for the row.
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.rate
    }

    /// Builds explicit line items from positional description, quantity and rate lists.
    ///
    /// `items` decides the row count.  Rows without a matching quantity bill one
    /// unit and rows without a matching rate bill zero.
    pub fn from_parallel<S>(items: &[S], quantities: &[i64], rates: &[f64]) -> Vec<Self>
    where
        S: AsRef<str>,
    {
        items
            .iter()
            .enumerate()
            .map(|(index, description)| {
                Self::new(
                    description.as_ref(),
                    quantities.get(index).copied().unwrap_or(DEFAULT_QUANTITY),
                    rates.get(index).copied().unwrap_or(DEFAULT_RATE),
                )
            })
            .collect()
    }
}

/// Monetary summary of an invoice.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub fees: f64,
    pub total: f64,
}

impl Totals {
    /// Computes the totals for a set of line items and adjustments.
    pub fn compute(items: &[LineItem], tax: f64, discount: f64, fees: f64) -> Self {
        let subtotal = items.iter().map(LineItem::amount).sum::<f64>();
        Self {
            subtotal,
            tax,
            discount,
            fees,
            total: subtotal + tax - discount - fees,
        }
    }
}

/// The invoice record consumed by the layout engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "InvoiceDocument")]
pub struct Invoice {
    pub id: String,
    pub number: Option<String>,
    pub title: String,
    /// Logo reference: an `http(s)://` URL or a file path.
    pub logo: Option<String>,
    pub from: Party,
    pub to: Party,
    /// Issue date, already formatted for display.
    pub date: String,
    pub due: Option<String>,
    pub items: Vec<LineItem>,
    /// Hides the quantity and rate columns.
    pub amount_only: bool,
    pub tax: f64,
    pub discount: f64,
    /// Additional fees deducted from the total, printed only when positive.
    pub fees: f64,
    pub currency: String,
    pub note: Option<String>,
    pub header_note: Option<String>,
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            id: String::new(),
            number: None,
            title: DEFAULT_TITLE.to_owned(),
            logo: None,
            from: Party::default(),
            to: Party::default(),
            date: String::new(),
            due: None,
            items: Vec::new(),
            amount_only: false,
            tax: 0.0,
            discount: 0.0,
            fees: 0.0,
            currency: String::new(),
            note: None,
            header_note: None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

impl Invoice {
    /// Parses an invoice from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, InvoiceError> {
        serde_json::from_str(json).map_err(InvoiceError::InputParse)
    }

    /// Reads and parses the JSON invoice stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InvoiceError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| InvoiceError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the invoice as pretty-printed JSON in the line-item object form.
    pub fn to_json_pretty(&self) -> Result<String, InvoiceError> {
        serde_json::to_string_pretty(self).map_err(InvoiceError::OutputSerialize)
    }

    pub fn number(&self) -> Option<&str> {
        non_empty(&self.number)
    }

    pub fn logo(&self) -> Option<&str> {
        non_empty(&self.logo)
    }

    pub fn due(&self) -> Option<&str> {
        non_empty(&self.due)
    }

    pub fn note(&self) -> Option<&str> {
        non_empty(&self.note)
    }

    pub fn header_note(&self) -> Option<&str> {
        non_empty(&self.header_note)
    }

    /// Computes the subtotal and total of the invoice.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.items, self.tax, self.discount, self.fees)
    }
}

/// Wire representation accepted when deserializing an [`Invoice`].
#[derive(Deserialize)]
#[serde(default)]
struct InvoiceDocument {
    id: String,
    number: Option<String>,
    title: String,
    logo: Option<String>,
    from: Party,
    to: Party,
    date: String,
    due: Option<String>,
    items: Vec<ItemEntry>,
    quantities: Vec<i64>,
    rates: Vec<f64>,
    amount_only: bool,
    tax: f64,
    discount: f64,
    fees: f64,
    currency: String,
    note: Option<String>,
    header_note: Option<String>,
}

impl Default for InvoiceDocument {
    fn default() -> Self {
        Self {
            id: String::new(),
            number: None,
            title: DEFAULT_TITLE.to_owned(),
            logo: None,
            from: Party::default(),
            to: Party::default(),
            date: String::new(),
            due: None,
            items: Vec::new(),
            quantities: Vec::new(),
            rates: Vec::new(),
            amount_only: false,
            tax: 0.0,
            discount: 0.0,
            fees: 0.0,
            currency: String::new(),
            note: None,
            header_note: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemEntry {
    Description(String),
    Item(LineItem),
}

impl From<InvoiceDocument> for Invoice {
    fn from(document: InvoiceDocument) -> Self {
        let items = document
            .items
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                ItemEntry::Item(item) => item,
                ItemEntry::Description(description) => LineItem::new(
                    description,
                    document
                        .quantities
                        .get(index)
                        .copied()
                        .unwrap_or(DEFAULT_QUANTITY),
                    document.rates.get(index).copied().unwrap_or(DEFAULT_RATE),
                ),
            })
            .collect();

        Self {
            id: document.id,
            number: document.number,
            title: document.title,
            logo: document.logo,
            from: document.from,
            to: document.to,
            date: document.date,
            due: document.due,
            items,
            amount_only: document.amount_only,
            tax: document.tax,
            discount: document.discount,
            fees: document.fees,
            currency: document.currency,
            note: document.note,
            header_note: document.header_note,
        }
    }
}

/// Builds the demonstration invoice, dated with the current local time.
pub fn example_invoice() -> Invoice {
    let date = chrono::Local::now().format("%b %d, %Y %Z").to_string();

    Invoice {
        id: "pn-payout-4we8a9ew6".to_owned(),
        number: Some("1r56war4ea-1".to_owned()),
        title: DEFAULT_TITLE.to_owned(),
        logo: Some("https://cdn.paynow.gg/logo/full/logotype-color.png".to_owned()),
        from: Party {
            name: "Fake Company".to_owned(),
            address_line_1: "Somewhere over the rainbow".to_owned(),
            city: "Hoboken".to_owned(),
            country: "United States".to_owned(),
            state: "NJ".to_owned(),
            postal_code: "12312".to_owned(),
            ..Party::default()
        },
        to: Party {
            name: "PayNow Services, Inc.".to_owned(),
            address_line_1: "123 Fake Street".to_owned(),
            city: "New York".to_owned(),
            country: "United States".to_owned(),
            state: "NY".to_owned(),
            postal_code: "10001".to_owned(),
            email: "support@paynow.gg".to_owned(),
            website: "www.paynow.gg".to_owned(),
            ..Party::default()
        },
        date,
        due: None,
        items: vec![LineItem::new(
            "Digital Services licensed to PayNow for resale",
            1,
            2500.0,
        )],
        amount_only: true,
        tax: 0.0,
        discount: 0.0,
        fees: 0.0,
        currency: "USD".to_owned(),
        note: Some("NO VAT - REVERSE CHARGE IF APPLICABLE".to_owned()),
        header_note: Some(
            "* You can change your billing details in payout provider settings".to_owned(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_lists_default_missing_entries() {
        let items = LineItem::from_parallel(&["Design", "Build", "Support"], &[2], &[100.0, 50.0]);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0], LineItem::new("Design", 2, 100.0));
        assert_eq!(items[1], LineItem::new("Build", 1, 50.0));
        assert_eq!(items[2], LineItem::new("Support", 1, 0.0));
    }

    #[test]
    fn parallel_lists_ignore_surplus_quantities_and_rates() {
        let items = LineItem::from_parallel(&["Only"], &[3, 4, 5], &[10.0, 20.0]);
        assert_eq!(items, vec![LineItem::new("Only", 3, 10.0)]);
    }

    #[test]
    fn totals_apply_tax_discount_and_fees() {
        let items = vec![LineItem::new("A", 2, 10.0), LineItem::new("B", 1, 5.5)];
        let totals = Totals::compute(&items, 3.0, 1.5, 2.0);

        assert_eq!(totals.subtotal, 25.5);
        assert_eq!(totals.total, 25.0);
    }

    #[test]
    fn legacy_json_binds_lists_positionally() {
        let invoice = Invoice::from_json_str(
            r#"{
                "id": "inv-1",
                "items": ["Consulting", "Travel"],
                "quantities": [3],
                "rates": [120.0, 80.0],
                "currency": "EUR"
            }"#,
        )
        .expect("parse succeeds");

        assert_eq!(
            invoice.items,
            LineItem::from_parallel(&["Consulting", "Travel"], &[3], &[120.0, 80.0])
        );
        assert_eq!(invoice.title, DEFAULT_TITLE);
        assert_eq!(invoice.currency, "EUR");
    }

    #[test]
    fn object_items_use_field_defaults() {
        let invoice = Invoice::from_json_str(
            r#"{"items": [{"description": "Hosting", "rate": 9.5}, {"description": "Setup"}]}"#,
        )
        .expect("parse succeeds");

        assert_eq!(invoice.items[0], LineItem::new("Hosting", 1, 9.5));
        assert_eq!(invoice.items[1], LineItem::new("Setup", 1, 0.0));
    }

    #[test]
    fn serialized_invoice_parses_back() {
        let mut invoice = example_invoice();
        invoice.date = "Jan 02, 2006 UTC".to_owned();
        let json = invoice.to_json_pretty().expect("serialize succeeds");
        let parsed = Invoice::from_json_str(&json).expect("parse succeeds");
        assert_eq!(parsed, invoice);
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        let err = Invoice::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.stage(), "input");
    }

    #[test]
    fn empty_optional_strings_count_as_missing() {
        let invoice = Invoice {
            due: Some(String::new()),
            note: Some(String::new()),
            number: None,
            ..Invoice::default()
        };

        assert_eq!(invoice.due(), None);
        assert_eq!(invoice.note(), None);
        assert_eq!(invoice.number(), None);
    }

    #[test]
    fn party_block_keeps_line_positions() {
        let party = Party {
            name: "Acme Inc".to_owned(),
            address_line_1: "123 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            postal_code: "62701".to_owned(),
            ..Party::default()
        };
        let lines = party.block_lines();

        assert_eq!(lines[0], "Acme Inc");
        assert_eq!(lines[1], "123 Main St");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Springfield, IL 62701");
        assert_eq!(lines[6], " ");
    }

    #[test]
    fn literal_newline_markers_split_lines() {
        assert_eq!(split_lines("one\\ntwo\nthree"), vec!["one", "two", "three"]);
    }

    #[test]
    fn hidden_party_has_no_block_lines() {
        let party = Party {
            hide: true,
            ..Party::new("Secret Co")
        };
        assert!(party.block_lines().is_empty());
    }
}
