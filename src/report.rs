//! Display shapes for the sales table and the revenue chart.
//!
//! Records keep their canonical field names; the human labels below are only
//! applied here, at the rendering boundary.

use crate::stat::datatype::Record;
use crate::stat::ledger::{total_revenue, BucketTotal};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub const CURRENCY: &str = "Rp";

pub const COLUMNS: [&str; 5] = ["Date", "Item", "Unit Price", "Quantity", "Total"];

/// `1234567.891` -> `1,234,567.89`
pub fn format_number(amount: Decimal) -> String {
    let text = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}.{frac}")
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{CURRENCY} {}", format_number(amount))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub date: String,
    pub item_name: String,
    pub unit_price: String,
    pub quantity: String,
    pub total: String,
}

impl ReportRow {
    pub fn cells(&self) -> [String; 5] {
        [
            self.date.clone(),
            self.item_name.clone(),
            self.unit_price.clone(),
            self.quantity.clone(),
            self.total.clone(),
        ]
    }
}

impl From<&Record> for ReportRow {
    fn from(v: &Record) -> Self {
        Self {
            date: v.date().format("%Y-%m-%d").to_string(),
            item_name: v.item_name().to_string(),
            unit_price: format_number(v.unit_price()),
            quantity: v.quantity().to_string(),
            total: format_number(v.total_price()),
        }
    }
}

/// The full ledger as a table, oldest sale first, plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
    pub grand_total: Decimal,
}

impl ReportTable {
    pub fn from_records(records: &[Record]) -> Self {
        let mut sorted: Vec<&Record> = records.iter().collect();
        sorted.sort_by_key(|r| (r.date(), r.created_at()));
        Self {
            rows: sorted.into_iter().map(ReportRow::from).collect(),
            grand_total: total_revenue(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn grand_total_line(&self) -> String {
        format!("Total sales: {}", format_amount(self.grand_total))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

impl ChartKind {
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ChartKind::Line => ChartKind::Bar,
            ChartKind::Bar => ChartKind::Line,
        }
    }
}

/// Bucketed revenue ready for a chart widget: x is the bucket label, y the revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn from_totals(totals: &[BucketTotal], kind: ChartKind) -> Self {
        Self {
            kind,
            labels: totals.iter().map(|t| t.key.label()).collect(),
            values: totals
                .iter()
                .map(|t| t.revenue.to_f64().unwrap_or(0.0))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(index, revenue)` pairs for line charts.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }

    /// Bar heights; bar widgets only take whole numbers.
    pub fn bars(&self) -> Vec<(&str, u64)> {
        self.labels
            .iter()
            .zip(&self.values)
            .map(|(l, v)| (l.as_str(), v.round().max(0.0) as u64))
            .collect()
    }

    pub fn y_max(&self) -> f64 {
        self.values.iter().copied().fold(0.0_f64, f64::max).max(1.0)
    }
}
