//! Ingestion of new sales: validation, then a single append.

use crate::error::{SubmitError, ValidationError};
use crate::stat::datatype::{check_item_name, check_quantity, check_unit_price, NewSale, Record};
use crate::store::LedgerStore;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{info, warn};

/// Raw text typed into the three form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleForm {
    pub item_name: String,
    pub unit_price: String,
    pub quantity: String,
}

impl SaleForm {
    pub fn new(item_name: &str, unit_price: &str, quantity: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            unit_price: unit_price.to_string(),
            quantity: quantity.to_string(),
        }
    }

    /// Validates the inputs in form order (name, price, quantity) and stops at
    /// the first failing rule.
    pub fn parse(&self, date: NaiveDate) -> Result<NewSale, ValidationError> {
        let item_name = check_item_name(&self.item_name)?;
        let unit_price = check_unit_price(parse_unit_price(&self.unit_price)?)?;
        let quantity = check_quantity(parse_quantity(&self.quantity)?)?;
        NewSale::new(&item_name, unit_price, i64::from(quantity), date)
    }

    pub fn clear(&mut self) {
        self.item_name.clear();
        self.unit_price.clear();
        self.quantity.clear();
    }
}

/// Accepts `15000`, `15,000`, `15_000.50` and an optional `Rp` prefix.
pub fn parse_unit_price(text: &str) -> Result<Decimal, ValidationError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("Rp")
        .or_else(|| trimmed.strip_prefix("rp"))
        .unwrap_or(trimmed);
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(ValidationError::InvalidUnitPrice(text.to_string()));
    }
    Decimal::from_str(&cleaned).map_err(|_| ValidationError::InvalidUnitPrice(text.to_string()))
}

pub fn parse_quantity(text: &str) -> Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidQuantity(text.to_string()))
}

/// Validates, stamps today's local date and appends the sale.
pub async fn submit(
    store: &dyn LedgerStore,
    item_name: &str,
    unit_price: Decimal,
    quantity: i64,
) -> Result<Record, SubmitError> {
    submit_on(store, Local::now().date_naive(), item_name, unit_price, quantity).await
}

pub async fn submit_on(
    store: &dyn LedgerStore,
    date: NaiveDate,
    item_name: &str,
    unit_price: Decimal,
    quantity: i64,
) -> Result<Record, SubmitError> {
    let sale = NewSale::new(item_name, unit_price, quantity, date).map_err(|e| {
        warn!(%e, "rejected sale");
        e
    })?;
    submit_sale(store, sale).await
}

/// Parses the raw form and appends the result.
pub async fn submit_form(
    store: &dyn LedgerStore,
    form: &SaleForm,
    date: NaiveDate,
) -> Result<Record, SubmitError> {
    let sale = form.parse(date).map_err(|e| {
        warn!(%e, "rejected sale form");
        e
    })?;
    submit_sale(store, sale).await
}

/// Appends an already validated sale. The store error is handed back untouched; nothing is retried.
pub async fn submit_sale(store: &dyn LedgerStore, sale: NewSale) -> Result<Record, SubmitError> {
    match store.append(sale).await {
        Ok(record) => {
            info!(
                record_id = %record.id(),
                item = record.item_name(),
                quantity = record.quantity(),
                total = %record.total_price(),
                "sale recorded"
            );
            Ok(record)
        }
        Err(e) => {
            warn!(%e, "failed to record sale");
            Err(e.into())
        }
    }
}
