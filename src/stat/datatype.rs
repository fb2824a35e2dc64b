use crate::error::ValidationError;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

pub type RecordId = Uuid;

pub(crate) fn check_item_name(item_name: &str) -> Result<String, ValidationError> {
    let trimmed = item_name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyItemName);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn check_unit_price(unit_price: Decimal) -> Result<Decimal, ValidationError> {
    if unit_price <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveUnitPrice(unit_price));
    }
    Ok(unit_price)
}

/// Largest quantity a single sale may carry. Matches the database's `INTEGER` column.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// Largest `unit_price * quantity` accepted for one sale.
///
/// Keeps every per-bucket and grand-total sum far inside `Decimal`'s range:
/// overflowing it would take more than 10^13 sales at this ceiling.
pub const MAX_TOTAL_PRICE: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

pub(crate) fn check_quantity(quantity: i64) -> Result<u32, ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::NonPositiveQuantity(quantity));
    }
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q <= MAX_QUANTITY)
        .ok_or(ValidationError::QuantityOutOfRange(quantity))
}

pub(crate) fn check_total(unit_price: Decimal, quantity: u32) -> Result<Decimal, ValidationError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .filter(|total| *total <= MAX_TOTAL_PRICE)
        .ok_or(ValidationError::TotalOutOfRange {
            unit_price,
            quantity,
        })
}

/// A validated sale that has not been stored yet.
///
/// Fields are private so the only way to obtain one is through [`NewSale::new`],
/// which enforces the record invariants:
/// - trimmed `item_name` is non-empty
/// - `unit_price > 0`
/// - `1 <= quantity <= MAX_QUANTITY`
/// - `unit_price * quantity <= MAX_TOTAL_PRICE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    item_name: String,
    unit_price: Decimal,
    quantity: u32,
    total_price: Decimal,
    date: NaiveDate,
}

impl NewSale {
    /// Rules are checked in order (name, price, quantity, total); the first failure is returned.
    pub fn new(
        item_name: &str,
        unit_price: Decimal,
        quantity: i64,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let item_name = check_item_name(item_name)?;
        let unit_price = check_unit_price(unit_price)?;
        let quantity = check_quantity(quantity)?;
        let total_price = check_total(unit_price, quantity)?;
        Ok(Self {
            item_name,
            unit_price,
            quantity,
            total_price,
            date,
        })
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> Record {
        Record {
            id,
            sale: self,
            created_at,
        }
    }
}

/// Request body for creating a sale.
///
/// Carries no date: the receiving side stamps the sale with its own "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDoc {
    pub item_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
}

impl SaleDoc {
    pub fn into_sale(self, today: NaiveDate) -> Result<NewSale, ValidationError> {
        NewSale::new(&self.item_name, self.unit_price, self.quantity, today)
    }
}

impl From<&NewSale> for SaleDoc {
    fn from(v: &NewSale) -> Self {
        Self {
            item_name: v.item_name.clone(),
            unit_price: v.unit_price,
            quantity: i64::from(v.quantity),
        }
    }
}

/// One persisted sale. Never mutated once the store hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordDoc", into = "RecordDoc")]
pub struct Record {
    id: RecordId,
    sale: NewSale,
    created_at: DateTime<Utc>,
}

impl Record {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn item_name(&self) -> &str {
        self.sale.item_name()
    }

    pub fn unit_price(&self) -> Decimal {
        self.sale.unit_price()
    }

    pub fn quantity(&self) -> u32 {
        self.sale.quantity()
    }

    pub fn total_price(&self) -> Decimal {
        self.sale.total_price()
    }

    pub fn date(&self) -> NaiveDate {
        self.sale.date()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn sale(&self) -> &NewSale {
        &self.sale
    }
}

/// Document shape of a stored record, as written to the wire and the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDoc {
    pub id: RecordId,
    pub item_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub total_price: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RecordDoc> for Record {
    type Error = ValidationError;

    fn try_from(v: RecordDoc) -> Result<Self, Self::Error> {
        let sale = NewSale::new(&v.item_name, v.unit_price, v.quantity, v.date)?;
        // the stored total is informational only
        if v.total_price != sale.total_price() {
            warn!(
                record_id = %v.id,
                stored = %v.total_price,
                computed = %sale.total_price(),
                "stored total_price disagrees with unit_price * quantity; using computed value"
            );
        }
        Ok(sale.into_record(v.id, v.created_at))
    }
}

impl From<Record> for RecordDoc {
    fn from(v: Record) -> Self {
        let total_price = v.total_price();
        Self {
            id: v.id,
            item_name: v.sale.item_name,
            unit_price: v.sale.unit_price,
            quantity: i64::from(v.sale.quantity),
            total_price,
            date: v.sale.date,
            created_at: v.created_at,
        }
    }
}

/// Time interval used to group records for revenue reports.
///
/// Weeks follow ISO-8601: they start on Monday and are labelled by ISO week-year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Daily, Bucket::Weekly, Bucket::Monthly];

    /// First day of the bucket containing `date`.
    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Daily => date,
            Bucket::Weekly => {
                date - Days::new(u64::from(date.weekday().num_days_from_monday()))
            }
            Bucket::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    pub fn key_of(self, date: NaiveDate) -> BucketKey {
        BucketKey {
            start: self.start_of(date),
            bucket: self,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Daily => "Daily",
            Bucket::Weekly => "Weekly",
            Bucket::Monthly => "Monthly",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Bucket::Daily => Bucket::Weekly,
            Bucket::Weekly => Bucket::Monthly,
            Bucket::Monthly => Bucket::Daily,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Bucket::Daily),
            "weekly" | "week" | "w" => Ok(Bucket::Weekly),
            "monthly" | "month" | "m" => Ok(Bucket::Monthly),
            other => Err(format!("unknown bucket {other:?} (expected daily, weekly or monthly)")),
        }
    }
}

/// Identifies one bucket. Ordering is chronological by start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub start: NaiveDate,
    pub bucket: Bucket,
}

impl BucketKey {
    pub fn label(&self) -> String {
        match self.bucket {
            Bucket::Daily => self.start.format("%Y-%m-%d").to_string(),
            Bucket::Weekly => {
                let week = self.start.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Bucket::Monthly => self.start.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn new_sale_trims_name_and_computes_total() {
        let sale = NewSale::new("  Coffee ", dec(15000), 3, day(2025, 1, 2)).unwrap();
        assert_eq!(sale.item_name(), "Coffee");
        assert_eq!(sale.total_price(), dec(45000));
    }

    #[test]
    fn validation_reports_first_failing_rule() {
        let date = day(2025, 1, 1);
        assert_eq!(
            NewSale::new("   ", dec(0), 0, date),
            Err(ValidationError::EmptyItemName)
        );
        assert_eq!(
            NewSale::new("Desk", dec(0), 0, date),
            Err(ValidationError::NonPositiveUnitPrice(dec(0)))
        );
        assert_eq!(
            NewSale::new("Desk", dec(-5), 1, date),
            Err(ValidationError::NonPositiveUnitPrice(dec(-5)))
        );
        assert_eq!(
            NewSale::new("Desk", dec(1000), 0, date),
            Err(ValidationError::NonPositiveQuantity(0))
        );
        assert_eq!(
            NewSale::new("Desk", dec(1000), i64::from(u32::MAX) + 1, date),
            Err(ValidationError::QuantityOutOfRange(i64::from(u32::MAX) + 1))
        );
        assert_eq!(
            NewSale::new("Desk", dec(1), i64::from(i32::MAX) + 1, date),
            Err(ValidationError::QuantityOutOfRange(i64::from(i32::MAX) + 1))
        );
    }

    #[test]
    fn oversized_totals_are_rejected() {
        let date = day(2025, 1, 1);
        assert_eq!(MAX_TOTAL_PRICE, dec(1_000_000_000_000_000));

        // would overflow Decimal outright
        assert!(matches!(
            NewSale::new("Gold", Decimal::MAX, 2, date),
            Err(ValidationError::TotalOutOfRange { quantity: 2, .. })
        ));
        assert!(matches!(
            NewSale::new("Gold", dec(1_000_000_000_000), 1001, date),
            Err(ValidationError::TotalOutOfRange { .. })
        ));

        let at_limit = NewSale::new("Gold", dec(1_000_000_000_000), 1000, date).unwrap();
        assert_eq!(at_limit.total_price(), MAX_TOTAL_PRICE);
        assert!(NewSale::new("Bolt", dec(1), i64::from(MAX_QUANTITY), date).is_ok());
    }

    #[test]
    fn record_json_rejects_oversized_totals() {
        let json = r#"{
            "id": "6f1c1e3e-0b7a-4c1e-9d8e-2a4f3b2c1d00",
            "item_name": "Gold",
            "unit_price": "79228162514264337593543950335",
            "quantity": 2,
            "total_price": "0",
            "date": "2025-01-01",
            "created_at": "2025-01-01T08:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn record_json_recomputes_total_price() {
        let json = r#"{
            "id": "6f1c1e3e-0b7a-4c1e-9d8e-2a4f3b2c1d00",
            "item_name": "Coffee",
            "unit_price": "15000",
            "quantity": 2,
            "total_price": "1",
            "date": "2025-01-01",
            "created_at": "2025-01-01T08:00:00Z"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_price(), dec(30000));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["total_price"], "30000");
    }

    #[test]
    fn record_json_rejects_invalid_documents() {
        let json = r#"{
            "id": "6f1c1e3e-0b7a-4c1e-9d8e-2a4f3b2c1d00",
            "item_name": "",
            "unit_price": "15000",
            "quantity": 2,
            "total_price": "30000",
            "date": "2025-01-01",
            "created_at": "2025-01-01T08:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn sale_doc_is_stamped_by_the_receiver() {
        // a caller-supplied date is not part of the document and is ignored
        let doc: SaleDoc = serde_json::from_str(
            r#"{"item_name":"Tea","unit_price":"2500","quantity":4,"date":"1999-12-31"}"#,
        )
        .unwrap();
        let sale = doc.into_sale(day(2025, 3, 9)).unwrap();
        assert_eq!(sale.date(), day(2025, 3, 9));
        assert_eq!(sale.total_price(), dec(10000));

        let sent = serde_json::to_value(SaleDoc::from(&sale)).unwrap();
        assert!(sent.get("date").is_none());
    }

    #[test]
    fn weekly_buckets_start_on_monday() {
        // 2025-01-01 is a Wednesday
        assert_eq!(Bucket::Weekly.start_of(day(2025, 1, 1)), day(2024, 12, 30));
        assert_eq!(Bucket::Weekly.start_of(day(2025, 1, 5)), day(2024, 12, 30));
        assert_eq!(Bucket::Weekly.start_of(day(2025, 1, 6)), day(2025, 1, 6));
        assert_eq!(Bucket::Weekly.key_of(day(2025, 1, 1)).label(), "2025-W01");
    }

    #[test]
    fn bucket_labels() {
        assert_eq!(Bucket::Daily.key_of(day(2025, 2, 7)).label(), "2025-02-07");
        assert_eq!(Bucket::Monthly.key_of(day(2025, 2, 7)).label(), "2025-02");
        assert_eq!(Bucket::Monthly.start_of(day(2025, 2, 7)), day(2025, 2, 1));
        assert_eq!("Weekly".parse::<Bucket>(), Ok(Bucket::Weekly));
        assert!("yearly".parse::<Bucket>().is_err());
    }
}
