use super::datatype::*;
use crate::error::StoreError;
use crate::store::LedgerStore;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Revenue collected inside one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTotal {
    pub key: BucketKey,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketTotalDto {
    pub bucket: Bucket,
    pub label: String,
    pub start: NaiveDate,
    pub revenue: Decimal,
}

impl From<&BucketTotal> for BucketTotalDto {
    fn from(v: &BucketTotal) -> Self {
        Self {
            bucket: v.key.bucket,
            label: v.key.label(),
            start: v.key.start,
            revenue: v.revenue,
        }
    }
}

/// Groups `records` by `bucket` and sums their totals.
///
/// Output is sorted by bucket start regardless of input order. Buckets without
/// records are not emitted.
pub fn aggregate(records: &[Record], bucket: Bucket) -> Vec<BucketTotal> {
    aggregate_between(records, bucket, None, None)
}

/// Like [`aggregate`], restricted to records dated within `from..=to`.
/// A missing bound leaves that side open.
///
/// Plain `Decimal` addition is safe here: every record total is capped at
/// [`MAX_TOTAL_PRICE`] by [`NewSale::new`].
pub fn aggregate_between(
    records: &[Record],
    bucket: Bucket,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<BucketTotal> {
    let mut sums: BTreeMap<BucketKey, Decimal> = BTreeMap::new();
    for i in records {
        let date = i.date();
        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }
        *sums.entry(bucket.key_of(date)).or_insert(Decimal::ZERO) += i.total_price();
    }
    sums.into_iter()
        .map(|(key, revenue)| BucketTotal { key, revenue })
        .collect()
}

pub fn total_revenue(records: &[Record]) -> Decimal {
    records.iter().map(Record::total_price).sum()
}

/// Read-only copy of the store's contents for one render cycle.
///
/// Fetched fresh with [`Ledger::fetch`] and replaced wholesale on the next refresh.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub records: Vec<Record>,
    pub fetched_at: DateTime<Utc>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl Ledger {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
        }
    }

    pub async fn fetch(store: &dyn LedgerStore) -> Result<Self, StoreError> {
        let records = store.list_all().await?;
        Ok(Self::from_records(records))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn grand_total(&self) -> Decimal {
        total_revenue(&self.records)
    }

    pub fn aggregate(&self, bucket: Bucket) -> Vec<BucketTotal> {
        aggregate(&self.records, bucket)
    }

    /// Earliest and latest sale dates in the snapshot.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(Record::date).min()?;
        let max = self.records.iter().map(Record::date).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(name: &str, price: i64, qty: i64, date: NaiveDate) -> Record {
        NewSale::new(name, Decimal::from(price), qty, date)
            .unwrap()
            .into_record(Uuid::new_v4(), Utc::now())
    }

    fn coffee() -> Vec<Record> {
        vec![
            record("Coffee", 15000, 3, day(2025, 1, 2)),
            record("Coffee", 15000, 2, day(2025, 1, 1)),
        ]
    }

    #[test]
    fn daily_scenario() {
        let totals = aggregate(&coffee(), Bucket::Daily);
        let got: Vec<(String, Decimal)> = totals
            .iter()
            .map(|t| (t.key.label(), t.revenue))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2025-01-01".to_string(), Decimal::from(30000)),
                ("2025-01-02".to_string(), Decimal::from(45000)),
            ]
        );
        assert_eq!(
            Ledger::from_records(coffee()).grand_total(),
            Decimal::from(75000)
        );
    }

    #[test]
    fn weekly_and_monthly_merge_buckets() {
        let records = vec![
            record("Desk", 500, 1, day(2025, 2, 3)),  // Monday, W06
            record("Chair", 200, 2, day(2025, 2, 9)), // Sunday, W06
            record("Lamp", 50, 1, day(2025, 2, 10)),  // Monday, W07
            record("Pen", 5, 10, day(2025, 1, 31)),   // Friday, W05
        ];

        let weekly = aggregate(&records, Bucket::Weekly);
        let labels: Vec<String> = weekly.iter().map(|t| t.key.label()).collect();
        assert_eq!(labels, vec!["2025-W05", "2025-W06", "2025-W07"]);
        assert_eq!(weekly[1].revenue, Decimal::from(900));

        let monthly = aggregate(&records, Bucket::Monthly);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].key.label(), "2025-01");
        assert_eq!(monthly[0].revenue, Decimal::from(50));
        assert_eq!(monthly[1].revenue, Decimal::from(950));
    }

    #[test]
    fn output_is_chronological_for_any_input_order() {
        let mut records = vec![
            record("A", 1, 1, day(2025, 3, 1)),
            record("B", 2, 1, day(2024, 12, 31)),
            record("C", 3, 1, day(2025, 1, 15)),
            record("D", 4, 1, day(2025, 3, 1)),
            record("E", 5, 1, day(2024, 6, 2)),
        ];
        for _ in 0..records.len() {
            records.rotate_left(1);
            for bucket in Bucket::ALL {
                let totals = aggregate(&records, bucket);
                assert!(totals.windows(2).all(|w| w[0].key.start < w[1].key.start));
            }
        }
    }

    #[test]
    fn totals_add_up_to_records_in_range() {
        let records = vec![
            record("A", 10, 1, day(2025, 1, 1)),
            record("B", 20, 2, day(2025, 1, 8)),
            record("C", 30, 3, day(2025, 2, 1)),
            record("D", 40, 4, day(2025, 3, 1)),
        ];
        let from = day(2025, 1, 5);
        let to = day(2025, 2, 1);
        let expected: Decimal = records
            .iter()
            .filter(|r| r.date() >= from && r.date() <= to)
            .map(Record::total_price)
            .sum();
        for bucket in Bucket::ALL {
            let sum: Decimal = aggregate_between(&records, bucket, Some(from), Some(to))
                .iter()
                .map(|t| t.revenue)
                .sum();
            assert_eq!(sum, expected);

            let all: Decimal = aggregate(&records, bucket).iter().map(|t| t.revenue).sum();
            assert_eq!(all, total_revenue(&records));
        }
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(aggregate(&[], Bucket::Monthly).is_empty());
        let ledger = Ledger::default();
        assert_eq!(ledger.grand_total(), Decimal::ZERO);
        assert_eq!(ledger.date_range(), None);
    }

    #[test]
    fn decimal_sums_are_exact() {
        let records = vec![
            NewSale::new("Gum", Decimal::new(10, 2), 3, day(2025, 1, 1))
                .unwrap()
                .into_record(Uuid::new_v4(), Utc::now()),
            NewSale::new("Gum", Decimal::new(20, 2), 1, day(2025, 1, 1))
                .unwrap()
                .into_record(Uuid::new_v4(), Utc::now()),
        ];
        let totals = aggregate(&records, Bucket::Daily);
        assert_eq!(totals[0].revenue, Decimal::new(50, 2));
    }
}
