use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesbook::form::{submit, submit_form, submit_on, SaleForm};
use salesbook::report::ReportTable;
use salesbook::{
    aggregate, Bucket, Ledger, LedgerStore, MemoryLedgerStore, StoreError, SubmitError,
    ValidationError, MAX_TOTAL_PRICE,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn coffee_scenario() -> Result<()> {
    let store = MemoryLedgerStore::new();
    submit_on(&store, day(2025, 1, 1), "Coffee", Decimal::from(15000), 2).await?;
    submit_on(&store, day(2025, 1, 2), "Coffee", Decimal::from(15000), 3).await?;

    let ledger = Ledger::fetch(&store).await?;
    let daily: Vec<(NaiveDate, Decimal)> = aggregate(&ledger.records, Bucket::Daily)
        .into_iter()
        .map(|t| (t.key.start, t.revenue))
        .collect();
    assert_eq!(
        daily,
        vec![
            (day(2025, 1, 1), Decimal::from(30000)),
            (day(2025, 1, 2), Decimal::from(45000)),
        ]
    );
    assert_eq!(ReportTable::from_records(&ledger.records).grand_total, Decimal::from(75000));
    Ok(())
}

#[tokio::test]
async fn valid_submissions_keep_the_total_law() -> Result<()> {
    let store = MemoryLedgerStore::new();
    for (name, price, qty) in [("Desk", 1_250_000, 1), ("Pen", 3_500, 12), ("Tea", 1, 99)] {
        let record = submit(&store, name, Decimal::from(price), qty).await?;
        assert_eq!(record.total_price(), record.unit_price() * Decimal::from(record.quantity()));
        assert_eq!(record.date(), chrono::Local::now().date_naive());
    }
    assert_eq!(store.list_all().await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn invalid_submissions_leave_store_unchanged() -> Result<()> {
    let store = MemoryLedgerStore::new();
    let cases = [("", 1000, 1), ("   ", 1000, 1), ("Desk", 0, 1), ("Desk", -10, 1), ("Desk", 1000, 0)];
    for (name, price, qty) in cases {
        let res = submit(&store, name, Decimal::from(price), qty).await;
        assert!(matches!(res, Err(SubmitError::Validation(_))), "{name:?} {price} {qty}");
    }
    let res = submit_form(&store, &SaleForm::new("Desk", "abc", "1"), day(2025, 1, 1)).await;
    assert!(matches!(res, Err(SubmitError::Validation(_))));
    assert!(store.list_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn oversized_sale_is_rejected_and_reports_still_render() -> Result<()> {
    let store = MemoryLedgerStore::new();
    let date = day(2025, 1, 1);

    let form = SaleForm::new("Gold", "79228162514264337593543950335", "2");
    let res = submit_form(&store, &form, date).await;
    assert!(matches!(
        res,
        Err(SubmitError::Validation(ValidationError::TotalOutOfRange { .. }))
    ));
    assert!(store.list_all().await?.is_empty());

    // sales at the ceiling are accepted and still sum exactly
    for _ in 0..3 {
        submit_on(&store, date, "Gold", MAX_TOTAL_PRICE, 1).await?;
    }
    let ledger = Ledger::fetch(&store).await?;
    let expected = MAX_TOTAL_PRICE * Decimal::from(3);
    assert_eq!(ReportTable::from_records(&ledger.records).grand_total, expected);
    assert_eq!(ledger.aggregate(Bucket::Monthly)[0].revenue, expected);
    Ok(())
}

#[tokio::test]
async fn list_all_is_idempotent() -> Result<()> {
    let store = MemoryLedgerStore::new();
    for qty in 1..=5 {
        submit_on(&store, day(2025, 1, qty as u32), "Tea", Decimal::from(2500), qty).await?;
    }
    let mut first: Vec<_> = store.list_all().await?.into_iter().map(|r| r.id()).collect();
    let mut second: Vec<_> = store.list_all().await?.into_iter().map(|r| r.id()).collect();
    first.sort();
    second.sort();
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn unreachable_store_on_append() -> Result<()> {
    let store = MemoryLedgerStore::new();
    submit_on(&store, day(2025, 1, 1), "Coffee", Decimal::from(15000), 1).await?;

    store.set_available(false);
    let res = submit_on(&store, day(2025, 1, 2), "Coffee", Decimal::from(15000), 1).await;
    assert!(matches!(res, Err(SubmitError::Store(StoreError::Unavailable(_)))));

    store.set_available(true);
    let records = store.list_all().await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date(), day(2025, 1, 1));
    Ok(())
}
