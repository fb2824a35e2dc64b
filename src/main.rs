use anyhow::Result;
use salesbook::form::submit_sale;
use salesbook::report::{format_amount, ReportTable, COLUMNS};
use salesbook::stat::sample_data::sample_sales;
use salesbook::{Bucket, Ledger, MemoryLedgerStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let store = MemoryLedgerStore::new();
    for sale in sample_sales()? {
        submit_sale(&store, sale).await?;
    }

    let ledger = Ledger::fetch(&store).await?;
    let table = ReportTable::from_records(&ledger.records);

    println!("== Sales Report ==\n");
    println!(
        "{:<12} {:<10} {:>14} {:>8} {:>16}",
        COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4]
    );
    for row in &table.rows {
        println!(
            "{:<12} {:<10} {:>14} {:>8} {:>16}",
            row.date, row.item_name, row.unit_price, row.quantity, row.total
        );
    }
    println!("\n== {} ==", table.grand_total_line());

    for bucket in Bucket::ALL {
        println!("\n== {bucket} revenue ==");
        for total in ledger.aggregate(bucket) {
            println!("{:<12} {:>20}", total.key.label(), format_amount(total.revenue));
        }
    }
    Ok(())
}
