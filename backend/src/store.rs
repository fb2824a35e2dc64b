use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use salesbook::config::StoreConfig;
use salesbook::{LedgerStore, NewSale, Record, RecordDoc, StoreError};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Ledger store backed by one Postgres table.
pub struct PgLedgerStore {
    pool: PgPool,
    table: String,
}

fn store_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Unavailable(e.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StoreError::Corrupt(e.to_string()),
        _ => StoreError::Rejected(e.to_string()),
    }
}

const COLUMNS: &str = "id, item_name, unit_price, quantity, total_price, date, created_at";

impl PgLedgerStore {
    /// `table` must already be a validated identifier (see [`StoreConfig`]).
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(store_error)?;
        info!(table = %config.collection, "connected to ledger database");
        Ok(Self::new(pool, config.collection.clone()))
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id          UUID PRIMARY KEY,
                item_name   TEXT NOT NULL CHECK (btrim(item_name) <> ''),
                unit_price  NUMERIC NOT NULL CHECK (unit_price > 0),
                quantity    INTEGER NOT NULL CHECK (quantity >= 1),
                total_price NUMERIC NOT NULL,
                date        DATE NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            self.table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    item_name: String,
    unit_price: Decimal,
    quantity: i32,
    total_price: Decimal,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_record(self) -> Result<Record, StoreError> {
        let id = self.id;
        Record::try_from(RecordDoc {
            id: self.id,
            item_name: self.item_name,
            unit_price: self.unit_price,
            quantity: i64::from(self.quantity),
            total_price: self.total_price,
            date: self.date,
            created_at: self.created_at,
        })
        .map_err(|e| StoreError::Corrupt(format!("row {id}: {e}")))
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn append(&self, sale: NewSale) -> Result<Record, StoreError> {
        let quantity = i32::try_from(sale.quantity()).map_err(|_| {
            StoreError::Rejected(format!("quantity {} is out of range", sale.quantity()))
        })?;
        let sql = format!(
            r#"
            INSERT INTO {} (id, item_name, unit_price, quantity, total_price, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#,
            self.table
        );
        let row: SaleRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(sale.item_name())
            .bind(sale.unit_price())
            .bind(quantity)
            .bind(sale.total_price())
            .bind(sale.date())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        debug!(record_id = %row.id, "inserted sale");
        row.into_record()
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {}", self.table);
        let rows: Vec<SaleRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        rows.into_iter().map(SaleRow::into_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item_name: &str, quantity: i32) -> SaleRow {
        SaleRow {
            id: Uuid::new_v4(),
            item_name: item_name.to_string(),
            unit_price: Decimal::from(15000),
            quantity,
            total_price: Decimal::from(15000) * Decimal::from(quantity),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn connection_failures_are_unavailable() {
        for e in [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
        ] {
            assert!(matches!(store_error(e), StoreError::Unavailable(_)));
        }
    }

    #[test]
    fn bad_columns_are_corrupt() {
        assert!(matches!(
            store_error(sqlx::Error::ColumnNotFound("total_price".to_string())),
            StoreError::Corrupt(_)
        ));
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound),
            StoreError::Rejected(_)
        ));
    }

    #[test]
    fn rows_are_validated_on_read() {
        let record = row("Coffee", 2).into_record().unwrap();
        assert_eq!(record.total_price(), Decimal::from(30000));

        assert!(matches!(row("Coffee", 0).into_record(), Err(StoreError::Corrupt(_))));
        assert!(matches!(row("   ", 1).into_record(), Err(StoreError::Corrupt(_))));
    }

    /// Needs a reachable Postgres in `DATABASE_URL`.
    #[tokio::test]
    #[ignore]
    async fn round_trip_against_postgres() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let config = StoreConfig::from_json(&format!(
            r#"{{"database_url": "{url}", "collection": "sales_roundtrip_test"}}"#
        ))
        .unwrap();
        let store = PgLedgerStore::connect(&config).await.unwrap();
        store.ensure_schema().await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let sale = NewSale::new("Coffee", Decimal::from(15000), 3, date).unwrap();
        let record = store.append(sale).await.unwrap();
        assert_eq!(record.total_price(), Decimal::from(45000));

        let all = store.list_all().await.unwrap();
        assert!(all.iter().any(|r| r.id() == record.id()));
    }
}
