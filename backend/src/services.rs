use crate::routes::AppState;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use salesbook::form::submit_sale;
use salesbook::{
    aggregate_between, Bucket, BucketTotalDto, Record, SaleDoc, StoreError, SubmitError,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub async fn root() -> &'static str {
    "salesbook ledger"
}

fn store_status(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, format!("db error: {e}")),
        StoreError::TimedOut(_) => (StatusCode::GATEWAY_TIMEOUT, format!("db error: {e}")),
        StoreError::Rejected(_) | StoreError::Corrupt(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("db error: {e}"))
        }
    }
}

pub async fn list_sales_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, (StatusCode, String)> {
    let records = state.store.list_all().await.map_err(store_status)?;
    Ok(Json(records))
}

/// The sale is dated with the server's local "today"; callers cannot choose the date.
pub async fn create_sale_handler(
    State(state): State<AppState>,
    Json(req): Json<SaleDoc>,
) -> Result<(StatusCode, Json<Record>), (StatusCode, String)> {
    let sale = req
        .into_sale(Local::now().date_naive())
        .map_err(|e| {
            warn!(%e, "rejected sale");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    let record = submit_sale(state.store.as_ref(), sale)
        .await
        .map_err(|e| match e {
            SubmitError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            SubmitError::Store(e) => store_status(e),
        })?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// `from`/`to` are inclusive; either may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub bucket: Option<Bucket>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResp {
    pub bucket: Bucket,
    pub buckets: Vec<BucketTotalDto>,
    pub total: Decimal,
}

pub async fn sales_summary_handler(
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<SummaryResp>, (StatusCode, String)> {
    if let (Some(from), Some(to)) = (q.from, q.to) {
        if from > to {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("from ({from}) is after to ({to})"),
            ));
        }
    }
    let bucket = q.bucket.unwrap_or_default();
    let records = state.store.list_all().await.map_err(store_status)?;
    let totals = aggregate_between(&records, bucket, q.from, q.to);

    Ok(Json(SummaryResp {
        bucket,
        total: totals.iter().map(|t| t.revenue).sum(),
        buckets: totals.iter().map(BucketTotalDto::from).collect(),
    }))
}
