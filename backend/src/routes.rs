use std::sync::Arc;

use axum::{routing::get, Router};
use salesbook::LedgerStore;

use crate::services;

pub fn app() -> Router<AppState> {
    Router::new()
        .route("/", get(services::root))
        .route(
            "/sales",
            get(services::list_sales_handler).post(services::create_sale_handler),
        )
        .route("/sales/summary", get(services::sales_summary_handler))
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
}
