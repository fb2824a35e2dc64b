use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use salesbook::form::{submit_form, SaleForm};
use salesbook::report::{ChartKind, ChartSeries, ReportTable};
use salesbook::{Bucket, Ledger, LedgerStore, StoreError, SubmitError};
use tokio::runtime::Runtime;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Sales,
    Analysis,
    Help,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    CreatingSale,
}

pub const FORM_FIELDS: [&str; 3] = ["Item name", "Unit price (Rp)", "Quantity"];

pub struct App {
    pub store: Arc<dyn LedgerStore>,
    pub ledger: Ledger,
    pub current_screen: Screen,
    pub input_mode: InputMode,
    pub form: SaleForm,
    pub form_field_idx: usize,
    pub selected_row_idx: usize,
    pub chart_kind: ChartKind,
    pub bucket: Bucket,
    pub should_quit: bool,
    pub needs_refresh: bool,
    pub last_refresh: Option<Instant>,
    pub refresh_failed: bool,
    pub refresh_every: Duration,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl App {
    pub fn new(store: Arc<dyn LedgerStore>, refresh_every: Duration) -> Self {
        Self {
            store,
            ledger: Ledger::default(),
            current_screen: Screen::Sales,
            input_mode: InputMode::Normal,
            form: SaleForm::default(),
            form_field_idx: 0,
            selected_row_idx: 0,
            chart_kind: ChartKind::Line,
            bucket: Bucket::Daily,
            should_quit: false,
            needs_refresh: true,
            last_refresh: None,
            refresh_failed: false,
            refresh_every,
            error_message: None,
            success_message: None,
        }
    }

    pub fn next_screen(&mut self) {
        self.current_screen = match self.current_screen {
            Screen::Sales => Screen::Analysis,
            Screen::Analysis => Screen::Help,
            Screen::Help => Screen::Sales,
        };
    }

    pub fn prev_screen(&mut self) {
        self.current_screen = match self.current_screen {
            Screen::Sales => Screen::Help,
            Screen::Analysis => Screen::Sales,
            Screen::Help => Screen::Analysis,
        };
    }

    pub fn report(&self) -> ReportTable {
        ReportTable::from_records(&self.ledger.records)
    }

    pub fn chart(&self) -> ChartSeries {
        ChartSeries::from_totals(&self.ledger.aggregate(self.bucket), self.chart_kind)
    }

    pub fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }

    pub fn select_prev(&mut self) {
        self.selected_row_idx = self.selected_row_idx.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected_row_idx + 1 < self.ledger.len() {
            self.selected_row_idx += 1;
        }
    }

    pub fn open_form(&mut self) {
        self.current_screen = Screen::Sales;
        self.input_mode = InputMode::CreatingSale;
        self.form_field_idx = 0;
        self.clear_messages();
    }

    pub fn cancel_form(&mut self) {
        self.input_mode = InputMode::Normal;
        self.form.clear();
        self.error_message = None;
    }

    pub fn next_field(&mut self) {
        self.form_field_idx = (self.form_field_idx + 1) % FORM_FIELDS.len();
    }

    pub fn prev_field(&mut self) {
        self.form_field_idx = (self.form_field_idx + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    fn field_mut(&mut self) -> &mut String {
        match self.form_field_idx {
            0 => &mut self.form.item_name,
            1 => &mut self.form.unit_price,
            _ => &mut self.form.quantity,
        }
    }

    /// Price only takes digits and separators, quantity only digits.
    pub fn push_char(&mut self, c: char) {
        let accepted = match self.form_field_idx {
            0 => !c.is_control(),
            1 => c.is_ascii_digit() || c == '.' || c == ',',
            _ => c.is_ascii_digit(),
        };
        if accepted {
            self.field_mut().push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.field_mut().pop();
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        self.needs_refresh
            || self
                .last_refresh
                .map_or(true, |t| now.duration_since(t) >= self.refresh_every)
    }

    /// Replaces the snapshot with a fresh read. On failure the previous snapshot stays on screen.
    pub fn refresh(&mut self, rt: &Runtime) {
        self.needs_refresh = false;
        self.last_refresh = Some(Instant::now());
        match rt.block_on(Ledger::fetch(self.store.as_ref())) {
            Ok(ledger) => {
                self.ledger = ledger;
                if self.selected_row_idx >= self.ledger.len() {
                    self.selected_row_idx = self.ledger.len().saturating_sub(1);
                }
                if self.refresh_failed {
                    self.refresh_failed = false;
                    self.error_message = None;
                    self.success_message = Some("Data refreshed".to_string());
                }
            }
            Err(e) => {
                warn!(%e, "refresh failed");
                self.refresh_failed = true;
                self.error_message = Some(format!("Refresh failed: {e}"));
            }
        }
    }

    /// On success the form closes and a refresh is queued; on failure the input is kept
    /// so the user can fix it or try again.
    pub fn submit(&mut self, rt: &Runtime) {
        let today = Local::now().date_naive();
        match rt.block_on(submit_form(self.store.as_ref(), &self.form, today)) {
            Ok(record) => {
                self.success_message = Some(format!(
                    "Sale '{}' x{} added",
                    record.item_name(),
                    record.quantity()
                ));
                self.error_message = None;
                self.form.clear();
                self.input_mode = InputMode::Normal;
                self.needs_refresh = true;
            }
            Err(SubmitError::Validation(e)) => {
                self.success_message = None;
                self.error_message = Some(format!("Invalid sale: {e}"));
            }
            Err(SubmitError::Store(StoreError::TimedOut(e))) => {
                // the sale may have landed; the next snapshot shows whether it did
                self.success_message = None;
                self.error_message = Some(format!(
                    "Save outcome unknown, check the table before retrying: {e}"
                ));
                self.needs_refresh = true;
            }
            Err(SubmitError::Store(e)) => {
                self.success_message = None;
                self.error_message = Some(format!("Failed to save sale: {e}"));
            }
        }
    }
}
