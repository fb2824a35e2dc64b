use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::datatype::NewSale;
use crate::error::ValidationError;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("sample dates are valid")
}

/// A small trading month used by the demo binary and tests.
pub fn sample_sales() -> Result<Vec<NewSale>, ValidationError> {
    Ok(vec![
        NewSale::new("Coffee", Decimal::from(15_000), 2, day(2025, 1, 1))?,
        NewSale::new("Coffee", Decimal::from(15_000), 3, day(2025, 1, 2))?,
        NewSale::new("Tea", Decimal::from(8_000), 4, day(2025, 1, 2))?,
        NewSale::new("Desk", Decimal::from(1_250_000), 1, day(2025, 1, 6))?,
        NewSale::new("Chair", Decimal::from(450_000), 2, day(2025, 1, 12))?,
        NewSale::new("Notebook", Decimal::new(12_500_50, 2), 6, day(2025, 1, 20))?,
        NewSale::new("Coffee", Decimal::from(15_000), 10, day(2025, 2, 3))?,
        NewSale::new("Lamp", Decimal::from(175_000), 1, day(2025, 2, 14))?,
    ])
}
