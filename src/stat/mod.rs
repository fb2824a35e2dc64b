pub mod datatype;
pub mod ledger;
pub mod sample_data;

pub use datatype::*;
pub use ledger::*;
