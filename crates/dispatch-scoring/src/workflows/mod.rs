pub(crate) mod csv_support;
pub mod history;
pub mod prediction;
pub mod ranking;
