//! Record input adapters

pub mod csv;

pub use self::csv::CsvRecordSource;
