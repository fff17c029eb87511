#[cfg(feature = "csv")]
pub mod csv;
pub mod memory;
