mod core;
mod table;

// Re-export core BOM types
pub use core::*;

// Re-export export table and writers
pub use table::{BomTable, BomWriteError};
