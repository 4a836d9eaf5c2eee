//! Cell addressing and values

pub mod address;
pub mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::{ErrorKind, Value};
