pub mod semicolon;

pub use semicolon::{read_rows, read_rows_from_path};
