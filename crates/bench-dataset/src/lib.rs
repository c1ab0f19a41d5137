//! Dataset loading for dbms-bench.
//!
//! Input files are delimited text with a header row. Each [`DatasetKind`]
//! knows its file name, column types, target name and update patch;
//! [`read_csv`] does the typed parsing.
//!
//! # Example
//!
//! ```ignore
//! use bench_dataset::DatasetKind;
//!
//! let dataset = DatasetKind::Loans.load(Path::new("/data"))?;
//! println!("{} loans", dataset.len());
//! ```

mod error;
mod filler;
mod kinds;
mod reader;

pub use error::DatasetError;
pub use filler::filler_text;
pub use kinds::{DatasetKind, CONTENT_LENGTH};
pub use reader::{load_csv, parse_timestamp, read_csv};
