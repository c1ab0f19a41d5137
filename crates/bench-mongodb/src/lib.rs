//! MongoDB backend for dbms-bench.
//!
//! Every target is a collection in one database. Records become documents
//! with one field per column; MongoDB assigns `_id` and range retrieval
//! filters on the dataset's id column.

mod adapter;
mod args;
mod convert;
mod error;

pub use adapter::MongoDBAdapter;
pub use args::MongoDBArgs;
pub use convert::{document_to_record, record_to_document};
pub use error::MongoDBAdapterError;
