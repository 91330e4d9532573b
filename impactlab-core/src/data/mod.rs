//! Data layer: snapshot schema, CSV ingest, synthetic generation.

pub mod ingest;
pub mod schema;
pub mod synthetic;

pub use ingest::{write_csv, DataError, IngestedBook, LobIngestor};
pub use schema::{LobSchema, SchemaError};
pub use synthetic::generate_synthetic_books;
