// ============================================================================
// jsonapidb Library
// ============================================================================

//! SQL connector for JSON REST APIs.
//!
//! Exposes HTTP endpoints returning JSON arrays (optionally wrapped in an
//! envelope object) as queryable tables: column types are inferred from a
//! sampled response, and a restricted SELECT subset — equality and range
//! predicates plus LIMIT — is translated into query-string parameters on a
//! single GET request.
//!
//! # Examples
//!
//! ```no_run
//! use jsonapidb::Connection;
//!
//! fn main() -> jsonapidb::Result<()> {
//!     let conn = Connection::connect_url(
//!         "jsonapi://api.example.com/v1?token=secret&envelope=data",
//!     )?;
//!
//!     for table in conn.table_names() {
//!         let schema = conn.table_schema(&table)?;
//!         println!("{}: {:?}", table, schema.column_names());
//!     }
//!
//!     let result = conn.execute("SELECT id, name FROM items WHERE id = 2 LIMIT 1")?;
//!     result.print();
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod core;
pub mod result;
pub mod schema;
mod parser;
mod translator;

// Re-export main types for convenience
pub use connection::Connection;
pub use connection::auth::AuthMode;
pub use connection::config::ConnectionConfig;
pub use core::{ApiError, DataType, Result, Row, Value};
pub use result::QueryResult;
pub use schema::{ColumnDef, TableSchema};
