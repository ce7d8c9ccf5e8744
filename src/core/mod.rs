pub mod error;
pub mod types;
pub mod value;

pub use error::{ApiError, Result};
pub use types::{DataType, Row};
pub use value::Value;
