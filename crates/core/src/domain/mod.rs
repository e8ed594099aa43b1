pub mod error;
pub mod record;

pub use error::ValidationError;
pub use record::{NewRecord, Record, RecordField};
