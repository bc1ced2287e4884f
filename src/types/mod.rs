#![forbid(unsafe_code)]

//! Shared value, record and error types.

mod error;
mod record;
mod value;

pub use error::{BridgeError, LookupKind, Result};
pub use record::{Record, CLASS_FIELD, RID_FIELD};
pub use value::Value;
