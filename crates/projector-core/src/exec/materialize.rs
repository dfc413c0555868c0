use crate::{exec::ExecuteError, value::Record};

///
/// FromRecord
///
/// Typed materialization of a constructed destination record.
///

pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self, ExecuteError>;

    /// Read a text field or fail with `Materialize`.
    fn text_field(record: &Record, target: &'static str, field: &str) -> Result<String, ExecuteError> {
        record
            .text(field)
            .map(str::to_string)
            .ok_or_else(|| ExecuteError::materialize(target, field))
    }

    /// Read an int field or fail with `Materialize`.
    fn int_field(record: &Record, target: &'static str, field: &str) -> Result<i64, ExecuteError> {
        record
            .int(field)
            .ok_or_else(|| ExecuteError::materialize(target, field))
    }

    /// Read a uint field or fail with `Materialize`.
    fn uint_field(record: &Record, target: &'static str, field: &str) -> Result<u64, ExecuteError> {
        record
            .uint(field)
            .ok_or_else(|| ExecuteError::materialize(target, field))
    }

    /// Read a bool field or fail with `Materialize`.
    fn bool_field(record: &Record, target: &'static str, field: &str) -> Result<bool, ExecuteError> {
        record
            .bool(field)
            .ok_or_else(|| ExecuteError::materialize(target, field))
    }
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self, ExecuteError> {
        Ok(record.clone())
    }
}
