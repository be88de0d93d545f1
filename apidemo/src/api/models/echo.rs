use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Example record decoded from a JSON request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = ObjectA)]
pub struct EchoRecord {
    pub int_field: i32,
    pub string_field: String,
    /// May be omitted or sent as `null`
    pub nullable_int_field: Option<i32>,
    /// May be omitted or sent as `null`
    pub nullable_string_field: Option<String>,
}

/// Writes `null` for absent values.
pub(crate) struct OrNull<'a, T>(pub &'a Option<T>);

impl<T: fmt::Display> fmt::Display for OrNull<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for EchoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectA(intField={}, stringField={}, nullableIntField={}, nullableStringField={})",
            self.int_field,
            self.string_field,
            OrNull(&self.nullable_int_field),
            OrNull(&self.nullable_string_field)
        )
    }
}
