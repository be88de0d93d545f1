use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{Error, Result};

/// Query parameters for `/query-parameter`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueryParameterQuery {
    /// Optional string parameter
    pub parameter1: Option<String>,
}

/// Raw query parameters for `/query-parameters`.
///
/// Everything deserializes as optional so an absent required parameter can be reported
/// by name; [`QueryParametersQuery::require`] enforces the required ones.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueryParametersQuery {
    /// parameter1 of example api
    pub parameter1: Option<String>,
    /// parameter2 of example api
    pub parameter2: Option<String>,
    /// parameter3 of example api
    #[param(required = true)]
    pub parameter3: Option<String>,
    /// parameter4 of example api
    #[param(required = true)]
    pub parameter4: Option<i64>,
    /// parameter5 of example api
    pub parameter5: Option<i64>,
}

/// `/query-parameters` input after required parameters have been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    pub parameter1: Option<String>,
    pub parameter2: Option<String>,
    pub parameter3: String,
    pub parameter4: i64,
    pub parameter5: Option<i64>,
}

impl QueryParametersQuery {
    pub fn require(self) -> Result<QueryParameters> {
        let parameter3 = self.parameter3.ok_or_else(|| missing("parameter3"))?;
        let parameter4 = self.parameter4.ok_or_else(|| missing("parameter4"))?;

        Ok(QueryParameters {
            parameter1: self.parameter1,
            parameter2: self.parameter2,
            parameter3,
            parameter4,
            parameter5: self.parameter5,
        })
    }
}

fn missing(name: &str) -> Error {
    Error::MissingRequiredParameter { name: name.to_string() }
}
