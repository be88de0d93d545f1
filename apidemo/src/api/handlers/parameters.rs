use axum::extract::{Path, Query, rejection::QueryRejection};

use crate::{
    api::models::{
        echo::OrNull,
        parameters::{QueryParameterQuery, QueryParametersQuery},
    },
    errors::{Error, Result},
};

fn query_error(rejection: QueryRejection) -> Error {
    Error::malformed(rejection.body_text())
}

#[utoipa::path(
    get,
    path = "/path/{parameter}",
    tag = "parameters",
    summary = "Echo a path parameter",
    params(
        ("parameter" = String, Path, description = "Any single path segment")
    ),
    responses(
        (status = 200, description = "The echoed parameter", body = String, content_type = "text/plain")
    )
)]
pub async fn path_parameter(Path(parameter): Path<String>) -> String {
    format!("path parameter is: {parameter}")
}

#[utoipa::path(
    get,
    path = "/path/{parameter}/{parameter2}",
    tag = "parameters",
    summary = "Echo two path parameters",
    params(
        ("parameter" = String, Path, description = "First path segment"),
        ("parameter2" = String, Path, description = "Second path segment")
    ),
    responses(
        (status = 200, description = "The echoed parameters", body = String, content_type = "text/plain")
    )
)]
pub async fn path_parameters(Path((parameter, parameter2)): Path<(String, String)>) -> String {
    format!("path parameter is: {parameter} and parameter2 is: {parameter2}")
}

#[utoipa::path(
    get,
    path = "/query-parameter",
    tag = "parameters",
    summary = "Echo an optional query parameter",
    params(QueryParameterQuery),
    responses(
        (status = 200, description = "The echoed parameter, or null when absent", body = String, content_type = "text/plain"),
        (status = 400, description = "Query string could not be parsed")
    )
)]
pub async fn query_parameter(query: std::result::Result<Query<QueryParameterQuery>, QueryRejection>) -> Result<String> {
    let Query(query) = query.map_err(query_error)?;
    Ok(format!("query parameters is: {}", OrNull(&query.parameter1)))
}

#[utoipa::path(
    get,
    path = "/query-parameters",
    tag = "parameters",
    summary = "Echo typed query parameters",
    description = "parameter3 and parameter4 are required; parameter4 and parameter5 must be integers.",
    params(QueryParametersQuery),
    responses(
        (status = 200, description = "One line per parameter", body = String, content_type = "text/plain"),
        (status = 400, description = "A required parameter is missing or a value has the wrong type")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn query_parameters(query: std::result::Result<Query<QueryParametersQuery>, QueryRejection>) -> Result<String> {
    let Query(query) = query.map_err(query_error)?;
    let params = query.require()?;

    Ok(format!(
        "query parameter1 is: {}\nquery parameter2 is: {}\nquery parameter3 is: {}\nquery parameter4 is: {}\nquery parameter5 is: {}",
        OrNull(&params.parameter1),
        OrNull(&params.parameter2),
        params.parameter3,
        params.parameter4,
        OrNull(&params.parameter5),
    ))
}
