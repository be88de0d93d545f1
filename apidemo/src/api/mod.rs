//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request data structures and their plain-text echo forms
//!
//! # API Structure
//!
//! - **Parameters** (`/path/*`, `/query-parameter(s)`): path and query parameter echoes
//! - **Bodies** (`/text-in-body`, `/bytes-in-body*`, `/object-in-body`, `/form-parameters`):
//!   request body decoding
//! - **Uploads** (`/bytes-in-body/asynchronous-save-file`, `/multipart-form-data`): bodies
//!   materialized on disk
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The document is served at
//! `/api-docs/openapi.json` and rendered at `/swagger` unless disabled in configuration.

pub mod handlers;
pub mod models;
