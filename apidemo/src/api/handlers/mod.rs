//! HTTP request handlers for all API endpoints.
//!
//! Handlers are thin: they pull a value out of the request (path, query or body), hand
//! bodies to the [`crate::materializer`] and answer with plain text.
//!
//! # Handler Modules
//!
//! - [`parameters`]: path and query parameter echoes
//! - [`bodies`]: text, byte, JSON and form body echoes
//! - [`uploads`]: streamed and multipart bodies written to the upload directory
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Result`], so every failure is rendered through
//! [`crate::errors::Error`]'s `IntoResponse` implementation with its mapped status code.

pub mod bodies;
pub mod parameters;
pub mod uploads;
