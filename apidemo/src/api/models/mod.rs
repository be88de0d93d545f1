//! Request models shared by the handlers and the OpenAPI document.

pub mod echo;
pub mod parameters;
