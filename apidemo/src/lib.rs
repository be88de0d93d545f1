//! # apidemo: a small HTTP API demonstration service
//!
//! `apidemo` shows the common ways an HTTP endpoint receives input: path and query parameters,
//! text and binary bodies, JSON objects, url-encoded forms, streamed uploads and
//! `multipart/form-data`. Every endpoint answers with a short plain-text echo of what it
//! received, and the whole surface is described by a generated OpenAPI document.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Handlers live in [`api`] and stay
//! thin: anything that consumes a request body is delegated to the [`materializer`], which works
//! on plain byte-chunk streams and either decodes them in memory or copies them to disk under a
//! single configurable upload directory. No state is shared between requests besides that
//! directory.
//!
//! Failures are expressed through [`errors::Error`], which maps each case onto an HTTP status and
//! a message that is safe to show to clients.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use apidemo::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = apidemo::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     apidemo::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod errors;
pub mod materializer;
mod openapi;
pub mod telemetry;

#[cfg(test)]
mod test;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::handlers::{bodies, parameters, uploads};
use crate::materializer::Materializer;
use crate::openapi::ApiDoc;

pub use config::Config;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .materializer(Materializer::from_config(&config.uploads))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub materializer: Materializer,
}

/// Build the router: every demo endpoint, health check and documentation, wrapped in request
/// tracing and the configured per-request timeout.
pub fn build_router(state: AppState) -> Router {
    let docs = state.config.docs.clone();
    let request_timeout = state.config.request_timeout;

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        // Parameters
        .route("/path/{parameter}", get(parameters::path_parameter))
        .route("/path/{parameter}/{parameter2}", get(parameters::path_parameters))
        .route("/query-parameter", get(parameters::query_parameter))
        .route("/query-parameters", get(parameters::query_parameters))
        // In-memory bodies
        .route("/text-in-body", post(bodies::text_in_body))
        .route("/bytes-in-body", post(bodies::bytes_in_body))
        .route("/bytes-in-body/asynchronous", post(bodies::bytes_in_body_asynchronous))
        .route("/object-in-body", post(bodies::object_in_body))
        .route("/form-parameters", post(bodies::form_parameters))
        // Bodies materialized on disk
        .route("/bytes-in-body/asynchronous-save-file", post(uploads::save_file))
        .route("/multipart-form-data", post(uploads::multipart_form_data))
        .with_state(state);

    if docs.enabled {
        router = router
            .route("/api-docs/openapi.json", get(openapi::openapi_json))
            .merge(Scalar::with_url(docs.path, ApiDoc::openapi()));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(timeout_layer(request_timeout)),
    )
}

/// Requests running longer than `timeout` are answered with 408.
fn timeout_layer(timeout: std::time::Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// The HTTP application, ready to serve.
///
/// ```ignore
/// let app = Application::new(config)?;
/// app.serve(shutdown_signal()).await?;
/// ```
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Validate `config` and assemble the router.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let state = AppState::builder()
            .materializer(Materializer::from_config(&config.uploads))
            .config(config.clone())
            .build();

        info!(
            upload_dir = %config.uploads.directory.display(),
            form_field_limit = config.uploads.form_field_limit,
            docs = config.docs.enabled,
            "Application configured"
        );

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Serve until `shutdown` resolves, then flush telemetry.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "apidemo listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );
        if self.config.docs.enabled {
            info!("API documentation at http://localhost:{}{}", self.config.port, self.config.docs.path);
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
