//! OpenAPI documentation for every demo endpoint.
//!
//! [`ApiDoc`] is served as JSON at `/api-docs/openapi.json` and rendered by the
//! documentation UI mounted at `docs.path`.

use axum::Json;
use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::parameters::path_parameter,
        api::handlers::parameters::path_parameters,
        api::handlers::parameters::query_parameter,
        api::handlers::parameters::query_parameters,
        api::handlers::bodies::text_in_body,
        api::handlers::bodies::bytes_in_body,
        api::handlers::bodies::bytes_in_body_asynchronous,
        api::handlers::bodies::object_in_body,
        api::handlers::bodies::form_parameters,
        api::handlers::uploads::save_file,
        api::handlers::uploads::multipart_form_data,
    ),
    components(
        schemas(api::models::echo::EchoRecord)
    ),
    tags(
        (name = "parameters", description = "Path and query parameter echoes."),
        (name = "bodies", description = "Text, binary, JSON and form request bodies decoded in memory."),
        (name = "uploads", description = "Request bodies streamed to disk under the upload directory."),
    ),
    info(
        title = "OpenAPI example",
        version = "2.1",
        description = "This is a sample API

This is a longer description",
        terms_of_service = "https://example.com/terms/",
        contact(email = "contact@example.com"),
        license(name = "Apache/1.0"),
    )
)]
pub struct ApiDoc;

/// Serve the generated document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metadata() {
        let doc = ApiDoc::openapi();

        assert_eq!(doc.info.title, "OpenAPI example");
        assert_eq!(doc.info.version, "2.1");
        assert_eq!(doc.info.terms_of_service.as_deref(), Some("https://example.com/terms/"));
        assert_eq!(
            doc.info.contact.as_ref().and_then(|c| c.email.as_deref()),
            Some("contact@example.com")
        );
        assert_eq!(doc.info.license.as_ref().map(|l| l.name.as_str()), Some("Apache/1.0"));
    }

    #[test]
    fn test_document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();

        for path in [
            "/path/{parameter}",
            "/path/{parameter}/{parameter2}",
            "/query-parameter",
            "/query-parameters",
            "/text-in-body",
            "/bytes-in-body",
            "/bytes-in-body/asynchronous",
            "/bytes-in-body/asynchronous-save-file",
            "/object-in-body",
            "/form-parameters",
            "/multipart-form-data",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("ObjectA"));
    }
}
