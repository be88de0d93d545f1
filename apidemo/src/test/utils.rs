//! Test utilities for driving the router in-process
use std::path::Path;

use axum_test::TestServer;

use crate::{Application, config::Config};

/// Default configuration with uploads redirected into `upload_dir`.
pub fn create_test_config(upload_dir: &Path) -> Config {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.uploads.directory = upload_dir.to_path_buf();
    config
}

pub fn create_test_app(upload_dir: &Path) -> TestServer {
    create_test_app_with_config(create_test_config(upload_dir))
}

pub fn create_test_app_with_config(config: Config) -> TestServer {
    Application::new(config)
        .expect("Failed to create application")
        .into_test_server()
}
