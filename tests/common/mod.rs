#![allow(dead_code)]

use apikit::config::Config;
use apikit::error::BizCodeRegistry;
use apikit::routes::app_router;
use apikit::server::build_state;
use axum_test::TestServer;

pub const TEST_VERSION: &str = "1.2.3-test";

pub fn test_config(locale: &str) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        locale: locale.to_string(),
        app_version: TEST_VERSION.to_string(),
        read_json_max_bytes: 1024,
    }
}

/// Full application router with its own business-code registry.
pub fn create_test_server(config: &Config) -> TestServer {
    let registry = BizCodeRegistry::new();
    let state = build_state(config, &registry);
    TestServer::new(app_router(state, config)).unwrap()
}

pub fn zh_server() -> TestServer {
    create_test_server(&test_config("zh"))
}

pub fn en_server() -> TestServer {
    create_test_server(&test_config("en"))
}
