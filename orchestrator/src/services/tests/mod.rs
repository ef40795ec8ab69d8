//! Service-specific tests
//!
//! HTTP services run against a local wiremock server; the file sink writes
//! into a temporary directory.


// Common test utilities for services
pub mod common {
    use crate::config::ClientConfig;
    use wiremock::MockServer;

    pub const TEST_API_KEY: &str = "test-key";
    pub const TEST_MODEL: &str = "veo-test";
    pub const TEST_ENHANCE_MODEL: &str = "gemini-test";

    /// Client configuration pointing at the mock server
    pub fn client_config(server: &MockServer) -> ClientConfig {
        let mut config = ClientConfig::new(&server.uri(), TEST_API_KEY).expect("valid mock server uri");
        config.model = TEST_MODEL.to_string();
        config.enhance_model = TEST_ENHANCE_MODEL.to_string();
        config
    }
}
