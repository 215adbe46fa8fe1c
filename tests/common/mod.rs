// Shared across test binaries; not every binary uses every helper
#![allow(dead_code)]

pub mod fixtures;
pub mod wiremock_helpers;

use safersnap::config::{AppConfig, EndpointsConfig, HttpConfig, ProxyConfig, ScrapeConfig};

/// A minimal valid config pointing all endpoints at the given mock-server
/// templates. Proxies default to two unreachable relays; fetch tests replace
/// them with mounted ones.
pub fn test_config(endpoints: EndpointsConfig, proxies: Vec<ProxyConfig>) -> AppConfig {
    AppConfig {
        http: HttpConfig {
            user_agent: "safersnap-tests/0.1".to_string(),
            request_timeout_secs: 5,
        },
        endpoints,
        proxies,
        scrape: ScrapeConfig {
            request_delay_ms: 0,
            insurance_account: "test-account".to_string(),
            insurance_api_base: "http://127.0.0.1:9".to_string(),
        },
    }
}
