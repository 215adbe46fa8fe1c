use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use safersnap::config::{EndpointsConfig, ProxyConfig, ProxyResponseShape};

/// Endpoint templates pointed at a mock server. The snapshot path embeds the
/// MC number as a query-string-free path segment so `path_regex` matchers can
/// target it.
pub fn endpoints_for(server: &MockServer) -> EndpointsConfig {
    EndpointsConfig {
        snapshot_url: format!("{}/snapshot/{{mc}}", server.uri()),
        registration_url: format!("{}/registration/{{dot}}", server.uri()),
    }
}

/// Mount a snapshot page for one MC number.
pub async fn mount_snapshot(server: &MockServer, mc_number: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/snapshot/{}", mc_number)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mount a registration page for one DOT number.
pub async fn mount_registration(server: &MockServer, dot_number: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/registration/{}", dot_number)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mount a catch-all registration handler returning 404, for tests that do
/// not care about the email lookup.
pub async fn mount_registration_missing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/registration/.*$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// A proxy relay entry pointing at a mock server path. The `{url}` query
/// parameter is accepted but ignored; the mock serves a fixed body.
pub fn proxy_entry(server: &MockServer, name: &str, relay_path: &str, shape: ProxyResponseShape) -> ProxyConfig {
    ProxyConfig {
        name: name.to_string(),
        url_template: format!("{}{}?url={{url}}", server.uri(), relay_path),
        response_shape: shape,
    }
}

/// Mount a relay path returning a raw body with the given status.
pub async fn mount_relay_raw(server: &MockServer, relay_path: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(relay_path))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Mount a relay path returning a JSON envelope with the body under "contents".
pub async fn mount_relay_envelope(server: &MockServer, relay_path: &str, contents: &str) {
    Mock::given(method("GET"))
        .and(path(relay_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "contents": contents })),
        )
        .mount(server)
        .await;
}
