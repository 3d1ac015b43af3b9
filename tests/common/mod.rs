//! Common test utilities for integration tests.
//!
//! Provides a wiremock-backed Vault and settings pointing at it.

#![allow(dead_code)]

use serde_json::json;
use url::Url;
use vaultgate::config::Settings;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_TOKEN: &str = "s.integration-session";
pub const ROLE_ID: &str = "role-123";
pub const SECRET_ID: &str = "secret-456";

/// Settings that authenticate with AppRole against `server`.
pub fn approle_settings(server: &MockServer) -> Settings {
    let uri = Url::parse(&server.uri()).expect("mock server uri");

    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".to_string();
    settings.server.port = 0;
    settings.server.shutdown_grace_seconds = 2;
    settings.vault.host = uri.host_str().expect("mock server host").to_string();
    settings.vault.port = uri.port().expect("mock server port");
    settings.vault.timeout_seconds = 2;
    settings.vault.credential.role_id = Some(ROLE_ID.to_string());
    settings.vault.credential.secret_id = Some(SECRET_ID.into());
    settings
}

/// AppRole login answering with [`SESSION_TOKEN`].
pub async fn mount_approle_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .and(body_json(json!({ "role_id": ROLE_ID, "secret_id": SECRET_ID })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "login-1",
            "lease_id": "",
            "renewable": false,
            "lease_duration": 0,
            "data": null,
            "auth": {
                "client_token": SESSION_TOKEN,
                "accessor": "accessor-1",
                "policies": ["default", "qms-views"],
                "lease_duration": 3600,
                "renewable": true
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// KV v1 secret at `secret_path` holding `data`.
pub async fn mount_secret(server: &MockServer, secret_path: &str, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", secret_path)))
        .and(header("X-Vault-Token", SESSION_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "read-1",
            "lease_id": "",
            "renewable": false,
            "lease_duration": 2764800,
            "data": data,
            "wrap_info": null,
            "warnings": null,
            "auth": null
        })))
        .mount(server)
        .await;
}

pub async fn mount_missing(server: &MockServer, secret_path: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", secret_path)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
        .mount(server)
        .await;
}

pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/v1/sys/health"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "initialized": true,
            "sealed": status == 503,
            "standby": false
        })))
        .mount(server)
        .await;
}

/// Revocation that must happen exactly `times` times.
pub async fn mount_revoke(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/token/revoke-self"))
        .and(header("X-Vault-Token", SESSION_TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .expect(times)
        .mount(server)
        .await;
}
