// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use serde_json::json;
use snaplink_api::{AccessTokenProvider, ApiClient, ApiError, AuthError, TokenProvider};
use snaplink_config::{ApiConfig, Credentials, SecretString};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config(server: &MockServer) -> ApiConfig {
	ApiConfig {
		base_url: server.uri(),
		..Default::default()
	}
}

fn credentials() -> Credentials {
	Credentials {
		email: "dev@example.com".to_string(),
		name: "Dev User".to_string(),
		roll_no: "R-42".to_string(),
		access_code: SecretString::from("access"),
		client_id: "client-id".to_string(),
		client_secret: SecretString::from("client-secret"),
	}
}

fn token_response(token: &str, expires_in: i64) -> ResponseTemplate {
	ResponseTemplate::new(200).set_body_json(json!({
		"token_type": "Bearer",
		"access_token": token,
		"expires_in": expires_in,
	}))
}

#[tokio::test]
async fn posts_credentials_and_caches_token() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.and(body_partial_json(json!({
			"email": "dev@example.com",
			"rollNo": "R-42",
			"accessCode": "access",
			"clientID": "client-id",
			"clientSecret": "client-secret",
		})))
		.respond_with(token_response("tok-1", 3600))
		.expect(1)
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();

	let first = provider.get_token(false).await.unwrap();
	let second = provider.get_token(false).await.unwrap();

	assert_eq!(first.expose(), "tok-1");
	assert_eq!(second.expose(), "tok-1");
	assert!(provider.cached_token().await.is_some());
}

#[tokio::test]
async fn force_refresh_bypasses_cache() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("tok-1", 3600))
		.up_to_n_times(1)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("tok-2", 3600))
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();

	assert_eq!(provider.get_token(false).await.unwrap().expose(), "tok-1");
	assert_eq!(provider.get_token(true).await.unwrap().expose(), "tok-2");
	assert_eq!(provider.get_token(false).await.unwrap().expose(), "tok-2");
}

#[tokio::test]
async fn expired_token_is_refetched() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("short-lived", 0))
		.expect(2)
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();
	provider.get_token(false).await.unwrap();
	provider.get_token(false).await.unwrap();
}

#[tokio::test]
async fn missing_expiry_defaults_to_an_hour() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();
	provider.get_token(false).await.unwrap();

	let cached = provider.cached_token().await.unwrap();
	let remaining = cached.expires_at - chrono::Utc::now();
	assert!(remaining > chrono::Duration::minutes(59));
	assert!(remaining <= chrono::Duration::minutes(60));
}

#[tokio::test]
async fn response_without_token_is_an_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"expires_in": 60})))
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();
	let err = provider.get_token(false).await.unwrap_err();

	assert!(matches!(err, AuthError::MissingToken));
	assert!(provider.cached_token().await.is_none());
}

#[tokio::test]
async fn rejection_carries_server_message() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "invalid client secret"})))
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();
	let err = provider.get_token(false).await.unwrap_err();

	assert_eq!(err.to_string(), "Authentication failed: invalid client secret");
	assert!(!provider.initialize().await);
}

#[tokio::test]
async fn initialize_reports_success() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("tok", 3600))
		.expect(1)
		.mount(&server)
		.await;

	let provider = TokenProvider::new(&api_config(&server), credentials()).unwrap();
	assert!(provider.initialize().await);
}

#[tokio::test]
async fn client_refreshes_real_token_after_401() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("stale", 3600))
		.up_to_n_times(1)
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("fresh", 3600))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/shorten"))
		.and(header("Authorization", "Bearer stale"))
		.respond_with(ResponseTemplate::new(401))
		.expect(1)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/shorten"))
		.and(header("Authorization", "Bearer fresh"))
		.and(body_partial_json(json!({"originalUrl": "https://example.com/long"})))
		.respond_with(ResponseTemplate::new(201).set_body_json(json!({"shortLink": "http://s/abc"})))
		.expect(1)
		.mount(&server)
		.await;

	let config = api_config(&server);
	let tokens = Arc::new(TokenProvider::new(&config, credentials()).unwrap());
	let client = ApiClient::new(config, tokens).unwrap();

	let data = client
		.shorten_url("https://example.com/long", None)
		.await
		.unwrap();
	assert_eq!(data["shortLink"], "http://s/abc");
}

#[tokio::test]
async fn refresh_failure_during_retry_surfaces_auth_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(token_response("stale", 3600))
		.up_to_n_times(1)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/auth"))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/url/abc"))
		.respond_with(ResponseTemplate::new(401))
		.expect(1)
		.mount(&server)
		.await;

	let config = api_config(&server);
	let tokens = Arc::new(TokenProvider::new(&config, credentials()).unwrap());
	let client = ApiClient::new(config, tokens).unwrap();

	let err = client.url_details("abc").await.unwrap_err();
	assert!(matches!(
		err,
		ApiError::Auth(AuthError::Rejected { status: 500, .. })
	));
}
