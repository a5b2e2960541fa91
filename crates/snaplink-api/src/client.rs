// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client wrapper with bearer authentication and one-shot 401 refresh.

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use snaplink_config::ApiConfig;
use tracing::{debug, error, instrument};

use crate::auth::AccessTokenProvider;
use crate::error::{ApiError, Result};

/// Body of `POST /shorten`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest<'a> {
	pub original_url: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub short_code: Option<&'a str>,
}

/// Authenticated client for the evaluation service.
#[derive(Clone)]
pub struct ApiClient {
	http: Client,
	config: ApiConfig,
	tokens: Arc<dyn AccessTokenProvider>,
}

impl ApiClient {
	pub fn new(config: ApiConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self> {
		let http =
			snaplink_common_http::client_with_timeout(config.timeout).map_err(ApiError::Client)?;
		Ok(Self::with_http_client(http, config, tokens))
	}

	pub fn with_http_client(
		http: Client,
		config: ApiConfig,
		tokens: Arc<dyn AccessTokenProvider>,
	) -> Self {
		Self {
			http,
			config,
			tokens,
		}
	}

	pub fn tokens(&self) -> &Arc<dyn AccessTokenProvider> {
		&self.tokens
	}

	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	/// Sends `method path` with an optional JSON body and returns the decoded
	/// response body.
	///
	/// A 401 on the first attempt forces a token refresh and resends once; a
	/// second 401 is returned as an error. Empty bodies decode as `null` and
	/// non-JSON bodies as a JSON string.
	#[instrument(skip_all, fields(method = %method, path = %path))]
	pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
		let mut attempt: u32 = 0;

		loop {
			attempt += 1;
			let response = self.send(&method, path, body, attempt > 1).await?;

			if response.status() == StatusCode::UNAUTHORIZED
				&& attempt == 1
				&& !self.is_auth_path(path)
			{
				debug!("received 401, refreshing token and retrying");
				continue;
			}

			return read_response(response).await;
		}
	}

	async fn send(
		&self,
		method: &Method,
		path: &str,
		body: Option<&Value>,
		force_refresh: bool,
	) -> Result<Response> {
		let mut request = self
			.http
			.request(method.clone(), self.config.endpoint(path));

		if !self.is_auth_path(path) {
			let token = self.tokens.get_token(force_refresh).await?;
			request = request.bearer_auth(token.expose());
		}

		if let Some(body) = body {
			request = request.json(body);
		}

		request.send().await.map_err(ApiError::NoResponse)
	}

	fn is_auth_path(&self, path: &str) -> bool {
		path == self.config.auth_path
	}

	pub async fn get(&self, path: &str) -> Result<Value> {
		self.request(Method::GET, path, None)
			.await
			.inspect_err(|e| error!(path, error = %e, "GET failed"))
	}

	pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
		let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
		self.request(Method::POST, path, Some(&body))
			.await
			.inspect_err(|e| error!(path, error = %e, "POST failed"))
	}

	pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
		let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
		self.request(Method::PUT, path, Some(&body))
			.await
			.inspect_err(|e| error!(path, error = %e, "PUT failed"))
	}

	pub async fn delete(&self, path: &str) -> Result<Value> {
		self.request(Method::DELETE, path, None)
			.await
			.inspect_err(|e| error!(path, error = %e, "DELETE failed"))
	}

	/// `POST /shorten`
	pub async fn shorten_url(&self, long_url: &str, custom_code: Option<&str>) -> Result<Value> {
		let body = ShortenRequest {
			original_url: long_url,
			short_code: custom_code.filter(|c| !c.is_empty()),
		};
		self.post("/shorten", &body).await
	}

	/// `GET /url/:code`
	pub async fn url_details(&self, short_code: &str) -> Result<Value> {
		self.get(&format!("/url/{short_code}")).await
	}

	/// `GET /analytics/:code`
	pub async fn analytics(&self, short_code: &str) -> Result<Value> {
		self.get(&format!("/analytics/{short_code}")).await
	}
}

async fn read_response(response: Response) -> Result<Value> {
	let status = response.status();
	let text = response.text().await.map_err(ApiError::NoResponse)?;
	let data = decode_body(&text);

	if status.is_success() {
		Ok(data)
	} else {
		Err(ApiError::from_response(status.as_u16(), data))
	}
}

fn decode_body(text: &str) -> Value {
	if text.trim().is_empty() {
		return Value::Null;
	}
	serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
