// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token acquisition and caching.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use snaplink_config::{ApiConfig, Credentials, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::{ApiError, AuthError};

/// Lifetime assumed when the auth response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Source of bearer tokens for [`crate::ApiClient`].
///
/// Allows the client to be exercised against mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
	/// Returns a usable token, fetching a new one when none is cached, the
	/// cached one has expired, or `force_refresh` is set.
	async fn get_token(&self, force_refresh: bool) -> Result<SecretString, AuthError>;

	/// Performs a non-forced token fetch and reports whether it succeeded.
	async fn initialize(&self) -> bool {
		match self.get_token(false).await {
			Ok(_) => true,
			Err(e) => {
				warn!(error = %e, "failed to initialize API authentication");
				false
			}
		}
	}
}

/// A cached bearer token.
#[derive(Debug, Clone)]
pub struct AuthToken {
	pub value: SecretString,
	pub expires_at: DateTime<Utc>,
}

impl AuthToken {
	pub fn new(value: SecretString, expires_in_secs: i64) -> Self {
		Self {
			value,
			expires_at: Utc::now() + Duration::seconds(expires_in_secs),
		}
	}

	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(Utc::now())
	}
}

#[derive(Serialize)]
struct AuthRequest<'a> {
	email: &'a str,
	name: &'a str,
	#[serde(rename = "rollNo")]
	roll_no: &'a str,
	#[serde(rename = "accessCode")]
	access_code: &'a str,
	#[serde(rename = "clientID")]
	client_id: &'a str,
	#[serde(rename = "clientSecret")]
	client_secret: &'a str,
}

impl<'a> From<&'a Credentials> for AuthRequest<'a> {
	fn from(creds: &'a Credentials) -> Self {
		Self {
			email: &creds.email,
			name: &creds.name,
			roll_no: &creds.roll_no,
			access_code: creds.access_code.expose(),
			client_id: &creds.client_id,
			client_secret: creds.client_secret.expose(),
		}
	}
}

#[derive(Deserialize)]
struct AuthResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorBody {
	message: Option<String>,
}

/// Fetches tokens from `<base_url><auth_path>` with a fixed credential set.
///
/// At most one token is cached. Concurrent callers that both observe a
/// missing or expired token will each fetch a new one; the last write wins.
pub struct TokenProvider {
	http: Client,
	auth_url: String,
	credentials: Credentials,
	token: RwLock<Option<AuthToken>>,
}

impl TokenProvider {
	pub fn new(api: &ApiConfig, credentials: Credentials) -> Result<Self, ApiError> {
		let http = snaplink_common_http::client_with_timeout(api.timeout).map_err(ApiError::Client)?;
		Ok(Self::with_client(http, api, credentials))
	}

	pub fn with_client(http: Client, api: &ApiConfig, credentials: Credentials) -> Self {
		Self {
			http,
			auth_url: api.endpoint(&api.auth_path),
			credentials,
			token: RwLock::new(None),
		}
	}

	/// The currently cached token, if any.
	pub async fn cached_token(&self) -> Option<AuthToken> {
		self.token.read().await.clone()
	}

	#[instrument(skip(self), fields(url = %self.auth_url))]
	async fn fetch_token(&self) -> Result<AuthToken, AuthError> {
		debug!("requesting access token");

		let response = self
			.http
			.post(&self.auth_url)
			.json(&AuthRequest::from(&self.credentials))
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			let message = serde_json::from_str::<ErrorBody>(&body)
				.ok()
				.and_then(|b| b.message)
				.unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));
			warn!(status = status.as_u16(), %message, "authentication rejected");
			return Err(AuthError::Rejected {
				status: status.as_u16(),
				message,
			});
		}

		let parsed: AuthResponse =
			serde_json::from_str(&body).map_err(|_| AuthError::MissingToken)?;

		let access_token = parsed
			.access_token
			.filter(|t| !t.is_empty())
			.ok_or(AuthError::MissingToken)?;
		let expires_in = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

		info!(expires_in, "obtained access token");
		Ok(AuthToken::new(SecretString::new(access_token), expires_in))
	}
}

#[async_trait]
impl AccessTokenProvider for TokenProvider {
	async fn get_token(&self, force_refresh: bool) -> Result<SecretString, AuthError> {
		if !force_refresh {
			if let Some(token) = self.token.read().await.as_ref() {
				if !token.is_expired() {
					return Ok(token.value.clone());
				}
				debug!("cached access token expired");
			}
		}

		let token = self.fetch_token().await?;
		let value = token.value.clone();
		*self.token.write().await = Some(token);
		Ok(value)
	}
}
