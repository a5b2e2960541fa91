// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client for the SnapLink evaluation service.
//!
//! [`TokenProvider`] obtains and caches a bearer token from the auth
//! endpoint. [`ApiClient`] attaches that token to every request except the
//! auth call, refreshes it once when the server answers 401, and normalizes
//! failures into [`ApiError`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use snaplink_api::{ApiClient, TokenProvider};
//!
//! let config = snaplink_config::load_config()?;
//! let tokens = Arc::new(TokenProvider::new(&config.api, config.credentials.clone())?);
//! let client = ApiClient::new(config.api.clone(), tokens)?;
//!
//! let created = client.shorten_url("https://example.com/a/long/path", None).await?;
//! ```

mod auth;
mod client;
mod error;

pub use auth::{AccessTokenProvider, AuthToken, TokenProvider, DEFAULT_EXPIRES_IN_SECS};
pub use client::{ApiClient, ShortenRequest};
pub use error::{ApiError, AuthError, Result};
pub use reqwest::Method;
