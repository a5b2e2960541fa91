// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local persistence for shortened URLs.
//!
//! Records live in a single JSON file. [`Shortener`] layers URL normalization,
//! short-code generation and expiry handling on top of a [`UrlStore`].

pub mod error;
pub mod model;
pub mod shortcode;
pub mod shortener;
pub mod store;

pub use error::{Result, StoreError};
pub use model::ShortenedUrlRecord;
pub use shortcode::{
	generate_short_code, normalize_url, validate_short_code, DEFAULT_SHORT_CODE_LENGTH,
	MAX_SHORT_CODE_LENGTH,
};
pub use shortener::Shortener;
pub use store::{LocalUrlStore, UrlStore};
