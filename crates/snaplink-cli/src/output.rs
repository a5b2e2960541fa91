// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt::Write;

use chrono::{DateTime, Utc};
use snaplink_store::ShortenedUrlRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_time(at: Option<DateTime<Utc>>) -> String {
	at.map(|t| t.format(TIME_FORMAT).to_string())
		.unwrap_or_else(|| "never".to_string())
}

fn truncate(s: &str, max: usize) -> String {
	if s.chars().count() > max {
		let head: String = s.chars().take(max.saturating_sub(3)).collect();
		format!("{head}...")
	} else {
		s.to_string()
	}
}

pub fn record_summary(record: &ShortenedUrlRecord) -> String {
	format!(
		"{} -> {} (expires {})",
		record.short_code,
		record.original_url,
		format_time(record.expires_at)
	)
}

pub fn record_table(records: &[ShortenedUrlRecord]) -> String {
	if records.is_empty() {
		return "No shortened URLs yet.\n".to_string();
	}

	let mut out = String::new();
	let _ = writeln!(
		out,
		"{:<12} {:<48} {:>6} {:<20}",
		"CODE", "ORIGINAL URL", "CLICKS", "EXPIRES"
	);
	let _ = writeln!(out, "{}", "-".repeat(89));
	for record in records {
		let _ = writeln!(
			out,
			"{:<12} {:<48} {:>6} {:<20}",
			record.short_code,
			truncate(&record.original_url, 48),
			record.clicks,
			format_time(record.expires_at)
		);
	}
	out
}
