// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::model::ShortenedUrlRecord;

#[async_trait]
pub trait UrlStore: Send + Sync {
	/// Every record, expired or not, in insertion order.
	async fn all(&self) -> Result<Vec<ShortenedUrlRecord>>;

	/// Unexpired records. Expired ones are removed from the store.
	async fn active(&self, now: DateTime<Utc>) -> Result<Vec<ShortenedUrlRecord>>;

	async fn get(&self, code: &str) -> Result<Option<ShortenedUrlRecord>>;

	/// Fails with [`StoreError::DuplicateCode`] if the code is taken.
	async fn insert(&self, record: ShortenedUrlRecord) -> Result<()>;

	/// Increments the click counter and returns the updated record.
	async fn record_click(&self, code: &str, at: DateTime<Utc>) -> Result<ShortenedUrlRecord>;

	async fn remove(&self, code: &str) -> Result<ShortenedUrlRecord>;
}

/// [`UrlStore`] persisted as a JSON array in a single file.
pub struct LocalUrlStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl LocalUrlStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	async fn read(&self) -> Result<Vec<ShortenedUrlRecord>> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "url store file not found");
			return Ok(Vec::new());
		}

		let contents = tokio::fs::read_to_string(&self.path).await?;
		if contents.trim().is_empty() {
			return Ok(Vec::new());
		}
		Ok(serde_json::from_str(&contents)?)
	}

	async fn write(&self, records: &[ShortenedUrlRecord]) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}

		let mut tmp_name = self.path.as_os_str().to_owned();
		tmp_name.push(".tmp");
		let tmp_path = PathBuf::from(tmp_name);

		let json = serde_json::to_string_pretty(records)?;
		tokio::fs::write(&tmp_path, &json).await?;
		tokio::fs::rename(&tmp_path, &self.path).await?;

		debug!(
			count = records.len(),
			path = %self.path.display(),
			"saved url store to disk"
		);
		Ok(())
	}
}

#[async_trait]
impl UrlStore for LocalUrlStore {
	async fn all(&self) -> Result<Vec<ShortenedUrlRecord>> {
		let _guard = self.lock.lock().await;
		self.read().await
	}

	async fn active(&self, now: DateTime<Utc>) -> Result<Vec<ShortenedUrlRecord>> {
		let _guard = self.lock.lock().await;
		let records = self.read().await?;
		let total = records.len();

		let (active, expired): (Vec<_>, Vec<_>) =
			records.into_iter().partition(|r| !r.is_expired_at(now));

		if !expired.is_empty() {
			self.write(&active).await?;
			info!(purged = expired.len(), remaining = active.len(), "purged expired urls");
		}

		debug!(total, active = active.len(), "listed urls");
		Ok(active)
	}

	async fn get(&self, code: &str) -> Result<Option<ShortenedUrlRecord>> {
		let _guard = self.lock.lock().await;
		Ok(self.read().await?.into_iter().find(|r| r.short_code == code))
	}

	async fn insert(&self, record: ShortenedUrlRecord) -> Result<()> {
		let _guard = self.lock.lock().await;
		let mut records = self.read().await?;

		if records.iter().any(|r| r.short_code == record.short_code) {
			return Err(StoreError::DuplicateCode(record.short_code));
		}

		info!(short_code = %record.short_code, "stored url");
		records.push(record);
		self.write(&records).await
	}

	async fn record_click(&self, code: &str, at: DateTime<Utc>) -> Result<ShortenedUrlRecord> {
		let _guard = self.lock.lock().await;
		let mut records = self.read().await?;

		let record = records
			.iter_mut()
			.find(|r| r.short_code == code)
			.ok_or_else(|| StoreError::NotFound(code.to_string()))?;
		record.record_click(at);
		let updated = record.clone();

		self.write(&records).await?;
		debug!(short_code = %code, clicks = updated.clicks, "recorded click");
		Ok(updated)
	}

	async fn remove(&self, code: &str) -> Result<ShortenedUrlRecord> {
		let _guard = self.lock.lock().await;
		let mut records = self.read().await?;

		let index = records
			.iter()
			.position(|r| r.short_code == code)
			.ok_or_else(|| StoreError::NotFound(code.to_string()))?;
		let removed = records.remove(index);

		self.write(&records).await?;
		info!(short_code = %code, "deleted url");
		Ok(removed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;
	use tempfile::TempDir;

	fn create_test_store() -> (LocalUrlStore, TempDir) {
		let tmp = TempDir::new().unwrap();
		let store = LocalUrlStore::new(tmp.path().join("nested").join("urls.json"));
		(store, tmp)
	}

	fn record(code: &str, expires_at: Option<DateTime<Utc>>) -> ShortenedUrlRecord {
		ShortenedUrlRecord::new("https://example.com", code, Utc::now(), expires_at)
	}

	#[tokio::test]
	async fn missing_file_is_empty() {
		let (store, _tmp) = create_test_store();
		assert!(store.all().await.unwrap().is_empty());
		assert!(store.get("nope").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn insert_and_get() {
		let (store, _tmp) = create_test_store();
		store.insert(record("abc", None)).await.unwrap();

		let loaded = store.get("abc").await.unwrap().unwrap();
		assert_eq!(loaded.original_url, "https://example.com");
		assert!(store.path().exists());
	}

	#[tokio::test]
	async fn duplicate_code_rejected() {
		let (store, _tmp) = create_test_store();
		store.insert(record("abc", None)).await.unwrap();

		let result = store.insert(record("abc", None)).await;
		assert!(matches!(result, Err(StoreError::DuplicateCode(code)) if code == "abc"));
		assert_eq!(store.all().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn active_purges_expired_records() {
		let (store, _tmp) = create_test_store();
		let now = Utc::now();
		store
			.insert(record("old", Some(now - Duration::minutes(1))))
			.await
			.unwrap();
		store
			.insert(record("new", Some(now + Duration::minutes(30))))
			.await
			.unwrap();
		store.insert(record("forever", None)).await.unwrap();

		let active = store.active(now).await.unwrap();
		let codes: Vec<_> = active.iter().map(|r| r.short_code.as_str()).collect();
		assert_eq!(codes, vec!["new", "forever"]);

		assert!(store.get("old").await.unwrap().is_none());
		assert_eq!(store.all().await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn record_click_persists() {
		let (store, _tmp) = create_test_store();
		store.insert(record("abc", None)).await.unwrap();

		let at = Utc::now();
		store.record_click("abc", at).await.unwrap();
		let updated = store.record_click("abc", at).await.unwrap();
		assert_eq!(updated.clicks, 2);

		let reopened = LocalUrlStore::new(store.path().to_path_buf());
		let loaded = reopened.get("abc").await.unwrap().unwrap();
		assert_eq!(loaded.clicks, 2);
		assert_eq!(loaded.last_clicked_at, Some(at));
	}

	#[tokio::test]
	async fn record_click_unknown_code() {
		let (store, _tmp) = create_test_store();
		let result = store.record_click("missing", Utc::now()).await;
		assert!(matches!(result, Err(StoreError::NotFound(_))));
	}

	#[tokio::test]
	async fn remove_record() {
		let (store, _tmp) = create_test_store();
		store.insert(record("abc", None)).await.unwrap();
		store.insert(record("def", None)).await.unwrap();

		let removed = store.remove("abc").await.unwrap();
		assert_eq!(removed.short_code, "abc");
		assert!(store.get("abc").await.unwrap().is_none());
		assert!(store.get("def").await.unwrap().is_some());

		assert!(matches!(
			store.remove("abc").await,
			Err(StoreError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn corrupt_file_is_a_serialization_error() {
		let (store, _tmp) = create_test_store();
		tokio::fs::create_dir_all(store.path().parent().unwrap())
			.await
			.unwrap();
		tokio::fs::write(store.path(), "{not json").await.unwrap();

		assert!(matches!(
			store.all().await,
			Err(StoreError::Serialization(_))
		));
	}

	#[tokio::test]
	async fn no_tmp_file_left_behind() {
		let (store, tmp) = create_test_store();
		store.insert(record("abc", None)).await.unwrap();

		let dir = tmp.path().join("nested");
		let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
		let mut names = Vec::new();
		while let Some(entry) = entries.next_entry().await.unwrap() {
			names.push(entry.file_name().to_string_lossy().into_owned());
		}
		assert_eq!(names, vec!["urls.json"]);
	}
}
