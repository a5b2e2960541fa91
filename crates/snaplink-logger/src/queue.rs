// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::VecDeque;

use crate::entry::LogEntry;

/// FIFO of pending entries.
#[derive(Debug, Default)]
pub struct LogQueue {
	entries: VecDeque<LogEntry>,
}

impl LogQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, entry: LogEntry) {
		self.entries.push_back(entry);
	}

	/// Removes up to `n` entries from the head.
	pub fn take_batch(&mut self, n: usize) -> Vec<LogEntry> {
		let n = n.min(self.entries.len());
		self.entries.drain(..n).collect()
	}

	/// Puts a batch back at the head, ahead of anything queued since.
	pub fn requeue_front(&mut self, batch: Vec<LogEntry>) {
		for entry in batch.into_iter().rev() {
			self.entries.push_front(entry);
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
		self.entries.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::LogLevel;
	use proptest::prelude::*;

	fn entry(message: &str) -> LogEntry {
		LogEntry::new(
			LogLevel::Info,
			"test",
			message,
			serde_json::Value::Null,
			"test",
			"0.0.0",
		)
	}

	fn messages(queue: &LogQueue) -> Vec<String> {
		queue.iter().map(|e| e.message.clone()).collect()
	}

	#[test]
	fn take_batch_pops_from_head() {
		let mut queue = LogQueue::new();
		for m in ["a", "b", "c"] {
			queue.push(entry(m));
		}

		let batch = queue.take_batch(2);
		assert_eq!(batch.len(), 2);
		assert_eq!(batch[0].message, "a");
		assert_eq!(batch[1].message, "b");
		assert_eq!(messages(&queue), vec!["c"]);
	}

	#[test]
	fn take_batch_larger_than_queue() {
		let mut queue = LogQueue::new();
		queue.push(entry("only"));
		assert_eq!(queue.take_batch(10).len(), 1);
		assert!(queue.is_empty());
		assert!(queue.take_batch(10).is_empty());
	}

	#[test]
	fn requeue_goes_ahead_of_newer_entries() {
		let mut queue = LogQueue::new();
		for m in ["a", "b", "c"] {
			queue.push(entry(m));
		}

		let batch = queue.take_batch(2);
		queue.push(entry("d"));
		queue.requeue_front(batch);

		assert_eq!(messages(&queue), vec!["a", "b", "c", "d"]);
	}

	proptest! {
		#[test]
		fn take_then_requeue_preserves_order(count in 0usize..40, batch in 1usize..15) {
			let mut queue = LogQueue::new();
			let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
			for m in &expected {
				queue.push(entry(m));
			}

			let taken = queue.take_batch(batch);
			prop_assert_eq!(taken.len(), batch.min(count));
			queue.requeue_front(taken);

			prop_assert_eq!(messages(&queue), expected);
		}
	}
}
