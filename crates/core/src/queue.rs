//! FIFO queue of pending task ids
//!
//! Ids are handed out in dataset order, each to exactly one caller. Running
//! dry is a normal condition, reported as `None` rather than an error.

use std::collections::VecDeque;

use tokio::sync::Mutex;

/// Thread-safe FIFO queue of task ids
#[derive(Debug, Default)]
pub struct TaskQueue {
    ids: Mutex<VecDeque<String>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh roster, discarding whatever was queued
    pub async fn replace(&self, ids: Vec<String>) {
        *self.ids.lock().await = ids.into();
    }

    /// Take the next id; `None` once the queue has drained
    pub async fn pop(&self) -> Option<String> {
        self.ids.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }
}
