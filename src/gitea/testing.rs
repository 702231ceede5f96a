//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;

use super::transport::{ApiRequest, GiteaTransport};

/// Records every request and answers from a queue, then from a fixed response.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    queued: Mutex<VecDeque<Result<Value, String>>>,
    fallback: Mutex<Value>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response for every request not answered by the queue.
    pub fn respond_with(&self, value: Value) {
        *self.fallback.lock().unwrap() = value;
    }

    /// Answer the next unanswered request with `value`.
    pub fn push_response(&self, value: Value) {
        self.queued.lock().unwrap().push_back(Ok(value));
    }

    /// Fail the next unanswered request with `message`.
    pub fn fail_next(&self, message: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GiteaTransport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        match self.queued.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }
}
