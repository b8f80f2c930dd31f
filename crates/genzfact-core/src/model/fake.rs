//! In-memory model client for tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::ModelClient;
use crate::error::{GenzError, GenzResult};
use crate::request::Part;

/// One recorded call.
#[derive(Debug, Clone)]
pub struct FakeCall {
    pub system_instruction: String,
    pub parts: Vec<Part>,
}

/// Replies with a canned text (or error message) and records every call.
pub struct FakeModel {
    reply: Result<String, String>,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn generate(&self, system_instruction: &str, parts: &[Part]) -> GenzResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(FakeCall {
                system_instruction: system_instruction.to_string(),
                parts: parts.to_vec(),
            });
        }
        self.reply.clone().map_err(GenzError::Model)
    }

    fn name(&self) -> &str {
        "fake"
    }
}
