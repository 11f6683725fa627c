//! In-memory transport used by unit tests

use crate::error::{RegistryError, Result};
use crate::registry::transport::{RawResponse, RegistryTransport};
use async_trait::async_trait;
use reqwest::Method;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Answers requests from a fixed route table; unknown routes get 404
#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<(String, String), RawResponse>,
    failures: HashSet<(String, String)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.with_headers(method, path, status, &[], body)
    }

    pub fn with_headers(
        mut self,
        method: &str,
        path: &str,
        status: u16,
        headers: &[(&'static str, &str)],
        body: &str,
    ) -> Self {
        let mut response = RawResponse::new(status, body.as_bytes().to_vec());
        for (name, value) in headers {
            response
                .headers
                .insert(*name, value.parse().expect("valid header value"));
        }
        self.routes
            .insert((method.to_string(), path.to_string()), response);
        self
    }

    /// Make `path` fail at the connection level
    pub fn fail(mut self, method: &str, path: &str) -> Self {
        self.failures.insert((method.to_string(), path.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RegistryTransport for ScriptedTransport {
    async fn request(&self, method: Method, path: &str) -> Result<RawResponse> {
        let key = (method.to_string(), path.to_string());
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{} {}", key.0, key.1));

        if self.failures.contains(&key) {
            return Err(RegistryError::Transport(format!("connection refused: {}", path)));
        }
        Ok(self
            .routes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| RawResponse::new(404, b"{}".to_vec())))
    }

    fn base_url(&self) -> &str {
        "scripted://registry"
    }
}
