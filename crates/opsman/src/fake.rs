//! Canned-response [`Api`] for loader tests.

use crate::client::Api;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A request as seen by [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Answers GETs from a path table; every other method answers `{}`.
#[derive(Debug, Default)]
pub struct FakeApi {
    responses: HashMap<String, String>,
    failing: HashMap<String, u16>,
    requests: Mutex<Vec<Request>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(path.to_string(), body.to_string());
        self
    }

    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.failing.insert(path.to_string(), status);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&str>, timeout: Duration) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            body: body.map(str::to_string),
            timeout,
        });

        if let Some(status) = self.failing.get(path) {
            return Err(Error::Http {
                method: method.to_string(),
                path: path.to_string(),
                status: *status,
                body: "{\"errors\":[\"canned failure\"]}".to_string(),
            });
        }

        match (method, self.responses.get(path)) {
            (_, Some(body)) => Ok(body.clone().into_bytes()),
            ("GET", None) => Err(Error::Http {
                method: method.to_string(),
                path: path.to_string(),
                status: 404,
                body: String::new(),
            }),
            _ => Ok(b"{}".to_vec()),
        }
    }
}

impl Api for FakeApi {
    fn get(&self, path: &str, timeout: Duration) -> Result<Vec<u8>> {
        self.record("GET", path, None, timeout)
    }

    fn post(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>> {
        self.record("POST", path, Some(body), timeout)
    }

    fn put(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>> {
        self.record("PUT", path, Some(body), timeout)
    }

    fn delete(&self, path: &str, timeout: Duration) -> Result<()> {
        self.record("DELETE", path, None, timeout).map(|_| ())
    }
}
