//! In-memory collaborators for testing without a platform
//!
//! Every mock records the calls it receives so tests can assert on call
//! counts and arguments.
//!
//! ```
//! use reconcile::mock::{MockInventory, RecordingTransport};
//! use reconcile::{Tile, Tiles, Transport};
//! use std::time::Duration;
//!
//! let inventory = MockInventory::new(Tiles::new(vec![Tile::new("guid1", "product1")]));
//! assert!(inventory.calls().is_empty());
//!
//! let transport = RecordingTransport::new("{}");
//! transport.post("/api/v0/installations", "{}", Duration::ZERO).unwrap();
//! assert_eq!(transport.post_count(), 1);
//! ```

use crate::context::{ConfirmCallback, ErrandService, Inventory, Reporter, SnapshotLoader, Transport};
use crate::types::{Errand, Manifests, ProductStatus, Tiles};
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Inventory returning the same products for both states
#[derive(Debug, Default)]
pub struct MockInventory {
    tiles: Tiles,
    failure: Option<String>,
    calls: Mutex<Vec<(ProductStatus, bool)>>,
}

impl MockInventory {
    pub fn new(tiles: Tiles) -> Self {
        Self {
            tiles,
            ..Self::default()
        }
    }

    /// An inventory whose every listing fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every listing as `(state, include_metadata)`
    pub fn calls(&self) -> Vec<(ProductStatus, bool)> {
        lock(&self.calls).clone()
    }

    fn respond(&self, status: ProductStatus, include_metadata: bool) -> Result<Tiles> {
        lock(&self.calls).push((status, include_metadata));
        match &self.failure {
            Some(message) => anyhow::bail!("{message}"),
            None => Ok(self.tiles.clone()),
        }
    }
}

impl Inventory for MockInventory {
    fn list_staged(&self, include_metadata: bool) -> Result<Tiles> {
        self.respond(ProductStatus::Staged, include_metadata)
    }

    fn list_deployed(&self, include_metadata: bool) -> Result<Tiles> {
        self.respond(ProductStatus::Deployed, include_metadata)
    }
}

/// A manifest load as seen by [`MockSnapshotLoader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCall {
    All(ProductStatus),
    Selected(ProductStatus, Vec<String>),
}

/// Snapshot loader with fixed staged and deployed manifests
#[derive(Debug, Default)]
pub struct MockSnapshotLoader {
    staged: Manifests,
    deployed: Manifests,
    failure: Option<String>,
    calls: Mutex<Vec<LoadCall>>,
}

impl MockSnapshotLoader {
    pub fn new(deployed: Manifests, staged: Manifests) -> Self {
        Self {
            staged,
            deployed,
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<LoadCall> {
        lock(&self.calls).clone()
    }

    fn respond(&self, call: LoadCall) -> Result<Manifests> {
        let status = match &call {
            LoadCall::All(status) | LoadCall::Selected(status, _) => *status,
        };
        lock(&self.calls).push(call);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        Ok(match status {
            ProductStatus::Staged => self.staged.clone(),
            ProductStatus::Deployed => self.deployed.clone(),
        })
    }
}

impl SnapshotLoader for MockSnapshotLoader {
    fn load_all(&self, status: ProductStatus) -> Result<Manifests> {
        self.respond(LoadCall::All(status))
    }

    fn load(&self, status: ProductStatus, guids: &[String]) -> Result<Manifests> {
        self.respond(LoadCall::Selected(status, guids.to_vec()))
    }
}

/// A POST as seen by [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCall {
    pub path: String,
    pub body: String,
    pub timeout: Duration,
}

/// Transport that records posts and answers with a fixed payload
#[derive(Debug, Default)]
pub struct RecordingTransport {
    response: Vec<u8>,
    failure: Option<String>,
    posts: Mutex<Vec<PostCall>>,
}

impl RecordingTransport {
    pub fn new(response: impl Into<Vec<u8>>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn posts(&self) -> Vec<PostCall> {
        lock(&self.posts).clone()
    }

    pub fn post_count(&self) -> usize {
        lock(&self.posts).len()
    }
}

impl Transport for RecordingTransport {
    fn post(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>> {
        lock(&self.posts).push(PostCall {
            path: path.to_string(),
            body: body.to_string(),
            timeout,
        });
        match &self.failure {
            Some(message) => anyhow::bail!("{message}"),
            None => Ok(self.response.clone()),
        }
    }
}

/// A `set_state` call as seen by [`MockErrandService`]
#[derive(Debug, Clone, PartialEq)]
pub struct SetStateCall {
    pub product_guid: String,
    pub errand_name: String,
    pub post_deploy: Value,
    pub pre_delete: Option<Value>,
}

/// Errand service backed by a per-product errand table
#[derive(Debug, Default)]
pub struct MockErrandService {
    errands: HashMap<String, Vec<Errand>>,
    list_failure: Option<String>,
    set_state_failure: Option<String>,
    listed: Mutex<Vec<String>>,
    set_calls: Mutex<Vec<SetStateCall>>,
}

impl MockErrandService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the errands returned for a product
    pub fn with_errands(mut self, product_guid: impl Into<String>, errands: Vec<Errand>) -> Self {
        self.errands.insert(product_guid.into(), errands);
        self
    }

    pub fn failing_list(mut self, message: impl Into<String>) -> Self {
        self.list_failure = Some(message.into());
        self
    }

    pub fn failing_set_state(mut self, message: impl Into<String>) -> Self {
        self.set_state_failure = Some(message.into());
        self
    }

    /// Product GUIDs in the order they were listed
    pub fn listed(&self) -> Vec<String> {
        lock(&self.listed).clone()
    }

    pub fn set_calls(&self) -> Vec<SetStateCall> {
        lock(&self.set_calls).clone()
    }
}

impl ErrandService for MockErrandService {
    fn list(&self, product_guid: &str) -> Result<Vec<Errand>> {
        lock(&self.listed).push(product_guid.to_string());
        if let Some(message) = &self.list_failure {
            anyhow::bail!("{message}");
        }
        Ok(self.errands.get(product_guid).cloned().unwrap_or_default())
    }

    fn set_state(
        &self,
        product_guid: &str,
        errand_name: &str,
        post_deploy: &Value,
        pre_delete: Option<&Value>,
    ) -> Result<()> {
        lock(&self.set_calls).push(SetStateCall {
            product_guid: product_guid.to_string(),
            errand_name: errand_name.to_string(),
            post_deploy: post_deploy.clone(),
            pre_delete: pre_delete.cloned(),
        });
        match &self.set_state_failure {
            Some(message) => anyhow::bail!("{message}"),
            None => Ok(()),
        }
    }
}

/// Reporter that keeps every report in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        lock(&self.reports).clone()
    }

    /// All reports concatenated
    pub fn output(&self) -> String {
        lock(&self.reports).concat()
    }
}

impl Reporter for RecordingReporter {
    fn print_report(&self, report: &str) {
        lock(&self.reports).push(report.to_string());
    }
}

/// Confirmation with a fixed answer that remembers its prompts
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answer: bool,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl ConfirmCallback for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answer)
    }
}
