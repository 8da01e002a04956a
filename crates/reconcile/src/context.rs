//! Collaborator traits
//!
//! These traits let the reconciliation workflows run without depending on
//! a specific HTTP client, terminal UI or prompt implementation.

use crate::types::{Errand, Manifests, ProductStatus, Tiles};
use anyhow::Result;
use serde_json::Value;
use std::time::Duration;

/// Source of product inventories
pub trait Inventory {
    /// List staged products, optionally expanding per-product metadata
    fn list_staged(&self, include_metadata: bool) -> Result<Tiles>;

    /// List deployed products, optionally expanding per-product metadata
    fn list_deployed(&self, include_metadata: bool) -> Result<Tiles>;
}

/// Loader for configuration snapshots (manifests)
pub trait SnapshotLoader {
    /// Load manifests for every product in the given state
    fn load_all(&self, status: ProductStatus) -> Result<Manifests>;

    /// Load manifests for the given product GUIDs only
    fn load(&self, status: ProductStatus, guids: &[String]) -> Result<Manifests>;
}

/// State-changing requests against the platform
pub trait Transport {
    /// POST `body` to `path` and return the raw response payload
    fn post(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>>;
}

/// Errand listing and mutation for one product
pub trait ErrandService {
    /// List the errands of a product
    fn list(&self, product_guid: &str) -> Result<Vec<Errand>>;

    /// Set both lifecycle policies of one errand
    ///
    /// `pre_delete` of `None` leaves the errand without a pre-delete policy.
    fn set_state(
        &self,
        product_guid: &str,
        errand_name: &str,
        post_deploy: &Value,
        pre_delete: Option<&Value>,
    ) -> Result<()>;
}

/// Sink for human-readable report text
pub trait Reporter {
    /// Print a report; fire-and-forget
    fn print_report(&self, report: &str);
}

/// Confirmation callback for operator interaction
pub trait ConfirmCallback {
    /// Ask the operator to confirm an action
    ///
    /// # Returns
    /// `true` if the operator confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
