//! Deployment manifests and cloud config from the platform API.

use crate::client::Api;
use crate::error::Result;
use crate::tiles::{TilesLoader, get_json};
use reconcile::{Manifest, Manifests, ProductStatus, SnapshotLoader};
use serde::Deserialize;
use serde_json::Value;

/// Director product GUIDs start with this prefix.
const DIRECTOR_PREFIX: &str = "p-bosh";

#[derive(Deserialize)]
struct StagedManifest {
    #[serde(default)]
    manifest: Manifest,
}

#[derive(Deserialize)]
struct CloudConfig {
    #[serde(default)]
    cloud_config: Value,
}

/// Loads the manifests of every product in a state, or of selected products.
pub struct ManifestsLoader<'a, A: Api + ?Sized> {
    api: &'a A,
}

impl<'a, A: Api + ?Sized> ManifestsLoader<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Manifests of every product in `status`, in inventory order.
    pub fn load_all_in(&self, status: ProductStatus) -> Result<Manifests> {
        let guids = TilesLoader::new(self.api).load(status, false)?.guids();
        self.load_in(status, &guids)
    }

    /// Manifests of `guids` in `status`, in the given order.
    pub fn load_in(&self, status: ProductStatus, guids: &[String]) -> Result<Manifests> {
        let mut data = Vec::with_capacity(guids.len());
        for guid in guids {
            data.push(self.manifest(status, guid)?);
        }

        let cloud: CloudConfig = get_json(self.api, &format!("/api/v0/{status}/cloud_config"))?;
        Ok(Manifests {
            data,
            cloud_config: cloud.cloud_config,
        })
    }

    fn manifest(&self, status: ProductStatus, guid: &str) -> Result<Manifest> {
        let path = manifest_path(status, guid);
        match status {
            ProductStatus::Staged => {
                let staged: StagedManifest = get_json(self.api, &path)?;
                Ok(staged.manifest)
            }
            ProductStatus::Deployed => get_json(self.api, &path),
        }
    }
}

fn manifest_path(status: ProductStatus, guid: &str) -> String {
    if guid.starts_with(DIRECTOR_PREFIX) {
        format!("/api/v0/{status}/director/manifest")
    } else {
        format!("/api/v0/{status}/products/{guid}/manifest")
    }
}

impl<A: Api + ?Sized> SnapshotLoader for ManifestsLoader<'_, A> {
    fn load_all(&self, status: ProductStatus) -> anyhow::Result<Manifests> {
        Ok(self.load_all_in(status)?)
    }

    fn load(&self, status: ProductStatus, guids: &[String]) -> anyhow::Result<Manifests> {
        Ok(self.load_in(status, guids)?)
    }
}
