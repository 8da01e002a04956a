//! Core types for platform state snapshots

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Which side of the reconciliation a snapshot describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Pending configuration, not yet deployed
    Staged,
    /// Configuration currently running on the platform
    Deployed,
}

impl ProductStatus {
    /// Path segment used by the platform API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staged => "staged",
            Self::Deployed => "deployed",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An installed product (tile)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installation_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub guid: String,
    /// Product slug, e.g. "cf" or "p-bosh"
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub product_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product_version: String,
    #[serde(rename = "networks_and_azs", default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errands: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Map<String, Value>>,
}

impl Tile {
    /// Create a tile with just identity fields
    pub fn new(guid: impl Into<String>, product_type: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            product_type: product_type.into(),
            ..Self::default()
        }
    }
}

/// A product inventory, in the order the platform listed it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tiles {
    #[serde(rename = "tiles")]
    pub data: Vec<Tile>,
}

impl Tiles {
    pub fn new(data: Vec<Tile>) -> Self {
        Self { data }
    }

    /// Find a product by slug
    pub fn find_by_slug(&self, slug: &str) -> Result<&Tile> {
        self.data
            .iter()
            .find(|t| t.product_type == slug)
            .ok_or_else(|| Error::ResourceNotFound {
                slug: slug.to_string(),
            })
    }

    /// Find a product by GUID
    pub fn find_by_guid(&self, guid: &str) -> Result<&Tile> {
        self.data
            .iter()
            .find(|t| t.guid == guid)
            .ok_or_else(|| Error::ResourceNotFound {
                slug: guid.to_string(),
            })
    }

    /// Find products given either all slugs or all GUIDs
    ///
    /// The first identifier decides which kind the whole list is. A list
    /// mixing slugs and GUIDs is rejected.
    pub fn find_by_slugs_or_guids(&self, products: &[String]) -> anyhow::Result<Vec<&Tile>> {
        let Some(first) = products.first() else {
            return Ok(Vec::new());
        };

        let by_slug = if self.find_by_slug(first).is_ok() {
            true
        } else if self.find_by_guid(first).is_ok() {
            false
        } else {
            anyhow::bail!("product {first} is not found");
        };

        let mut tiles = Vec::with_capacity(products.len());
        for product in products {
            let (main, other) = if by_slug {
                (self.find_by_slug(product), self.find_by_guid(product))
            } else {
                (self.find_by_guid(product), self.find_by_slug(product))
            };
            match main {
                Ok(tile) => tiles.push(tile),
                Err(_) if other.is_ok() => {
                    anyhow::bail!("input contains a mix of GUIDs and names")
                }
                Err(_) => anyhow::bail!("product {product} is not found"),
            }
        }
        Ok(tiles)
    }

    /// GUIDs in inventory order
    pub fn guids(&self) -> Vec<String> {
        self.data.iter().map(|t| t.guid.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A deployment manifest for one product
///
/// Only the sections relevant to drift detection are kept. Absent sections
/// are omitted from the wire form so they never show up in a diff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stemcells: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_groups: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl Manifest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Every manifest of one product state plus the shared cloud config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifests {
    #[serde(rename = "manifests")]
    pub data: Vec<Manifest>,
    #[serde(default)]
    pub cloud_config: Value,
}

/// An errand with its per-lifecycle execution policies
///
/// Policies are `true`, `false`, a literal such as `"when-changed"` or
/// `"default"`, or absent when the errand does not run in that phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Errand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_deploy: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_delete: Option<Value>,
}

impl Errand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_post_deploy(mut self, policy: impl Into<Value>) -> Self {
        self.post_deploy = Some(policy.into());
        self
    }

    pub fn with_pre_delete(mut self, policy: impl Into<Value>) -> Self {
        self.pre_delete = Some(policy.into());
        self
    }
}
