//! Resource selection - product slugs to GUIDs

use crate::context::Inventory;
use crate::error::{Error, Result};

/// Which products a workflow touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No filter: every product on the platform
    Fleet,
    /// Only these product GUIDs, in the order they were requested
    Products(Vec<String>),
}

impl Scope {
    /// GUIDs of a selective scope; empty for the whole fleet
    pub fn guids(&self) -> &[String] {
        match self {
            Self::Fleet => &[],
            Self::Products(guids) => guids,
        }
    }

    pub fn is_fleet(&self) -> bool {
        matches!(self, Self::Fleet)
    }

    /// Value for the `deploy_products` field of an apply request
    pub fn deploy_products(&self) -> String {
        match self {
            Self::Fleet => "all".to_string(),
            Self::Products(guids) => guids.join(","),
        }
    }
}

/// Resolve product slugs against the staged inventory
///
/// An empty slug list resolves to [`Scope::Fleet`] without touching the
/// inventory. Otherwise the staged products are listed once, without
/// metadata, and every slug must match; the first unknown slug aborts the
/// whole resolution.
pub fn resolve<I>(slugs: &[String], inventory: &I) -> Result<Scope>
where
    I: Inventory + ?Sized,
{
    if slugs.is_empty() {
        return Ok(Scope::Fleet);
    }

    let tiles = inventory
        .list_staged(false)
        .map_err(|e| Error::snapshot_load("staged products", &e))?;

    let mut guids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let tile = tiles.find_by_slug(slug)?;
        log::debug!("Resolved {} to {}", slug, tile.guid);
        guids.push(tile.guid.clone());
    }

    Ok(Scope::Products(guids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInventory;
    use crate::types::{Tile, Tiles};

    fn inventory() -> MockInventory {
        MockInventory::new(Tiles::new(vec![
            Tile::new("guid1", "product1"),
            Tile::new("guid2", "product2"),
        ]))
    }

    fn slugs(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_slugs_resolve_to_fleet() {
        let inventory = inventory();
        let scope = resolve(&[], &inventory).unwrap();

        assert_eq!(scope, Scope::Fleet);
        assert!(scope.guids().is_empty());
        assert_eq!(scope.deploy_products(), "all");
        assert!(inventory.calls().is_empty());
    }

    #[test]
    fn test_resolves_in_input_order() {
        let inventory = inventory();
        let scope = resolve(&slugs(&["product2", "product1"]), &inventory).unwrap();

        assert_eq!(scope.guids(), ["guid2", "guid1"]);
        assert_eq!(scope.deploy_products(), "guid2,guid1");
    }

    #[test]
    fn test_uses_staged_inventory_without_metadata() {
        let inventory = inventory();
        resolve(&slugs(&["product1"]), &inventory).unwrap();

        assert_eq!(inventory.calls(), vec![(crate::ProductStatus::Staged, false)]);
    }

    #[test]
    fn test_unknown_slug_fails_closed() {
        let inventory = inventory();
        let err = resolve(&slugs(&["product3", "product2"]), &inventory).unwrap_err();

        assert!(matches!(err, Error::ResourceNotFound { ref slug } if slug == "product3"));
    }

    #[test]
    fn test_inventory_failure_is_snapshot_load_error() {
        let inventory = MockInventory::failing("opsman unreachable");
        let err = resolve(&slugs(&["product1"]), &inventory).unwrap_err();

        assert!(matches!(err, Error::SnapshotLoad { .. }));
        assert!(err.to_string().contains("opsman unreachable"));
    }
}
