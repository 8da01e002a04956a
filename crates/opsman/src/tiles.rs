//! Product inventory from the platform API.

use crate::client::{Api, LONG_TIMEOUT};
use crate::error::{Error, Result};
use reconcile::{Inventory, ProductStatus, Tile, Tiles};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Loads staged or deployed products.
pub struct TilesLoader<'a, A: Api + ?Sized> {
    api: &'a A,
}

impl<'a, A: Api + ?Sized> TilesLoader<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// List products in the given state, in the order the platform returns them.
    pub fn load(&self, status: ProductStatus, include_metadata: bool) -> Result<Tiles> {
        let path = format!("/api/v0/{status}/products");
        let mut tiles: Vec<Tile> = get_json(self.api, &path)?;

        if include_metadata {
            for tile in &mut tiles {
                self.load_metadata(tile, status)?;
            }
        }

        log::debug!("Loaded {} {} products", tiles.len(), status);
        Ok(Tiles::new(tiles))
    }

    /// GUID of a deployed product.
    pub fn find_guid(&self, slug: &str) -> Result<String> {
        let tiles = self.load(ProductStatus::Deployed, false)?;
        tiles
            .find_by_slug(slug)
            .map(|tile| tile.guid.clone())
            .map_err(|_| Error::ProductNotFound(slug.to_string()))
    }

    fn load_metadata(&self, tile: &mut Tile, status: ProductStatus) -> Result<()> {
        let base = format!("/api/v0/{status}/products/{}", tile.guid);
        let section = |name: &str| -> Result<Map<String, Value>> {
            get_json(self.api, &format!("{base}/{name}"))
        };

        tile.networks = Some(section("networks_and_azs")?);
        tile.errands = Some(section("errands")?);
        tile.resources = Some(section("resources")?);
        tile.properties = Some(section("properties")?);
        Ok(())
    }
}

/// GET `path` with the long timeout and decode the JSON body.
pub(crate) fn get_json<A, T>(api: &A, path: &str) -> Result<T>
where
    A: Api + ?Sized,
    T: DeserializeOwned,
{
    let body = api.get(path, LONG_TIMEOUT)?;
    serde_json::from_slice(&body).map_err(|e| Error::decode(path, &e))
}

impl<A: Api + ?Sized> Inventory for TilesLoader<'_, A> {
    fn list_staged(&self, include_metadata: bool) -> anyhow::Result<Tiles> {
        Ok(self.load(ProductStatus::Staged, include_metadata)?)
    }

    fn list_deployed(&self, include_metadata: bool) -> anyhow::Result<Tiles> {
        Ok(self.load(ProductStatus::Deployed, include_metadata)?)
    }
}
