use super::connect;
use crate::cli::ProductsArgs;
use crate::ui::StdoutReporter;
use crate::Context;
use anyhow::{Context as _, Result};
use opsman::{ErrandsService, TilesLoader};
use reconcile::{ErrandReporter, ProductStatus, Tiles};

/// List errands of deployed products
pub fn run(ctx: &Context, args: &ProductsArgs) -> Result<()> {
    let client = connect(ctx)?;
    let deployed = TilesLoader::new(&client)
        .load(ProductStatus::Deployed, false)
        .context("Unable to fetch deployed products")?;
    let guids = select(&deployed, &args.slugs())?;

    let service = ErrandsService::new(&client);
    ErrandReporter::new(&service, &StdoutReporter).execute(&guids)?;
    Ok(())
}

/// GUIDs of the requested products, by slug or GUID; all when none requested
fn select(deployed: &Tiles, products: &[String]) -> Result<Vec<String>> {
    if products.is_empty() {
        return Ok(deployed.guids());
    }
    Ok(deployed
        .find_by_slugs_or_guids(products)?
        .into_iter()
        .map(|tile| tile.guid.clone())
        .collect())
}
