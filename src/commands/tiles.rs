use super::connect;
use crate::ui;
use crate::Context;
use anyhow::Result;
use opsman::TilesLoader;
use reconcile::{ProductStatus, Tiles};

/// List deployed tiles
pub fn list(ctx: &Context) -> Result<()> {
    let client = connect(ctx)?;
    let tiles = TilesLoader::new(&client).load(ProductStatus::Deployed, false)?;
    print!("{}", render(&tiles));
    Ok(())
}

/// Print the GUID of a deployed product
pub fn guid(ctx: &Context, slug: &str) -> Result<()> {
    let client = connect(ctx)?;
    println!("{}", TilesLoader::new(&client).find_guid(slug)?);
    Ok(())
}

fn render(tiles: &Tiles) -> String {
    if tiles.is_empty() {
        return "No tiles are installed\n".to_string();
    }

    let mut rows = vec![
        vec!["Name".to_string(), "GUID".to_string(), "Version".to_string()],
        vec!["----".to_string(), "----".to_string(), "-------".to_string()],
    ];
    rows.extend(tiles.data.iter().map(|tile| {
        vec![
            tile.product_type.clone(),
            tile.guid.clone(),
            tile.product_version.clone(),
        ]
    }));
    ui::table(&rows)
}
