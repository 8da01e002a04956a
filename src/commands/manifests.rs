use super::connect;
use crate::Context;
use anyhow::{Context as _, Result};
use opsman::ManifestsLoader;
use reconcile::ProductStatus;

/// Print every manifest plus the cloud config as JSON
pub fn run(ctx: &Context, staged: bool) -> Result<()> {
    let status = if staged {
        ProductStatus::Staged
    } else {
        ProductStatus::Deployed
    };

    let client = connect(ctx)?;
    let manifests = ManifestsLoader::new(&client)
        .load_all_in(status)
        .with_context(|| format!("Failed to load {status} manifests"))?;

    println!("{}", serde_json::to_string_pretty(&manifests)?);
    Ok(())
}
