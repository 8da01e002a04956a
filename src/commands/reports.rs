use super::connect;
use crate::{Context, ui};
use anyhow::{Context as _, Result};
use opsman::{StemcellUpdates, StemcellsLoader, diagnostic_report};

/// Print available stemcell updates, as JSON when quiet
pub fn stemcell_updates(ctx: &Context) -> Result<()> {
    let client = connect(ctx)?;
    let updates = StemcellsLoader::new(&client)
        .updates()
        .context("Failed to detect stemcell updates")?;

    if ctx.quiet {
        println!("{}", serde_json::to_string(&updates)?);
    } else if updates.is_empty() {
        ui::success("All products use the latest available stemcells");
    } else {
        print!("{}", ui::table(&rows(&updates)));
    }
    Ok(())
}

/// Print the platform's diagnostic report
pub fn diagnostics(ctx: &Context) -> Result<()> {
    let client = connect(ctx)?;
    let report = diagnostic_report(&client).context("Failed to fetch the diagnostic report")?;
    println!("{report}");
    Ok(())
}

fn rows(updates: &StemcellUpdates) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["Stemcell".to_string(), "OS".to_string(), "Products".to_string()],
        vec!["--------".to_string(), "--".to_string(), "--------".to_string()],
    ];
    for update in &updates.stemcell_updates {
        let products = update
            .products
            .iter()
            .map(|p| p.slug.as_str())
            .collect::<Vec<_>>()
            .join(",");
        rows.push(vec![
            update.stemcell_version.clone(),
            update.stemcell_os.clone(),
            products,
        ]);
    }
    rows
}
