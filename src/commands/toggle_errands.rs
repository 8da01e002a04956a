use super::connect;
use crate::cli::ToggleErrandsArgs;
use crate::ui::{self, StdoutReporter};
use crate::Context;
use anyhow::{Context as _, Result};
use opsman::{ErrandsService, TilesLoader};
use reconcile::{ErrandTarget, ErrandToggler, Reporter, ToggleSummary};

/// Converge the post-deploy policy of every errand to the requested action
pub fn run(ctx: &Context, args: &ToggleErrandsArgs) -> Result<()> {
    let slugs = args.products.slugs();
    let reporter = StdoutReporter;
    reporter.print_report(&header(args, &slugs));

    let client = connect(ctx)?;
    let tiles = TilesLoader::new(&client);
    let service = ErrandsService::new(&client);
    let target = ErrandTarget::from(args.action);

    let scope = reconcile::resolve(&slugs, &tiles)?;
    let summary = ErrandToggler::new(&service, &reporter, target)
        .execute_scope(&scope, &tiles)
        .context("Failed to toggle errands")?;

    if !ctx.quiet {
        report_summary(&summary, target);
    }
    Ok(())
}

fn header(args: &ToggleErrandsArgs, slugs: &[String]) -> String {
    let products = if slugs.is_empty() {
        "all".to_string()
    } else {
        slugs.join(",")
    };
    format!(
        "Action: {}, Errand-Type: {}, Products: {}",
        args.action, args.errand_type, products
    )
}

fn report_summary(summary: &ToggleSummary, target: ErrandTarget) {
    if summary.changed == 0 && summary.unchanged == 0 {
        ui::warn("No errands to update");
    } else {
        ui::success(&format!(
            "{} errands set to {}, {} already {}",
            summary.changed, target, summary.unchanged, target
        ));
    }
}
