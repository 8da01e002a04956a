use super::connect;
use crate::cli::{ApplyChangesArgs, ProductsArgs};
use crate::progress::SpinningTransport;
use crate::ui::{self, DialoguerConfirm, StdoutReporter};
use crate::Context;
use anyhow::Result;
use opsman::{ManifestsLoader, TilesLoader};
use reconcile::{ApplyChanges, ApplyOptions, ApplyOutcome};

/// Diff staged against deployed, confirm, then apply
pub fn run(ctx: &Context, args: &ApplyChangesArgs) -> Result<()> {
    let options = ApplyOptions {
        products: args.products.slugs(),
        non_interactive: args.non_interactive,
        dry_run: args.dry_run,
        quiet: ctx.quiet,
    };

    if !options.quiet {
        ui::info(&announcement(&options.products));
    }

    if let ApplyOutcome::DryRun { .. } = execute(ctx, &options)? {
        if !options.quiet {
            ui::dim("Dry run, nothing was applied");
        }
    }
    Ok(())
}

/// Report the pending diff only
pub fn diff(ctx: &Context, args: &ProductsArgs) -> Result<()> {
    let options = ApplyOptions {
        products: args.slugs(),
        dry_run: true,
        ..ApplyOptions::default()
    };
    execute(ctx, &options).map(|_| ())
}

fn announcement(products: &[String]) -> String {
    if products.is_empty() {
        "Applying changes to all products".to_string()
    } else {
        format!("Applying changes to these products: {}", products.join(","))
    }
}

fn execute(ctx: &Context, options: &ApplyOptions) -> Result<ApplyOutcome> {
    let client = connect(ctx)?;
    let tiles = TilesLoader::new(&client);
    let manifests = ManifestsLoader::new(&client);
    let transport = SpinningTransport::new(&client, "Applying changes...", !options.quiet);
    let reporter = StdoutReporter;

    let outcome = ApplyChanges::new(&tiles, &manifests, &transport, &reporter)
        .execute(options, &mut DialoguerConfirm)?;
    log::debug!("Apply changes finished: {outcome:?}");
    Ok(outcome)
}
