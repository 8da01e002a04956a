//! Apply changes - diff staged against deployed, confirm, then apply

use crate::context::{ConfirmCallback, Inventory, Reporter, SnapshotLoader, Transport};
use crate::diff::LineDiff;
use crate::error::{Error, Result};
use crate::selector::{resolve, Scope};
use crate::types::ProductStatus;
use serde::Serialize;
use std::time::Duration;

/// Endpoint that starts an installation
pub const INSTALLATIONS_PATH: &str = "/api/v0/installations";

/// Platform-side installs are slow to acknowledge
pub const APPLY_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const CONFIRM_PROMPT: &str = "Do you wish to continue?";
const NO_PENDING_CHANGES: &str = "Warning: Opsman has detected no pending changes";

/// Options for an apply-changes run
///
/// The flags combine into the run mode: the default is interactive,
/// `non_interactive` skips the prompt, `dry_run` stops after the diff and
/// `quiet` skips the diff and reports only the raw response.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Product slugs to scope the run to; empty means every product
    pub products: Vec<String>,
    pub non_interactive: bool,
    pub dry_run: bool,
    pub quiet: bool,
}

/// How an apply-changes run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The apply request was accepted; carries the raw response payload
    Applied { response: String },
    /// Dry run: the diff was reported and nothing was applied
    DryRun { diff: String },
    /// The operator declined; nothing was applied
    Cancelled,
}

#[derive(Serialize)]
struct InstallationRequest<'a> {
    ignore_warnings: bool,
    deploy_products: &'a str,
}

/// Body of the apply request for a scope
pub fn installation_body(scope: &Scope) -> Result<String> {
    let deploy_products = scope.deploy_products();
    let request = InstallationRequest {
        ignore_warnings: true,
        deploy_products: &deploy_products,
    };
    Ok(serde_json::to_string_pretty(&request)?)
}

/// The apply-changes workflow
pub struct ApplyChanges<'a> {
    inventory: &'a dyn Inventory,
    loader: &'a dyn SnapshotLoader,
    transport: &'a dyn Transport,
    reporter: &'a dyn Reporter,
}

impl<'a> ApplyChanges<'a> {
    pub fn new(
        inventory: &'a dyn Inventory,
        loader: &'a dyn SnapshotLoader,
        transport: &'a dyn Transport,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            inventory,
            loader,
            transport,
            reporter,
        }
    }

    /// Run the workflow
    ///
    /// Any error aborts immediately. Nothing is retried: an apply that
    /// completed platform-side must not be issued twice.
    pub fn execute<C>(&self, options: &ApplyOptions, confirm: &mut C) -> Result<ApplyOutcome>
    where
        C: ConfirmCallback + ?Sized,
    {
        let scope = resolve(&options.products, self.inventory)?;

        let mut diff_text = String::new();
        if !options.quiet {
            let diff = self.diff(&scope)?;
            diff_text = diff.to_string();
            if diff.is_empty() {
                // Stemcell or template updates never show up in manifests,
                // so an empty diff does not mean there is nothing to apply.
                self.reporter.print_report(NO_PENDING_CHANGES);
            } else {
                self.reporter.print_report(&diff_text);
            }
        }

        if options.dry_run {
            log::info!("Dry run, not applying changes");
            return Ok(ApplyOutcome::DryRun { diff: diff_text });
        }

        if options.non_interactive {
            log::info!("Non-interactive, skipping confirmation");
        } else {
            let proceed = match confirm.confirm(CONFIRM_PROMPT) {
                Ok(answer) => answer,
                Err(e) => {
                    log::warn!("Confirmation failed: {e:#}");
                    false
                }
            };
            if !proceed {
                self.reporter.print_report("Cancelled apply changes");
                return Ok(ApplyOutcome::Cancelled);
            }
            if !options.quiet {
                self.reporter.print_report("Applying changes");
            }
        }

        self.apply(&scope, options.quiet)
    }

    /// Load deployed and staged manifests for a scope and diff them
    pub fn diff(&self, scope: &Scope) -> Result<LineDiff> {
        let deployed = self.load(ProductStatus::Deployed, scope)?;
        let staged = self.load(ProductStatus::Staged, scope)?;

        let diff = LineDiff::compute(&deployed, &staged)?;
        log::debug!(
            "Manifest diff: {} additions, {} removals",
            diff.additions(),
            diff.removals()
        );
        Ok(diff)
    }

    fn load(&self, status: ProductStatus, scope: &Scope) -> Result<crate::Manifests> {
        let loaded = match scope {
            Scope::Fleet => self.loader.load_all(status),
            Scope::Products(guids) => self.loader.load(status, guids),
        };
        loaded.map_err(|e| Error::snapshot_load(format!("{status} manifests"), &e))
    }

    fn apply(&self, scope: &Scope, quiet: bool) -> Result<ApplyOutcome> {
        let body = installation_body(scope)?;
        log::debug!("Applying changes to {}", scope.deploy_products());

        let response = self
            .transport
            .post(INSTALLATIONS_PATH, &body, APPLY_TIMEOUT)
            .map_err(|e| Error::transport("apply changes", &e))?;
        let response = String::from_utf8_lossy(&response).into_owned();

        if quiet {
            self.reporter.print_report(&response);
        } else {
            self.reporter
                .print_report(&format!("Successfully applied changes: {response}\n"));
        }

        Ok(ApplyOutcome::Applied { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline};
    use crate::mock::{
        LoadCall, MockInventory, MockSnapshotLoader, RecordingReporter, RecordingTransport,
        ScriptedConfirm,
    };
    use crate::types::{Manifest, Manifests, Tile, Tiles};
    use serde_json::Value;

    struct Fixture {
        inventory: MockInventory,
        loader: MockSnapshotLoader,
        transport: RecordingTransport,
        reporter: RecordingReporter,
    }

    impl Fixture {
        fn new(deployed: &str, staged: &str) -> Self {
            Self {
                inventory: MockInventory::new(Tiles::new(vec![
                    Tile::new("guid1", "product1"),
                    Tile::new("guid2", "product2"),
                ])),
                loader: MockSnapshotLoader::new(manifests(deployed), manifests(staged)),
                transport: RecordingTransport::new(r#"{"install":{"id":42}}"#),
                reporter: RecordingReporter::new(),
            }
        }

        fn workflow(&self) -> ApplyChanges<'_> {
            ApplyChanges::new(&self.inventory, &self.loader, &self.transport, &self.reporter)
        }

        fn posted_body(&self) -> Value {
            let posts = self.transport.posts();
            serde_json::from_str(&posts[0].body).unwrap()
        }
    }

    fn manifests(name: &str) -> Manifests {
        Manifests {
            data: vec![Manifest::named(name)],
            ..Manifests::default()
        }
    }

    fn options(products: &[&str]) -> ApplyOptions {
        ApplyOptions {
            products: products.iter().map(ToString::to_string).collect(),
            ..ApplyOptions::default()
        }
    }

    #[test]
    fn test_applies_all_products_by_default() {
        let fx = Fixture::new("deployed", "staged");
        let outcome = fx.workflow().execute(&options(&[]), &mut AutoConfirm).unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                response: r#"{"install":{"id":42}}"#.to_string()
            }
        );
        let posts = fx.transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "/api/v0/installations");
        assert_eq!(posts[0].timeout, APPLY_TIMEOUT);
        assert_eq!(
            fx.posted_body(),
            serde_json::json!({ "ignore_warnings": true, "deploy_products": "all" })
        );
        assert_eq!(
            fx.loader.calls(),
            vec![
                LoadCall::All(ProductStatus::Deployed),
                LoadCall::All(ProductStatus::Staged)
            ]
        );
    }

    #[test]
    fn test_scoped_apply_posts_resolved_guids() {
        let fx = Fixture::new("deployed", "staged");
        fx.workflow()
            .execute(&options(&["product1", "product2"]), &mut AutoConfirm)
            .unwrap();

        assert_eq!(fx.transport.post_count(), 1);
        assert_eq!(fx.posted_body()["deploy_products"], "guid1,guid2");
        assert!(fx.transport.posts()[0]
            .body
            .contains(r#""deploy_products": "guid1,guid2""#));

        let guids = vec!["guid1".to_string(), "guid2".to_string()];
        assert_eq!(
            fx.loader.calls(),
            vec![
                LoadCall::Selected(ProductStatus::Deployed, guids.clone()),
                LoadCall::Selected(ProductStatus::Staged, guids)
            ]
        );
    }

    #[test]
    fn test_unresolvable_slug_aborts_before_anything() {
        let fx = Fixture::new("deployed", "staged");
        let err = fx
            .workflow()
            .execute(&options(&["product3", "product2"]), &mut AutoConfirm)
            .unwrap_err();

        assert!(matches!(err, Error::ResourceNotFound { ref slug } if slug == "product3"));
        assert_eq!(fx.transport.post_count(), 0);
        assert!(fx.loader.calls().is_empty());
        assert!(fx.reporter.reports().is_empty());
    }

    #[test]
    fn test_reports_manifest_diff() {
        let fx = Fixture::new("deployed", "staged");
        fx.workflow().execute(&options(&[]), &mut AutoConfirm).unwrap();

        assert_eq!(
            fx.reporter.reports()[0],
            "-manifests.deployed.name=deployed\n+manifests.staged.name=staged\n"
        );
    }

    #[test]
    fn test_dry_run_reports_diff_without_posting() {
        let fx = Fixture::new("deployed", "staged");
        let opts = ApplyOptions {
            dry_run: true,
            ..options(&[])
        };
        let mut confirm = ScriptedConfirm::answering(true);
        let outcome = fx.workflow().execute(&opts, &mut confirm).unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::DryRun {
                diff: "-manifests.deployed.name=deployed\n+manifests.staged.name=staged\n"
                    .to_string()
            }
        );
        assert_eq!(fx.transport.post_count(), 0);
        assert!(confirm.prompts.is_empty());
    }

    #[test]
    fn test_empty_diff_warns_but_still_applies() {
        let fx = Fixture::new("same", "same");
        fx.workflow().execute(&options(&[]), &mut AutoConfirm).unwrap();

        assert_eq!(fx.reporter.reports()[0], NO_PENDING_CHANGES);
        assert_eq!(fx.transport.post_count(), 1);
    }

    #[test]
    fn test_declined_confirmation_cancels() {
        let fx = Fixture::new("deployed", "staged");
        let outcome = fx.workflow().execute(&options(&[]), &mut AutoDecline).unwrap();

        assert_eq!(outcome, ApplyOutcome::Cancelled);
        assert_eq!(fx.transport.post_count(), 0);
        assert!(fx.reporter.output().contains("Cancelled apply changes"));
    }

    #[test]
    fn test_non_interactive_skips_prompt() {
        let fx = Fixture::new("deployed", "staged");
        let opts = ApplyOptions {
            non_interactive: true,
            ..options(&[])
        };
        let mut confirm = ScriptedConfirm::answering(false);
        let outcome = fx.workflow().execute(&opts, &mut confirm).unwrap();

        assert!(matches!(outcome, ApplyOutcome::Applied { .. }));
        assert!(confirm.prompts.is_empty());
        assert_eq!(fx.transport.post_count(), 1);
        assert!(fx
            .reporter
            .output()
            .contains(r#"Successfully applied changes: {"install":{"id":42}}"#));
    }

    #[test]
    fn test_quiet_skips_diff_and_reports_raw_response() {
        let fx = Fixture::new("deployed", "staged");
        let opts = ApplyOptions {
            quiet: true,
            non_interactive: true,
            ..options(&[])
        };
        fx.workflow().execute(&opts, &mut AutoConfirm).unwrap();

        assert!(fx.loader.calls().is_empty());
        assert_eq!(fx.reporter.reports(), vec![r#"{"install":{"id":42}}"#]);
    }

    #[test]
    fn test_snapshot_failure_aborts_without_posting() {
        let mut fx = Fixture::new("deployed", "staged");
        fx.loader = MockSnapshotLoader::failing("manifest endpoint returned 500");
        let err = fx
            .workflow()
            .execute(&options(&[]), &mut AutoConfirm)
            .unwrap_err();

        assert!(matches!(err, Error::SnapshotLoad { .. }));
        assert!(err.to_string().contains("deployed manifests"));
        assert_eq!(fx.transport.post_count(), 0);
    }

    #[test]
    fn test_transport_failure_is_not_retried() {
        let mut fx = Fixture::new("deployed", "staged");
        fx.transport = RecordingTransport::failing("502 Bad Gateway");
        let err = fx
            .workflow()
            .execute(&options(&[]), &mut AutoConfirm)
            .unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
        assert_eq!(fx.transport.post_count(), 1);
    }

    #[test]
    fn test_installation_body_template() {
        let body = installation_body(&Scope::Products(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(
            body,
            "{\n  \"ignore_warnings\": true,\n  \"deploy_products\": \"a,b\"\n}"
        );
    }
}
