//! Errand policy reconciliation
//!
//! Converges the post-deploy policy of every errand of a product to a
//! desired target, touching only the errands that differ. Pre-delete
//! policies are carried forward unchanged.

use crate::context::{ErrandService, Inventory, Reporter};
use crate::error::{Error, Result};
use crate::selector::Scope;
use crate::types::Errand;
use serde_json::Value;
use std::fmt;

const LABEL_ENABLED: &str = "enabled";
const LABEL_DISABLED: &str = "disabled";
const LABEL_DEFAULT: &str = "default";

const DIVIDER: &str = "---------------------------------\n";

/// Desired post-deploy policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrandTarget {
    Enable,
    #[default]
    Disable,
    Default,
}

impl ErrandTarget {
    /// Label the target is reported with and compared by
    pub fn label(&self) -> &'static str {
        match self {
            Self::Enable => LABEL_ENABLED,
            Self::Disable => LABEL_DISABLED,
            Self::Default => LABEL_DEFAULT,
        }
    }

    /// Wire value sent to the errand service
    pub fn policy_value(&self) -> Value {
        match self {
            Self::Enable => Value::Bool(true),
            Self::Disable => Value::Bool(false),
            Self::Default => Value::String(LABEL_DEFAULT.to_string()),
        }
    }
}

impl fmt::Display for ErrandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current post-deploy policy of an errand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrandState {
    Enabled,
    Disabled,
    /// Any string policy, e.g. "when-changed" or "default"
    Literal(String),
    /// The errand does not run in this phase and is never touched
    Unsupported,
}

impl ErrandState {
    /// Classify a wire policy value
    pub fn classify(policy: Option<&Value>) -> Self {
        match policy {
            Some(Value::Bool(true)) => Self::Enabled,
            Some(Value::Bool(false)) => Self::Disabled,
            Some(Value::String(s)) => Self::Literal(s.clone()),
            _ => Self::Unsupported,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Enabled => LABEL_ENABLED,
            Self::Disabled => LABEL_DISABLED,
            Self::Literal(s) => s,
            Self::Unsupported => "",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Whether reaching `target` needs a mutation
    pub fn differs_from(&self, target: ErrandTarget) -> bool {
        self.is_supported() && self.label() != target.label()
    }
}

impl fmt::Display for ErrandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts from a toggle run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleSummary {
    /// Errands mutated to the target
    pub changed: usize,
    /// Errands already at the target
    pub unchanged: usize,
}

impl ToggleSummary {
    pub fn merge(&mut self, other: &ToggleSummary) {
        self.changed += other.changed;
        self.unchanged += other.unchanged;
    }
}

/// Product GUIDs a scope covers, falling back to the deployed inventory
fn scope_guids<I>(scope: &Scope, inventory: &I) -> Result<Vec<String>>
where
    I: Inventory + ?Sized,
{
    match scope {
        Scope::Products(guids) => Ok(guids.clone()),
        Scope::Fleet => inventory
            .list_deployed(false)
            .map(|tiles| tiles.guids())
            .map_err(|e| Error::snapshot_load("deployed products", &e)),
    }
}

/// The errand toggle workflow
pub struct ErrandToggler<'a> {
    service: &'a dyn ErrandService,
    reporter: &'a dyn Reporter,
    target: ErrandTarget,
}

impl<'a> ErrandToggler<'a> {
    pub fn new(service: &'a dyn ErrandService, reporter: &'a dyn Reporter, target: ErrandTarget) -> Self {
        Self {
            service,
            reporter,
            target,
        }
    }

    /// Reconcile every product of a scope, one at a time in order
    pub fn execute_scope<I>(&self, scope: &Scope, inventory: &I) -> Result<ToggleSummary>
    where
        I: Inventory + ?Sized,
    {
        let guids = scope_guids(scope, inventory)?;
        self.execute(&guids)
    }

    /// Reconcile the given products in order
    ///
    /// The first failure stops the run. Products already processed keep
    /// their new policies.
    pub fn execute(&self, product_guids: &[String]) -> Result<ToggleSummary> {
        let mut summary = ToggleSummary::default();
        for guid in product_guids {
            summary.merge(&self.reconcile_product(guid)?);
        }
        Ok(summary)
    }

    fn reconcile_product(&self, guid: &str) -> Result<ToggleSummary> {
        let errands = self
            .service
            .list(guid)
            .map_err(|e| Error::snapshot_load(format!("errands for {guid}"), &e))?;

        self.reporter.print_report(&format!("Errands for {guid}\n"));

        let mut summary = ToggleSummary::default();
        for errand in &errands {
            let current = ErrandState::classify(errand.post_deploy.as_ref());
            if !current.is_supported() {
                continue;
            }

            if current.differs_from(self.target) {
                self.reporter
                    .print_report(&format!("{}\t{} => {}\n", errand.name, current, self.target));
                self.update(guid, errand)?;
                summary.changed += 1;
            } else {
                summary.unchanged += 1;
                self.reporter
                    .print_report(&format!("{}\t{}\n", errand.name, current));
            }
        }
        Ok(summary)
    }

    fn update(&self, guid: &str, errand: &Errand) -> Result<()> {
        log::debug!("Updating {} of {} to {}", errand.name, guid, self.target);
        self.service
            .set_state(
                guid,
                &errand.name,
                &self.target.policy_value(),
                errand.pre_delete.as_ref(),
            )
            .map_err(|e| Error::transport(format!("updating errand {} of {guid}", errand.name), &e))
    }
}

/// Read-only errand listing
pub struct ErrandReporter<'a> {
    service: &'a dyn ErrandService,
    reporter: &'a dyn Reporter,
}

impl<'a> ErrandReporter<'a> {
    pub fn new(service: &'a dyn ErrandService, reporter: &'a dyn Reporter) -> Self {
        Self { service, reporter }
    }

    pub fn execute(&self, product_guids: &[String]) -> Result<()> {
        for guid in product_guids {
            self.reporter
                .print_report(&format!("Listing errands for product: {guid}\n{DIVIDER}"));

            let errands = self
                .service
                .list(guid)
                .map_err(|e| Error::snapshot_load(format!("errands for {guid}"), &e))?;

            if errands.is_empty() {
                self.reporter.print_report("No errands defined");
            }
            for errand in &errands {
                self.reporter.print_report(&format_errand(errand));
            }
            self.reporter.print_report(DIVIDER);
        }
        Ok(())
    }
}

fn format_errand(errand: &Errand) -> String {
    format!(
        "Errand name: {}; Post-deploy enabled: {}; Pre-delete enabled: {}\n",
        errand.name,
        policy_text(errand.post_deploy.as_ref()),
        policy_text(errand.pre_delete.as_ref())
    )
}

fn policy_text(policy: Option<&Value>) -> String {
    match ErrandState::classify(policy) {
        ErrandState::Enabled => "yes".to_string(),
        ErrandState::Disabled => "no".to_string(),
        ErrandState::Literal(s) => s,
        ErrandState::Unsupported => LABEL_DEFAULT.to_string(),
    }
}
