//! # Reconcile
//!
//! Declarative state reconciliation for a platform management appliance.
//!
//! This crate compares a desired state (staged configuration, a desired errand
//! policy) against an observed state (deployed configuration, current errand
//! settings) and applies only the deltas.
//!
//! ## Core Concepts
//!
//! - **Flattening**: any serializable value becomes a sorted list of
//!   `dotted.path=value` lines, independent of map key order
//! - **Line diff**: two flattened snapshots produce only `+`/`-` lines
//! - **Scope**: product slugs resolved to GUIDs, or the whole fleet
//! - **ApplyChanges**: diff, confirm, then a single apply request
//! - **ErrandToggler**: converge post-deploy errand policies per product
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//!
//! let before = json!({ "a": { "field": "value1" } });
//! let after = json!({ "a": { "field": "value2" } });
//!
//! let diff = reconcile::flat_diff(&before, &after).unwrap();
//! assert_eq!(diff, "-a.field=value1\n+a.field=value2\n");
//! ```
//!
//! ## Collaborator Traits
//!
//! The workflows never talk to the network directly. They take their
//! collaborators as parameters:
//!
//! - [`Inventory`]: lists staged and deployed products
//! - [`SnapshotLoader`]: loads manifests for a product state
//! - [`Transport`]: issues the apply request
//! - [`ErrandService`]: lists and mutates errand policies
//! - [`Reporter`]: receives human-readable report text
//! - [`ConfirmCallback`]: asks the operator before applying
//!
//! In-memory implementations for tests live in [`mock`].

pub mod apply;
pub mod context;
pub mod diff;
pub mod errands;
pub mod error;
pub mod flatten;
pub mod mock;
pub mod selector;
pub mod types;

pub use apply::{ApplyChanges, ApplyOptions, ApplyOutcome, INSTALLATIONS_PATH};
pub use context::{
    AutoConfirm, AutoDecline, ConfirmCallback, ErrandService, Inventory, Reporter,
    SnapshotLoader, Transport,
};
pub use diff::{flat_diff, DiffLine, LineDiff};
pub use errands::{ErrandReporter, ErrandState, ErrandTarget, ErrandToggler, ToggleSummary};
pub use error::{Error, Result};
pub use flatten::{flatten, flatten_lines};
pub use selector::{resolve, Scope};
pub use types::{Errand, Manifest, Manifests, ProductStatus, Tile, Tiles};
