//! # opsman
//!
//! Blocking client for the platform management API, plus implementations of
//! the [`reconcile`] collaborator traits on top of it.
//!
//! ## Example
//!
//! ```no_run
//! use opsman::{Client, ClientConfig, Credentials, TilesLoader};
//! use reconcile::Inventory;
//!
//! let credentials = Credentials::from_parts(Some("admin"), Some("secret"), None, None)?;
//! let client = Client::new(ClientConfig::new("https://opsman.example.com", credentials));
//!
//! let tiles = TilesLoader::new(&client).list_deployed(false)?;
//! for tile in &tiles.data {
//!     println!("{} {}", tile.product_type, tile.guid);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Every loader is generic over [`Api`], so tests can substitute a fake.

pub mod client;
pub mod diagnostics;
pub mod errands;
pub mod error;
pub mod manifests;
pub mod sessions;
pub mod stemcells;
pub mod tiles;

#[cfg(test)]
mod fake;

pub use client::{Api, Client, ClientConfig, Credentials, DEFAULT_TIMEOUT, LONG_TIMEOUT, normalize_target};
pub use diagnostics::diagnostic_report;
pub use errands::ErrandsService;
pub use error::{Error, ErrorCategory, Result};
pub use manifests::ManifestsLoader;
pub use sessions::SessionManager;
pub use stemcells::{AffectedProduct, StemcellUpdate, StemcellUpdates, StemcellsLoader};
pub use tiles::TilesLoader;
