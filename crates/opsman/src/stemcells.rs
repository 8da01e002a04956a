//! Available stemcell updates.
//!
//! The platform keeps its own product-network token and knows which newer
//! stemcells apply to which products. These never show up in manifest diffs.

use crate::client::Api;
use crate::error::Result;
use crate::tiles::get_json;
use serde::{Deserialize, Serialize};

const UPDATES_PATH: &str = "/api/v0/pivotal_network/stemcell_updates";
const ASSIGNMENTS_PATH: &str = "/api/v0/stemcell_assignments";

const UNDEFINED_OS: &str = "undefined_requiredstemcellos";
const UNDEFINED_SLUG: &str = "undefined_identifier";

#[derive(Debug, Default, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    stemcell_updates: Vec<UpdateEntry>,
}

#[derive(Debug, Deserialize)]
struct UpdateEntry {
    stemcell_version: String,
    #[serde(default)]
    release_id: i64,
    #[serde(default)]
    products: Vec<ProductRef>,
}

#[derive(Debug, Deserialize)]
struct ProductRef {
    product_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct AssignmentsResponse {
    #[serde(default)]
    products: Vec<Assignment>,
}

#[derive(Debug, Deserialize)]
struct Assignment {
    guid: String,
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    required_stemcell_os: String,
}

impl AssignmentsResponse {
    fn find(&self, guid: &str) -> Option<&Assignment> {
        self.products.iter().find(|p| p.guid == guid)
    }

    fn stemcell_os(&self, guid: &str) -> String {
        self.find(guid)
            .map_or_else(|| UNDEFINED_OS.to_string(), |p| p.required_stemcell_os.clone())
    }

    fn slug(&self, guid: &str) -> String {
        self.find(guid)
            .map_or_else(|| UNDEFINED_SLUG.to_string(), |p| p.identifier.clone())
    }
}

/// A product that would pick up a newer stemcell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedProduct {
    pub guid: String,
    pub slug: String,
}

/// A newer stemcell version and the products it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StemcellUpdate {
    pub stemcell_version: String,
    pub stemcell_os: String,
    pub release_id: i64,
    pub products: Vec<AffectedProduct>,
}

/// Report of every available stemcell update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StemcellUpdates {
    pub stemcell_updates: Vec<StemcellUpdate>,
}

impl StemcellUpdates {
    pub fn is_empty(&self) -> bool {
        self.stemcell_updates.is_empty()
    }
}

/// Detects stemcell versions the platform could roll out.
pub struct StemcellsLoader<'a, A: Api + ?Sized> {
    api: &'a A,
}

impl<'a, A: Api + ?Sized> StemcellsLoader<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Available updates joined with the current stemcell assignments.
    ///
    /// Assignments are only fetched when there is at least one update.
    pub fn updates(&self) -> Result<StemcellUpdates> {
        let updates: UpdatesResponse = get_json(self.api, UPDATES_PATH)?;
        if updates.stemcell_updates.is_empty() {
            log::debug!("No stemcell updates available");
            return Ok(StemcellUpdates::default());
        }

        let assignments: AssignmentsResponse = get_json(self.api, ASSIGNMENTS_PATH)?;
        let stemcell_updates = updates
            .stemcell_updates
            .into_iter()
            .map(|entry| join(entry, &assignments))
            .collect::<Vec<_>>();

        log::debug!("Found {} stemcell updates", stemcell_updates.len());
        Ok(StemcellUpdates { stemcell_updates })
    }
}

fn join(entry: UpdateEntry, assignments: &AssignmentsResponse) -> StemcellUpdate {
    // Every product of one update shares the stemcell line, so the first decides the OS.
    let stemcell_os = entry
        .products
        .first()
        .map_or_else(|| UNDEFINED_OS.to_string(), |p| assignments.stemcell_os(&p.product_id));

    let products = entry
        .products
        .iter()
        .map(|p| AffectedProduct {
            guid: p.product_id.clone(),
            slug: assignments.slug(&p.product_id),
        })
        .collect();

    StemcellUpdate {
        stemcell_version: entry.stemcell_version,
        stemcell_os,
        release_id: entry.release_id,
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LONG_TIMEOUT;
    use crate::error::Error;
    use crate::fake::FakeApi;
    use serde_json::json;

    const UPDATES: &str = r#"{
        "stemcell_updates": [
            {"stemcell_version": "3468.46", "release_id": 106153,
             "products": [{"product_id": "p-redis-a4de"}]},
            {"stemcell_version": "170.15", "release_id": 106151,
             "products": [{"product_id": "cf-97c6"}, {"product_id": "p-mystery-1"}]}
        ]
    }"#;

    const ASSIGNMENTS: &str = r#"{
        "products": [
            {"guid": "p-bosh-7d6f", "identifier": "p-bosh", "required_stemcell_os": "ubuntu-trusty"},
            {"guid": "p-redis-a4de", "identifier": "p-redis", "required_stemcell_os": "ubuntu-trusty"},
            {"guid": "p-healthwatch-a4de", "identifier": "p-healthwatch", "required_stemcell_os": "ubuntu-trusty"},
            {"guid": "cf-97c6", "identifier": "cf", "required_stemcell_os": "ubuntu-xenial"}
        ]
    }"#;

    fn api() -> FakeApi {
        FakeApi::new()
            .respond(UPDATES_PATH, UPDATES)
            .respond(ASSIGNMENTS_PATH, ASSIGNMENTS)
    }

    #[test]
    fn test_updates_joined_with_assignments() {
        let api = api();
        let report = StemcellsLoader::new(&api).updates().unwrap();

        assert_eq!(report.stemcell_updates.len(), 2);

        let redis = &report.stemcell_updates[0];
        assert_eq!(redis.stemcell_version, "3468.46");
        assert_eq!(redis.stemcell_os, "ubuntu-trusty");
        assert_eq!(redis.release_id, 106_153);
        assert_eq!(
            redis.products,
            vec![AffectedProduct {
                guid: "p-redis-a4de".to_string(),
                slug: "p-redis".to_string(),
            }]
        );

        let cf = &report.stemcell_updates[1];
        assert_eq!(cf.stemcell_os, "ubuntu-xenial");
        assert_eq!(cf.products[0].slug, "cf");
        assert_eq!(cf.products[1].slug, UNDEFINED_SLUG);
    }

    #[test]
    fn test_report_wire_shape() {
        let api = api();
        let report = StemcellsLoader::new(&api).updates().unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value["stemcell_updates"][0],
            json!({
                "stemcell_version": "3468.46",
                "stemcell_os": "ubuntu-trusty",
                "release_id": 106_153,
                "products": [{"guid": "p-redis-a4de", "slug": "p-redis"}]
            })
        );
    }

    #[test]
    fn test_requests_use_long_timeout() {
        let api = api();
        StemcellsLoader::new(&api).updates().unwrap();

        assert_eq!(api.paths(), vec![UPDATES_PATH, ASSIGNMENTS_PATH]);
        assert!(api.requests().iter().all(|r| r.method == "GET" && r.timeout == LONG_TIMEOUT));
    }

    #[test]
    fn test_no_updates_skips_assignments() {
        let api = FakeApi::new().respond(UPDATES_PATH, r#"{"stemcell_updates": []}"#);
        let report = StemcellsLoader::new(&api).updates().unwrap();

        assert!(report.is_empty());
        assert_eq!(api.paths(), vec![UPDATES_PATH]);
        assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"stemcell_updates":[]}"#);
    }

    #[test]
    fn test_unknown_product_os_is_undefined() {
        let api = FakeApi::new()
            .respond(
                UPDATES_PATH,
                r#"{"stemcell_updates": [{"stemcell_version": "1.2", "products": [{"product_id": "gone-1"}]}]}"#,
            )
            .respond(ASSIGNMENTS_PATH, r#"{"products": []}"#);
        let report = StemcellsLoader::new(&api).updates().unwrap();

        assert_eq!(report.stemcell_updates[0].stemcell_os, UNDEFINED_OS);
        assert_eq!(report.stemcell_updates[0].products[0].slug, UNDEFINED_SLUG);
    }

    #[test]
    fn test_missing_token_surfaces_http_error() {
        let api = FakeApi::new().fail(UPDATES_PATH, 400);
        let err = StemcellsLoader::new(&api).updates().unwrap_err();

        assert!(matches!(err, Error::Http { status: 400, .. }));
    }

    #[test]
    fn test_assignments_failure() {
        let api = FakeApi::new()
            .respond(UPDATES_PATH, UPDATES)
            .fail(ASSIGNMENTS_PATH, 500);
        let err = StemcellsLoader::new(&api).updates().unwrap_err();

        assert!(matches!(err, Error::Http { status: 500, .. }));
    }
}
