//! Errand listing and mutation through the platform API.

use crate::client::{Api, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::tiles::get_json;
use reconcile::{Errand, ErrandService};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ErrandsList {
    #[serde(default)]
    errands: Vec<Errand>,
}

fn errands_path(product_guid: &str) -> String {
    format!("/api/v0/staged/products/{product_guid}/errands")
}

/// Errand service for staged products.
pub struct ErrandsService<'a, A: Api + ?Sized> {
    api: &'a A,
}

impl<'a, A: Api + ?Sized> ErrandsService<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub fn list_errands(&self, product_guid: &str) -> Result<Vec<Errand>> {
        let list: ErrandsList = get_json(self.api, &errands_path(product_guid))?;
        Ok(list.errands)
    }

    /// Update one errand, sending both lifecycle policies.
    pub fn update_errand(
        &self,
        product_guid: &str,
        errand_name: &str,
        post_deploy: &Value,
        pre_delete: Option<&Value>,
    ) -> Result<()> {
        let body = ErrandsList {
            errands: vec![Errand {
                name: errand_name.to_string(),
                post_deploy: Some(post_deploy.clone()),
                pre_delete: pre_delete.cloned(),
            }],
        };
        let body = serde_json::to_string(&body).map_err(|e| Error::decode("errand update", &e))?;

        log::debug!("Setting {errand_name} of {product_guid} to {post_deploy}");
        self.api
            .put(&errands_path(product_guid), &body, DEFAULT_TIMEOUT)
            .map(|_| ())
    }
}

impl<A: Api + ?Sized> ErrandService for ErrandsService<'_, A> {
    fn list(&self, product_guid: &str) -> anyhow::Result<Vec<Errand>> {
        Ok(self.list_errands(product_guid)?)
    }

    fn set_state(
        &self,
        product_guid: &str,
        errand_name: &str,
        post_deploy: &Value,
        pre_delete: Option<&Value>,
    ) -> anyhow::Result<()> {
        Ok(self.update_errand(product_guid, errand_name, post_deploy, pre_delete)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeApi;
    use reconcile::mock::RecordingReporter;
    use reconcile::{ErrandTarget, ErrandToggler};
    use serde_json::json;

    const ERRANDS: &str = r#"{"errands": [
        {"name": "smoke_tests", "post_deploy": true, "pre_delete": null},
        {"name": "push-apps-manager", "post_deploy": "when-changed"},
        {"name": "delete-apps", "pre_delete": true}
    ]}"#;

    fn api() -> FakeApi {
        FakeApi::new().respond("/api/v0/staged/products/cf-123/errands", ERRANDS)
    }

    #[test]
    fn test_list() {
        let api = api();
        let errands = ErrandsService::new(&api).list("cf-123").unwrap();

        assert_eq!(errands.len(), 3);
        assert_eq!(errands[0], Errand::new("smoke_tests").with_post_deploy(true));
        assert_eq!(errands[1].post_deploy, Some(json!("when-changed")));
        assert!(errands[2].post_deploy.is_none());
    }

    #[test]
    fn test_set_state_body() {
        let api = api();
        ErrandsService::new(&api)
            .set_state("cf-123", "smoke_tests", &json!(false), Some(&json!("when-changed")))
            .unwrap();

        let request = &api.requests()[0];
        assert_eq!(request.method, "PUT");
        assert_eq!(request.path, "/api/v0/staged/products/cf-123/errands");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"errands": [{"name": "smoke_tests", "post_deploy": false, "pre_delete": "when-changed"}]})
        );
    }

    #[test]
    fn test_set_state_without_pre_delete_omits_it() {
        let api = api();
        ErrandsService::new(&api)
            .set_state("cf-123", "smoke_tests", &json!("default"), None)
            .unwrap();

        let body: Value = serde_json::from_str(api.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"errands": [{"name": "smoke_tests", "post_deploy": "default"}]}));
    }

    #[test]
    fn test_list_failure() {
        let api = FakeApi::new().fail("/api/v0/staged/products/cf-123/errands", 404);
        let err = ErrandsService::new(&api).list_errands("cf-123").unwrap_err();

        assert_eq!(err.category(), crate::ErrorCategory::NotFound);
    }

    #[test]
    fn test_toggler_over_http_service() {
        let api = api();
        let service = ErrandsService::new(&api);
        let reporter = RecordingReporter::new();
        let summary = ErrandToggler::new(&service, &reporter, ErrandTarget::Disable)
            .execute(&["cf-123".to_string()])
            .unwrap();

        assert_eq!(summary.changed, 2);
        let puts: Vec<_> = api.requests().into_iter().filter(|r| r.method == "PUT").collect();
        assert_eq!(puts.len(), 2);
        assert!(!reporter.output().contains("delete-apps"));
    }
}
