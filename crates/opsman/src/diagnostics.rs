//! Platform diagnostic report.

use crate::client::{Api, LONG_TIMEOUT};
use crate::error::Result;

const DIAGNOSTIC_REPORT_PATH: &str = "/api/v0/diagnostic_report";

/// Fetch the diagnostic report as the platform returns it.
pub fn diagnostic_report<A: Api + ?Sized>(api: &A) -> Result<String> {
    let body = api.get(DIAGNOSTIC_REPORT_PATH, LONG_TIMEOUT)?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}
