//! JSON rendering of a dispatch run.

use dispatch_core::{DeliveryAudit, DispatchPlan};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    #[serde(flatten)]
    pub plan: &'a DispatchPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<&'a DeliveryAudit>,
}

pub fn render_report(report: &RunReport<'_>, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
