//! Extraction of findings from OWASP ZAP JSON reports.
//!
//! Only the document itself must be well-formed. Inside it, anything that does
//! not look like `{"site": [{"alerts": [{...}]}]}` is skipped, and missing alert
//! fields fall back to fixed placeholder text.

use protocol::Finding;
use serde_json::Value;

use crate::error::ServiceError;

const INVALID_JSON: &str = "Invalid JSON format. Ensure the ZAP scan report is valid.";

const DEFAULT_NAME: &str = "Unknown Vulnerability";
const DEFAULT_RISK: &str = "Unknown Risk";
const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_SOLUTION: &str = "No solution available";
const DEFAULT_REFERENCE: &str = "No reference provided";

pub(crate) fn parse_scan_report(raw: &[u8]) -> Result<Vec<Finding>, ServiceError> {
    let text = std::str::from_utf8(raw).map_err(|err| {
        ServiceError::MalformedInput(format!("Report is not valid UTF-8 text: {err}"))
    })?;
    let report: Value = serde_json::from_str(text).map_err(|err| {
        tracing::debug!(error = %err, "scan report rejected");
        ServiceError::MalformedInput(INVALID_JSON.to_string())
    })?;
    Ok(extract_findings(&report))
}

pub(crate) fn extract_findings(report: &Value) -> Vec<Finding> {
    let Some(sites) = report.get("site").and_then(Value::as_array) else {
        return Vec::new();
    };
    sites
        .iter()
        .filter(|site| site.is_object())
        .filter_map(|site| site.get("alerts").and_then(Value::as_array))
        .flatten()
        .filter(|alert| alert.is_object())
        .map(finding_from_alert)
        .collect()
}

fn finding_from_alert(alert: &Value) -> Finding {
    Finding {
        name: field_or(alert, "name", DEFAULT_NAME),
        risk: field_or(alert, "risk", DEFAULT_RISK),
        description: field_or(alert, "description", DEFAULT_DESCRIPTION),
        solution: field_or(alert, "solution", DEFAULT_SOLUTION),
        reference: field_or(alert, "reference", DEFAULT_REFERENCE),
    }
}

// Scalars are kept as their literal text; null, arrays and objects use the default.
fn field_or(alert: &Value, key: &str, default: &str) -> String {
    match alert.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => default.to_string(),
    }
}
