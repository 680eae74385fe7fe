//! Parsing of raw backend output into a typed [`DayPlan`].
//!
//! A malformed response is a [`OrchestratorError::Parse`], a different
//! failure class from transport errors even though the day-level policy
//! treats both the same way.

use tracing::debug;

use crate::error::OrchestratorError;
use crate::plan::DayPlan;

/// Strip an optional markdown code fence from around a response body.
fn strip_code_fences(response: &str) -> &str {
    let mut body = response.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Drop the fence line itself ("```json" or bare "```").
        body = match rest.split_once('\n') {
            Some((_, after)) => after,
            None => rest,
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Parse one day's backend output.
pub fn parse_day_response(raw: &str) -> Result<DayPlan, OrchestratorError> {
    let body = strip_code_fences(raw);

    let plan: DayPlan = serde_json::from_str(body).map_err(|e| {
        debug!("Unparseable day response: {}", body);
        OrchestratorError::Parse(format!("invalid day plan: {}", e))
    })?;

    Ok(plan)
}
