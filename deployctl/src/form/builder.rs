//! Deploy request builder

use serde::de::DeserializeOwned;

use crate::errors::ClientError;
use crate::form::fields::FormFields;
use crate::models::deployment::DeployRequest;
use crate::utils::generate_nonce;

/// Build a deploy request from the current field values.
///
/// A fresh nonce is generated on every call. Fails only when `checks` or
/// `attachments` hold text that is not a well-formed JSON list. List items
/// are forwarded as written; the service validates their shape.
pub fn build(fields: &FormFields) -> Result<DeployRequest, ClientError> {
    Ok(DeployRequest {
        email: fields.email.clone(),
        secret: fields.secret.clone(),
        task: fields.task.clone(),
        round: parse_round(&fields.round),
        nonce: generate_nonce(),
        brief: fields.brief.clone(),
        checks: parse_list("checks", &fields.checks)?,
        evaluation_url: fields.evaluation_url.clone(),
        attachments: parse_list("attachments", &fields.attachments)?,
        wait_for_result: fields.wait_for_result,
    })
}

/// Blank is round 0. Numeric text with an integral value (`2`, `2.0`,
/// `2e1`) is that integer; anything else is `None`.
pub fn parse_round(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }
    if let Ok(round) = text.parse::<i64>() {
        return Some(round);
    }

    let value = text.parse::<f64>().ok()?;
    let integral = value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64;
    integral.then_some(value as i64)
}

/// Parse a JSON list field. Blank text is an empty list.
pub fn parse_list<T: DeserializeOwned>(
    field: &'static str,
    text: &str,
) -> Result<Vec<T>, ClientError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|source| ClientError::ParseError { field, source })
}
