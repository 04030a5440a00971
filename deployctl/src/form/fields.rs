//! Raw form field values

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

/// Names accepted by [`FormFields::set`]
pub const FIELD_NAMES: [&str; 9] = [
    "email",
    "secret",
    "task",
    "round",
    "brief",
    "checks",
    "evaluation_url",
    "attachments",
    "wait_for_result",
];

/// The deploy form as the user typed it.
///
/// Every value is kept as raw text; interpretation happens in
/// [`crate::form::builder::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub email: String,
    pub secret: String,
    pub task: String,
    pub round: String,
    pub brief: String,

    /// JSON array text
    pub checks: String,

    pub evaluation_url: String,

    /// JSON array of `{"name", "url"}` objects
    pub attachments: String,

    pub wait_for_result: bool,
}

impl FormFields {
    /// Set one field by name. Kebab-case names are accepted too.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let value = value.to_string();
        match name.replace('-', "_").as_str() {
            "email" => self.email = value,
            "secret" => self.secret = value,
            "task" => self.task = value,
            "round" => self.round = value,
            "brief" => self.brief = value,
            "checks" => self.checks = value,
            "evaluation_url" => self.evaluation_url = value,
            "attachments" => self.attachments = value,
            "wait_for_result" | "wait" => self.wait_for_result = parse_flag(&value)?,
            other => {
                return Err(ClientError::ValidationError(format!(
                    "Unknown field '{}', expected one of: {}",
                    other,
                    FIELD_NAMES.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Clear every field back to its blank state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_flag(value: &str) -> Result<bool, ClientError> {
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ClientError::ValidationError(format!(
            "Invalid wait_for_result value: {}",
            other
        ))),
    }
}
