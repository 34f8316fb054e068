use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::form::FormData;

/// Review status of a registration row. `Applied` is the server-assigned
/// initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    Applied,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Applied => "APPLIED",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
        }
    }
}

/// A registration row as the backend returns it. The client treats it as
/// server-owned and only ever references it by `reg_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub reg_id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status: RegistrationStatus,
    /// Zone-less server timestamp; absent until the row is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<NaiveDateTime>,
    /// Opaque JSON string attached by the internal-form flow; absent for
    /// external-link registrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<String>,
}

impl Registration {
    /// Decode the attached form payload, if any.
    pub fn parsed_form(&self) -> Result<Option<FormData>, ModelError> {
        match &self.form_data {
            Some(raw) => FormData::from_json(raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Body of the create-registration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub event_id: i64,
    pub user_id: i64,
}

/// Body of the attach-form-data call. `form_data` is the JSON-serialized
/// field map (see [`FormData::to_json`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDataUpdate {
    pub reg_id: i64,
    pub form_data: String,
}
