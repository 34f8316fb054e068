use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::intent::INTERNAL_FORM_SENTINEL;

/// A club event as the faculty endpoints return it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: i64,
    pub club_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub registration_form_link: String,
}

/// Fields a faculty member submits when adding or editing an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub club_id: String,
    pub event_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    /// Empty means "use the internal club form".
    #[serde(default)]
    pub registration_form_link: String,
}

impl EventDraft {
    /// Date rules enforced before any network call: the event cannot be in
    /// the past, and the registration deadline must fall strictly before
    /// the event date.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ModelError> {
        if self.event_name.trim().is_empty() {
            return Err(ModelError::Validation("event name is required".into()));
        }
        if let Some(date) = self.event_date {
            if date < today {
                return Err(ModelError::Validation(
                    "event date must be today or a future date".into(),
                ));
            }
        }
        if let (Some(deadline), Some(date)) = (self.deadline, self.event_date) {
            if deadline >= date {
                return Err(ModelError::Validation(
                    "registration deadline must be before the event date".into(),
                ));
            }
        }
        Ok(())
    }

    /// An empty link field defaults to the internal-form sentinel, matching
    /// what the add-event form did.
    pub fn normalized_link(&self) -> String {
        if self.registration_form_link.trim().is_empty() {
            INTERNAL_FORM_SENTINEL.to_string()
        } else {
            self.registration_form_link.clone()
        }
    }
}
