use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire sentinel an event uses to mark "register via our own club form"
/// instead of an external URL.
pub const INTERNAL_FORM_SENTINEL: &str = "club_form_link";

/// Where a "Register" action sends the user: the club-managed internal
/// form, or a third-party page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistrationLink {
    InternalForm,
    External(String),
}

impl RegistrationLink {
    pub fn parse(raw: &str) -> Self {
        if raw == INTERNAL_FORM_SENTINEL {
            RegistrationLink::InternalForm
        } else {
            RegistrationLink::External(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RegistrationLink::InternalForm => INTERNAL_FORM_SENTINEL,
            RegistrationLink::External(url) => url,
        }
    }
}

impl From<String> for RegistrationLink {
    fn from(raw: String) -> Self {
        RegistrationLink::parse(&raw)
    }
}

impl From<RegistrationLink> for String {
    fn from(link: RegistrationLink) -> Self {
        link.as_str().to_string()
    }
}

impl fmt::Display for RegistrationLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's declared desire to register for an event, captured before
/// authentication completes and replayed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedIntent {
    pub event_id: i64,
    pub link: RegistrationLink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_parses_to_internal_form() {
        assert_eq!(RegistrationLink::parse("club_form_link"), RegistrationLink::InternalForm);
        assert_eq!(
            RegistrationLink::parse("https://forms.example.com/x"),
            RegistrationLink::External("https://forms.example.com/x".into())
        );
    }

    #[test]
    fn link_round_trips_through_string_form() {
        for raw in ["club_form_link", "https://forms.example.com/x"] {
            assert_eq!(RegistrationLink::parse(raw).as_str(), raw);
        }
    }
}
