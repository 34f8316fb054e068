use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Field values collected from a club registration form.
///
/// The backend stores the payload as one opaque JSON string attached to a
/// registration row; this type keeps it as a typed name -> value mapping on
/// the client and only flattens to a string at the HTTP boundary.
/// Iteration order is insertion order, which is also the order the details
/// view renders fields in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: Map<String, Value>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), Value::String(value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Fields in insertion order, values rendered as plain text.
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields.iter().map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.as_str(), text)
        })
    }

    /// Serialize to the opaque string form the update endpoint expects.
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(&self.fields).map_err(|e| ModelError::Parse(e.to_string()))
    }

    /// Decode the opaque string stored on a registration row.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let fields: Map<String, Value> =
            serde_json::from_str(raw).map_err(|e| ModelError::Parse(e.to_string()))?;
        Ok(Self { fields })
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut form = FormData::new();
        form.insert("Name", "Asha");
        form.insert("Age", "20");
        form.insert("Resume Link", "https://example.com/cv");
        let keys: Vec<&str> = form.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Name", "Age", "Resume Link"]);
    }

    #[test]
    fn json_boundary_keeps_fields_intact() {
        let mut form = FormData::new();
        form.insert("Name", "Asha");
        form.insert("Age", "20");
        let raw = form.to_json().unwrap();
        let back = FormData::from_json(&raw).unwrap();
        assert_eq!(back, form);
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(FormData::from_json("[1,2,3]").is_err());
        assert!(FormData::from_json("not json").is_err());
    }
}
