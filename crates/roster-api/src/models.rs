// Wire types for the student resource.
//
// These mirror the JSON the server speaks (camelCase keys, ids that may be
// numbers or strings, optional fields that may be missing or null). Domain
// types live in `roster-core`; conversion happens there.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier, as it appears on the wire.
///
/// Backends differ: some emit numeric ids (`7`), others strings
/// (`"64f0c2..."`). Both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A student record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: ResourceId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub major: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub enrollment_date: String,
}

/// Request body for create and update. Never carries an id; every field is
/// always sent, empty strings included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBody {
    pub name: String,
    pub email: String,
    pub major: String,
    pub enrollment_date: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_and_string_ids() {
        let a: Student = serde_json::from_value(json!({"id": 7, "name": "A", "email": "a@x.com"})).unwrap();
        let b: Student =
            serde_json::from_value(json!({"id": "64f0c2", "name": "B", "email": "b@x.com"})).unwrap();
        assert_eq!(a.id, ResourceId::Number(7));
        assert_eq!(b.id, ResourceId::Text("64f0c2".into()));
        assert_eq!(a.id.to_string(), "7");
        assert_eq!(b.id.to_string(), "64f0c2");
    }

    #[test]
    fn missing_and_null_optionals_become_empty() {
        let s: Student = serde_json::from_value(json!({
            "id": 1,
            "name": "A",
            "email": "a@x.com",
            "major": null
        }))
        .unwrap();
        assert_eq!(s.major, "");
        assert_eq!(s.enrollment_date, "");
    }

    #[test]
    fn body_uses_camel_case_and_no_id() {
        let body = StudentBody {
            name: "A".into(),
            email: "a@x.com".into(),
            major: String::new(),
            enrollment_date: "2024-01-01".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"name": "A", "email": "a@x.com", "major": "", "enrollmentDate": "2024-01-01"})
        );
        assert!(value.get("id").is_none());
    }
}
