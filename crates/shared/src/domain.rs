use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned employee identifier.
///
/// The API stores ids as text but hands out integers on create, so both JSON
/// strings and JSON numbers are accepted and held as the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parses a form input into an id, rejecting blank values.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Signed(value) => Self(value.to_string()),
            RawId::Unsigned(value) => Self(value.to_string()),
        })
    }
}

/// Editable employee fields; the id never travels in this payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFields {
    pub name: String,
    pub position: String,
    pub department: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub position: String,
    pub department: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub contact: String,
    #[serde(default = "default_active", deserialize_with = "flag")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// SQLite-backed servers report booleans as 0/1.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(value) => value,
        RawFlag::Int(value) => value != 0,
        RawFlag::Null(()) => default_active(),
    })
}
