use serde::{Deserialize, Serialize};

use crate::domain::Employee;

/// Body of `GET /employees`.
///
/// Current servers wrap the list as `{"data": [...]}`; older ones return the
/// bare array. Both decode, the envelope is what this crate emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeListResponse {
    Envelope { data: Vec<Employee> },
    Bare(Vec<Employee>),
}

impl EmployeeListResponse {
    pub fn into_employees(self) -> Vec<Employee> {
        match self {
            Self::Envelope { data } => data,
            Self::Bare(employees) => employees,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub review: String,
}

/// Acknowledgement body for review and deactivate calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
