use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 2,
        "employeeId": "EMP002",
        "name": "Priya Sharma",
        "email": "priya.sharma@company.com",
        "department": "Engineering",
        "role": "employee",
        "createdAt": "2024-06-01T08:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 2)]
    pub id: u64,

    /// Human-facing code, `EMP` followed by a zero-padded sequence number.
    #[schema(example = "EMP002")]
    pub employee_id: String,

    #[schema(example = "Priya Sharma")]
    pub name: String,

    #[schema(example = "priya.sharma@company.com")]
    pub email: String,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    pub role: Role,

    #[serde(skip)]
    pub password_hash: String,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Role,
    pub password_hash: String,
}

/// Next human-facing code given how many employees already exist.
pub fn employee_code(existing: u64) -> String {
    format!("EMP{:03}", existing + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_code_is_zero_padded() {
        assert_eq!(employee_code(0), "EMP001");
        assert_eq!(employee_code(41), "EMP042");
        assert_eq!(employee_code(1234), "EMP1235");
    }

    #[test]
    fn password_hash_never_serialized() {
        let employee = Employee {
            id: 1,
            employee_id: "EMP001".into(),
            name: "Test".into(),
            email: "test@example.com".into(),
            department: None,
            role: Role::Employee,
            password_hash: "secret-hash".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&employee).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"employeeId\":\"EMP001\""));
    }
}
