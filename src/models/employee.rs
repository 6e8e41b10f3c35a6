//! Employee reference model.
//!
//! Records coming from the HR API carry the employee either as a bare
//! document id or as a populated object. Both shapes deserialize into
//! [`EmployeeRef`], with every nested field optional.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The human-facing employee code (e.g. `7` or `"EMP-007"`).
///
/// The HR API is not consistent about whether codes are numbers or strings,
/// so both are accepted. `7` and `"7"` are distinct codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeCode {
    /// A numeric employee code.
    Number(u64),
    /// A textual employee code.
    Text(String),
}

impl fmt::Display for EmployeeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeCode::Number(n) => write!(f, "{}", n),
            EmployeeCode::Text(s) => f.write_str(s),
        }
    }
}

/// The department an employee belongs to, when populated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    /// Document id of the department.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name of the department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
}

/// A reference to an employee as it appears inside salary, allowance and
/// leave records.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EmployeeCode, EmployeeRef};
///
/// let populated: EmployeeRef =
///     serde_json::from_str(r#"{"_id": "64f0", "employeeId": 7, "name": "Asha"}"#).unwrap();
/// assert_eq!(populated.employee_id, Some(EmployeeCode::Number(7)));
///
/// let bare: EmployeeRef = serde_json::from_str(r#""64f0""#).unwrap();
/// assert_eq!(bare.id.as_deref(), Some("64f0"));
/// assert!(bare.employee_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawEmployeeRef")]
pub struct EmployeeRef {
    /// Document id of the employee.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The employee code used for grouping and display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeCode>,
    /// The employee's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The employee's department, when populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentRef>,
}

impl EmployeeRef {
    /// Returns the department name if the reference was populated that deep.
    pub fn department_name(&self) -> Option<&str> {
        self.department
            .as_ref()
            .and_then(|d| d.department_name.as_deref())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEmployeeRef {
    Id(String),
    Populated(PopulatedEmployee),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopulatedEmployee {
    #[serde(default, rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    employee_id: Option<EmployeeCode>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    department: Option<DepartmentRef>,
}

impl From<RawEmployeeRef> for EmployeeRef {
    fn from(raw: RawEmployeeRef) -> Self {
        match raw {
            RawEmployeeRef::Id(id) => EmployeeRef {
                id: Some(id),
                ..Default::default()
            },
            RawEmployeeRef::Populated(p) => EmployeeRef {
                id: p.id,
                employee_id: p.employee_id,
                name: p.name,
                department: p.department,
            },
        }
    }
}
