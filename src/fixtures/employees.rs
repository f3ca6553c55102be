//! Employee Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::auth::{Employee, Role};

/// Wrapper for employees in YAML
#[derive(Debug, Deserialize)]
pub struct EmployeesFixture {
    /// Map of employee key -> employee fixture
    pub employees: FxHashMap<String, EmployeeFixture>,
}

/// Employee Fixture
#[derive(Debug, Deserialize)]
pub struct EmployeeFixture {
    /// Display name
    pub name: String,

    /// Role (e.g. "cashier", "bartender")
    pub role: Role,

    /// Login PIN
    pub pin: String,

    /// Optional contact address
    pub email: Option<String>,
}

impl From<EmployeeFixture> for Employee {
    fn from(fixture: EmployeeFixture) -> Self {
        Employee {
            name: fixture.name,
            role: fixture.role,
            pin: fixture.pin,
            email: fixture.email,
        }
    }
}
