//! Auth

use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Employee Key
    pub struct EmployeeKey;
}

/// Employee role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including roster edits
    Admin,

    /// Inventory and reporting access
    Manager,

    /// Register operation
    Cashier,

    /// Register and tab operation
    Bartender,
}

/// Employee
#[derive(Debug, Clone)]
pub struct Employee {
    /// Display name
    pub name: String,

    /// Role at the terminal
    pub role: Role,

    /// Login PIN, matched exactly
    pub pin: String,

    /// Optional contact address
    pub email: Option<String>,
}

/// Employee roster with PIN login.
#[derive(Debug, Default)]
pub struct Roster {
    employees: SlotMap<EmployeeKey, Employee>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Roster {
            employees: SlotMap::with_key(),
        }
    }

    /// Add an employee and return their key.
    pub fn add_employee(&mut self, employee: Employee) -> EmployeeKey {
        self.employees.insert(employee)
    }

    /// Look up an employee by key.
    #[must_use]
    pub fn employee(&self, key: EmployeeKey) -> Option<&Employee> {
        self.employees.get(key)
    }

    /// Find the employee with the given PIN, if any.
    #[must_use]
    pub fn login(&self, pin: &str) -> Option<EmployeeKey> {
        self.employees
            .iter()
            .find(|(_, employee)| employee.pin == pin)
            .map(|(key, _)| key)
    }

    /// The full employee map.
    #[must_use]
    pub fn employees(&self) -> &SlotMap<EmployeeKey, Employee> {
        &self.employees
    }

    /// Get the number of employees on the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Check if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

/// Terminal session: the authenticated employee, or none.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<EmployeeKey>,
}

impl Session {
    /// Create a signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Session { current: None }
    }

    /// Attempt a PIN login against a roster. Returns whether it succeeded;
    /// a failed attempt leaves any existing sign-in untouched.
    pub fn login(&mut self, roster: &Roster, pin: &str) -> bool {
        match roster.login(pin) {
            Some(key) => {
                self.current = Some(key);
                true
            }
            None => false,
        }
    }

    /// Bind an already-resolved employee to the session.
    pub fn sign_in(&mut self, key: EmployeeKey) {
        self.current = Some(key);
    }

    /// Clear the session.
    pub fn sign_out(&mut self) {
        self.current = None;
    }

    /// The current employee key, or none.
    #[must_use]
    pub fn employee(&self) -> Option<EmployeeKey> {
        self.current
    }

    /// Whether an employee is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn cashier() -> Employee {
        Employee {
            name: "Cashier User".to_string(),
            role: Role::Cashier,
            pin: "3456".to_string(),
            email: Some("cashier@alcopos.com".to_string()),
        }
    }

    fn bartender() -> Employee {
        Employee {
            name: "Bartender".to_string(),
            role: Role::Bartender,
            pin: "4567".to_string(),
            email: None,
        }
    }

    #[test]
    fn login_finds_employee_by_pin() -> TestResult {
        let mut roster = Roster::new();
        let key = roster.add_employee(cashier());
        roster.add_employee(bartender());

        assert_eq!(roster.login("3456"), Some(key));

        Ok(())
    }

    #[test]
    fn login_with_unknown_pin_returns_none() {
        let mut roster = Roster::new();
        roster.add_employee(cashier());

        assert_eq!(roster.login("0000"), None);
    }

    #[test]
    fn session_login_binds_employee() {
        let mut roster = Roster::new();
        let key = roster.add_employee(cashier());

        let mut session = Session::new();

        assert!(session.login(&roster, "3456"));
        assert_eq!(session.employee(), Some(key));
        assert!(session.is_authenticated());
    }

    #[test]
    fn failed_login_keeps_existing_sign_in() {
        let mut roster = Roster::new();
        let key = roster.add_employee(bartender());

        let mut session = Session::new();
        session.sign_in(key);

        assert!(!session.login(&roster, "9999"));
        assert_eq!(session.employee(), Some(key));
    }

    #[test]
    fn sign_out_clears_session() {
        let mut roster = Roster::new();
        let key = roster.add_employee(cashier());

        let mut session = Session::new();
        session.sign_in(key);
        session.sign_out();

        assert_eq!(session.employee(), None);
        assert!(!session.is_authenticated());
    }
}
