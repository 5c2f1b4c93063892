use uuid::Uuid;

/// The employee currently signed in on this kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub employee_id: String,
    pub name: String,
}

impl Session {
    pub fn new(employee_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            name,
        }
    }
}
