#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Employee = 1,
    Manager = 2,
    CompanyAdmin = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Employee),
            2 => Some(Role::Manager),
            3 => Some(Role::CompanyAdmin),
            _ => None,
        }
    }
}
