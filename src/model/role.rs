#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Worker = 1,
    Manager = 2,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Worker),
            2 => Some(Role::Manager),
            _ => None,
        }
    }

    pub fn as_id(&self) -> u8 {
        *self as u8
    }
}
