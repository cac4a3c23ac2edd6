use std::fmt;

use serde::{Deserialize, Serialize};

/// Administrator role attached to a logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[serde(rename = "SUPERADMIN", alias = "SUPER_ADMIN")]
    SuperAdmin,
    Admin,
    #[default]
    User,
}

/// Role-gated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewRoster,
    ManageMembers,
    ManagePayments,
    RegisterAdmin,
}

impl Role {
    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::ViewRoster => true,
            Action::ManageMembers | Action::ManagePayments => {
                matches!(self, Role::SuperAdmin | Role::Admin)
            }
            Action::RegisterAdmin => matches!(self, Role::SuperAdmin),
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUPERADMIN" | "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::SuperAdmin => "SUPERADMIN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::ViewRoster => "view the roster",
            Action::ManageMembers => "manage members",
            Action::ManagePayments => "manage payments",
            Action::RegisterAdmin => "register administrators",
        };
        f.write_str(label)
    }
}
