use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Staff,
    Guest,
}

impl Role {
    pub const STAFF_ROLES: [Role; 3] = [Role::Owner, Role::Admin, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Guest => "guest",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Guest)
    }

    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

/// Either a staff member or a LINE customer. Customers are the rows with
/// role `guest` and a `line_user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub line_user_id: Option<String>,
    pub picture_url: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::Guest)
    }

    pub fn is_staff(&self) -> bool {
        self.role().is_staff()
    }
}

/// Display data reported by the provider for a sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub user_id: String,
    pub display_name: String,
    pub picture_url: Option<String>,
}
