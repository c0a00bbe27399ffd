use std::fmt;

use serde::{Deserialize, Serialize};

/// Consumable credit count.
pub type Credits = u64;

/// Membership level. Ordering is meaningful: `Free < Basic < Pro`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[default]
    Free,
    Basic,
    Pro,
}

impl Tier {
    /// Raise to `target` if it is higher; never lowers.
    pub fn promoted_to(self, target: Tier) -> Tier {
        self.max(target)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Free => "Free",
            Tier::Basic => "Basic",
            Tier::Pro => "Pro",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "user")]
    Standard,
    #[serde(rename = "admin")]
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Standard => "user",
            Role::Administrator => "admin",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Unique key into the account book.
    pub email: String,
    pub credits: Credits,
    pub role: Role,
    pub tier: Tier,
}

impl Account {
    pub fn standard(id: String, name: String, email: String, credits: Credits) -> Self {
        Self {
            id,
            name,
            email,
            credits,
            role: Role::Standard,
            tier: Tier::Free,
        }
    }

    pub fn administrator(email: String, credits: Credits) -> Self {
        Self {
            id: ADMIN_ACCOUNT_ID.to_string(),
            name: "Admin".to_string(),
            email,
            credits,
            role: Role::Administrator,
            tier: Tier::Pro,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }

    pub fn can_afford(&self, amount: Credits) -> bool {
        self.credits >= amount
    }
}

/// Fixed id of the administrator singleton.
pub const ADMIN_ACCOUNT_ID: &str = "admin_user";
