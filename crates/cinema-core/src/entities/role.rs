//! Roles and role extensions
//!
//! A user's `role` selects exactly one extension record: admins carry a
//! free-text level, staff a department, customers a loyalty point balance.
//! `RoleDetails` is the input shape (every attribute optional), while
//! `RoleExtension` is the stored shape after defaults are applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

pub const DEFAULT_ADMIN_LEVEL: &str = "admin";
pub const DEFAULT_STAFF_DEPT: &str = "general";
pub const DEFAULT_LOYALTY_POINTS: u32 = 0;

// ============================================================================
// Role
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Customer];

    /// Row id in the `roles` lookup table
    pub const fn id(self) -> i16 {
        match self {
            Self::Admin => 1,
            Self::Staff => 2,
            Self::Customer => 3,
        }
    }

    pub fn from_id(id: i16) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|role| role.id() == id)
            .ok_or_else(|| DomainError::InvalidRole(id.to_string()))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    /// Admin and staff accounts are onboarded by an operator and start verified
    #[inline]
    pub const fn is_trusted(self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

// ============================================================================
// RoleDetails
// ============================================================================

/// Role-specific attributes supplied with an identity.
///
/// Missing attributes mean "not provided": on first insert the role default
/// is stored, on later upserts the stored value is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleDetails {
    Admin { level: Option<String> },
    Staff { dept: Option<String> },
    Customer { loyalty_points: Option<u32> },
}

impl RoleDetails {
    /// Details for `role` with every attribute left unspecified
    pub fn unspecified(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin { level: None },
            Role::Staff => Self::Staff { dept: None },
            Role::Customer => Self::Customer {
                loyalty_points: None,
            },
        }
    }

    pub fn admin(level: Option<&str>) -> Self {
        Self::Admin {
            level: non_blank(level),
        }
    }

    pub fn staff(dept: Option<&str>) -> Self {
        Self::Staff {
            dept: non_blank(dept),
        }
    }

    pub fn customer(loyalty_points: Option<u32>) -> Self {
        Self::Customer { loyalty_points }
    }

    /// Build details from a loosely-typed boundary payload.
    ///
    /// Unknown role strings and negative point balances are rejected here,
    /// so nothing past this point can carry an invalid role.
    pub fn from_parts(
        role: &str,
        level: Option<&str>,
        dept: Option<&str>,
        loyalty_points: Option<i64>,
    ) -> Result<Self, DomainError> {
        match role.parse::<Role>()? {
            Role::Admin => Ok(Self::admin(level)),
            Role::Staff => Ok(Self::staff(dept)),
            Role::Customer => {
                let points = loyalty_points
                    .map(|p| {
                        u32::try_from(p).map_err(|_| {
                            DomainError::ValidationError(
                                "loyalty_points must be between 0 and 4294967295".to_string(),
                            )
                        })
                    })
                    .transpose()?;
                Ok(Self::customer(points))
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Staff { .. } => Role::Staff,
            Self::Customer { .. } => Role::Customer,
        }
    }

    /// Blank strings count as "not provided"
    pub fn normalized(self) -> Self {
        match self {
            Self::Admin { level } => Self::admin(level.as_deref()),
            Self::Staff { dept } => Self::staff(dept.as_deref()),
            Self::Customer { loyalty_points } => Self::customer(loyalty_points),
        }
    }

    /// The extension a fresh row would hold
    pub fn with_defaults(&self) -> RoleExtension {
        match self {
            Self::Admin { level } => RoleExtension::Admin {
                level: non_blank(level.as_deref()).unwrap_or_else(|| DEFAULT_ADMIN_LEVEL.to_string()),
            },
            Self::Staff { dept } => RoleExtension::Staff {
                dept: non_blank(dept.as_deref()).unwrap_or_else(|| DEFAULT_STAFF_DEPT.to_string()),
            },
            Self::Customer { loyalty_points } => RoleExtension::Customer {
                loyalty_points: loyalty_points.unwrap_or(DEFAULT_LOYALTY_POINTS),
            },
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

// ============================================================================
// RoleExtension
// ============================================================================

/// Stored per-role attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleExtension {
    Admin { level: String },
    Staff { dept: String },
    Customer { loyalty_points: u32 },
}

impl RoleExtension {
    pub fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Staff { .. } => Role::Staff,
            Self::Customer { .. } => Role::Customer,
        }
    }
}
