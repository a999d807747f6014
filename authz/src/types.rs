//! Core authorization types: roles, principals, actions, and resources.
//!
//! Everything in this module is a plain value. Principals must be built
//! from authenticated request data only; never trust principal fields
//! from the request body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global role assigned to every account.
///
/// This is a closed set: the service has exactly these three roles and
/// they are not user-configurable. Staff status is an orthogonal flag on
/// the principal, not a fourth role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    /// The lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Error returned when parsing an unrecognized role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// The actor making a request.
///
/// An anonymous principal carries no identity and owns nothing; every
/// privilege predicate treats it as a plain user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    Anonymous,
    Known {
        /// Account id (ULID string).
        id: String,
        role: Role,
        is_staff: bool,
    },
}

impl Principal {
    /// Build a principal for an authenticated account.
    pub fn known(id: impl Into<String>, role: Role, is_staff: bool) -> Self {
        Principal::Known {
            id: id.into(),
            role,
            is_staff,
        }
    }

    /// The account id, if authenticated.
    pub fn id(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::Known { id, .. } => Some(id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Known { .. })
    }

    /// Staff flag set, or role is admin.
    pub fn is_admin(&self) -> bool {
        match self {
            Principal::Anonymous => false,
            Principal::Known { role, is_staff, .. } => *is_staff || *role == Role::Admin,
        }
    }

    /// Anything above a plain user: admin, staff, or a non-user role.
    pub fn is_elevated(&self) -> bool {
        match self {
            Principal::Anonymous => false,
            Principal::Known { role, .. } => self.is_admin() || *role != Role::User,
        }
    }

    pub fn is_plain_user(&self) -> bool {
        !self.is_elevated()
    }

    /// Whether this principal owns the given resource.
    ///
    /// Anonymous principals own nothing; resources without an owner
    /// (catalogue entries) are owned by nobody.
    pub fn owns(&self, resource: &ResourceRef) -> bool {
        match (self.id(), resource.owner.as_deref()) {
            (Some(id), Some(owner)) => id == owner,
            _ => false,
        }
    }
}

/// Operation being performed, already abstracted from the HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Read-only actions. Every rule branches on this first.
    pub fn is_safe(&self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// The kind of resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Category,
    Genre,
    Title,
    Review,
    Comment,
    Account,
}

/// A resolved target resource, reduced to what the rules need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    /// Author/owner account id. None for catalogue entries.
    pub owner: Option<String>,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind, owner: None }
    }

    pub fn owned_by(kind: ResourceKind, owner: impl Into<String>) -> Self {
        Self {
            kind,
            owner: Some(owner.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn anonymous_has_no_privileges() {
        let p = Principal::Anonymous;
        assert!(!p.is_authenticated());
        assert!(!p.is_admin());
        assert!(!p.is_elevated());
        assert!(p.is_plain_user());
        assert!(p.id().is_none());
    }

    #[test]
    fn staff_flag_implies_admin_regardless_of_role() {
        let p = Principal::known("u1", Role::User, true);
        assert!(p.is_admin());
        assert!(p.is_elevated());
        assert!(!p.is_plain_user());
    }

    #[test]
    fn moderator_is_elevated_but_not_admin() {
        let p = Principal::known("m1", Role::Moderator, false);
        assert!(!p.is_admin());
        assert!(p.is_elevated());
        assert!(!p.is_plain_user());
    }

    #[test]
    fn plain_user_predicates() {
        let p = Principal::known("u1", Role::User, false);
        assert!(!p.is_admin());
        assert!(!p.is_elevated());
        assert!(p.is_plain_user());
    }

    #[test]
    fn ownership_requires_both_sides() {
        let review = ResourceRef::owned_by(ResourceKind::Review, "u1");
        let category = ResourceRef::new(ResourceKind::Category);

        assert!(Principal::known("u1", Role::User, false).owns(&review));
        assert!(!Principal::known("u2", Role::User, false).owns(&review));
        assert!(!Principal::Anonymous.owns(&review));
        assert!(!Principal::known("u1", Role::Admin, true).owns(&category));
    }

    #[test]
    fn safe_action_partition() {
        assert!(Action::List.is_safe());
        assert!(Action::Retrieve.is_safe());
        assert!(!Action::Create.is_safe());
        assert!(!Action::Update.is_safe());
        assert!(!Action::Delete.is_safe());
    }
}
