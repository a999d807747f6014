//! Authorization rules.
//!
//! A rule is an immutable value evaluated as a pure function of
//! `(principal, action, optional resource)`. Rules carry their
//! parameters at construction time; composition happens in the policy
//! layer by AND-ing a slice of rules, where a single denial is decisive.

use serde::{Deserialize, Serialize};

use crate::types::{Action, Principal, ResourceRef, Role};

/// A single authorization rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Safe actions for everyone, mutations for admins only.
    AdminOnlyElseReadOnly,
    /// Authenticated principals whose role is in the set; admins always
    /// pass. Anonymous principals fail closed.
    RoleIn(Vec<Role>),
    /// Safe actions for everyone, mutations for the resource author.
    AuthorOrReadOnly,
    /// Safe actions and creates for everyone the collection gate admits;
    /// other mutations for elevated principals or the resource author.
    CreateOrAuthorOrElevatedOrReadOnly,
    /// Safe actions for everyone, anything else requires authentication.
    AuthenticatedOrReadOnly,
}

impl Rule {
    /// Convenience constructor for the admin-only role gate.
    pub fn admin_only() -> Self {
        Rule::RoleIn(vec![Role::Admin])
    }

    /// Evaluate the rule. `resource` is `None` for collection-level
    /// checks (list/create, before any target is resolved).
    ///
    /// Rules never error: a missing resource or an anonymous principal
    /// simply fails the clauses that need them.
    pub fn allows(&self, principal: &Principal, action: Action, resource: Option<&ResourceRef>) -> bool {
        match self {
            Rule::AdminOnlyElseReadOnly => action.is_safe() || principal.is_admin(),

            Rule::RoleIn(roles) => match principal {
                Principal::Anonymous => false,
                Principal::Known { role, .. } => {
                    principal.is_admin() || roles.contains(role)
                }
            },

            Rule::AuthorOrReadOnly => {
                action.is_safe() || resource.is_some_and(|r| principal.owns(r))
            }

            Rule::CreateOrAuthorOrElevatedOrReadOnly => {
                action.is_safe()
                    || action == Action::Create
                    || principal.is_elevated()
                    || resource.is_some_and(|r| principal.owns(r))
            }

            Rule::AuthenticatedOrReadOnly => action.is_safe() || principal.is_authenticated(),
        }
    }
}

/// Evaluate a rule set with AND semantics: every rule must allow.
pub fn all_allow(
    rules: &[Rule],
    principal: &Principal,
    action: Action,
    resource: Option<&ResourceRef>,
) -> bool {
    rules.iter().all(|rule| rule.allows(principal, action, resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceKind;

    fn admin() -> Principal {
        Principal::known("a1", Role::Admin, false)
    }

    fn staff() -> Principal {
        Principal::known("s1", Role::User, true)
    }

    fn moderator() -> Principal {
        Principal::known("m1", Role::Moderator, false)
    }

    fn user(id: &str) -> Principal {
        Principal::known(id, Role::User, false)
    }

    const ALL_ACTIONS: [Action; 5] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    #[test]
    fn admin_only_else_read_only_allows_all_safe_actions() {
        let rule = Rule::AdminOnlyElseReadOnly;
        for principal in [Principal::Anonymous, user("u1"), moderator(), admin()] {
            assert!(rule.allows(&principal, Action::List, None));
            assert!(rule.allows(&principal, Action::Retrieve, None));
        }
    }

    #[test]
    fn admin_only_else_read_only_denies_mutations_to_non_admins() {
        let rule = Rule::AdminOnlyElseReadOnly;
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(!rule.allows(&Principal::Anonymous, action, None));
            assert!(!rule.allows(&user("u1"), action, None));
            assert!(!rule.allows(&moderator(), action, None));
            assert!(rule.allows(&admin(), action, None));
            assert!(rule.allows(&staff(), action, None));
        }
    }

    #[test]
    fn role_in_fails_closed_for_anonymous() {
        let rule = Rule::RoleIn(vec![Role::Moderator]);
        for action in ALL_ACTIONS {
            assert!(!rule.allows(&Principal::Anonymous, action, None));
        }
    }

    #[test]
    fn role_in_admits_listed_roles_and_admins() {
        let rule = Rule::RoleIn(vec![Role::Moderator]);
        assert!(rule.allows(&moderator(), Action::Update, None));
        assert!(rule.allows(&admin(), Action::Update, None));
        assert!(rule.allows(&staff(), Action::Update, None));
        assert!(!rule.allows(&user("u1"), Action::Update, None));
    }

    #[test]
    fn author_or_read_only_matches_owner() {
        let rule = Rule::AuthorOrReadOnly;
        let review = ResourceRef::owned_by(ResourceKind::Review, "u1");
        for action in ALL_ACTIONS {
            assert!(rule.allows(&user("u1"), action, Some(&review)));
        }
        assert!(!rule.allows(&user("u2"), Action::Delete, Some(&review)));
        assert!(rule.allows(&user("u2"), Action::Retrieve, Some(&review)));
    }

    #[test]
    fn author_or_read_only_without_resource_is_read_only() {
        let rule = Rule::AuthorOrReadOnly;
        assert!(rule.allows(&user("u1"), Action::List, None));
        assert!(!rule.allows(&user("u1"), Action::Update, None));
    }

    #[test]
    fn create_or_author_or_elevated_clauses() {
        let rule = Rule::CreateOrAuthorOrElevatedOrReadOnly;
        let review = ResourceRef::owned_by(ResourceKind::Review, "u1");

        // Safe and create are open (the authentication gate is a
        // separate rule in the policy).
        assert!(rule.allows(&Principal::Anonymous, Action::Retrieve, Some(&review)));
        assert!(rule.allows(&user("u2"), Action::Create, None));

        // Author may mutate their own resource.
        assert!(rule.allows(&user("u1"), Action::Update, Some(&review)));
        assert!(rule.allows(&user("u1"), Action::Delete, Some(&review)));

        // Strangers may not, unless elevated.
        assert!(!rule.allows(&user("u2"), Action::Update, Some(&review)));
        assert!(rule.allows(&moderator(), Action::Delete, Some(&review)));
        assert!(rule.allows(&admin(), Action::Update, Some(&review)));
    }

    #[test]
    fn authenticated_or_read_only() {
        let rule = Rule::AuthenticatedOrReadOnly;
        assert!(rule.allows(&Principal::Anonymous, Action::List, None));
        assert!(!rule.allows(&Principal::Anonymous, Action::Create, None));
        assert!(rule.allows(&user("u1"), Action::Create, None));
    }

    #[test]
    fn and_composition_single_denial_is_decisive() {
        let rules = [Rule::AuthenticatedOrReadOnly, Rule::AdminOnlyElseReadOnly];
        // Authenticated but not admin: first rule passes, second denies.
        assert!(!all_allow(&rules, &user("u1"), Action::Create, None));
        // Order does not matter.
        let reversed = [Rule::AdminOnlyElseReadOnly, Rule::AuthenticatedOrReadOnly];
        assert!(!all_allow(&reversed, &user("u1"), Action::Create, None));
        // Admin passes both.
        assert!(all_allow(&rules, &admin(), Action::Create, None));
    }
}
