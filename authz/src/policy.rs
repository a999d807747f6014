//! Per-resource policy bindings and the `authorize` entry point.
//!
//! The routing layer calls [`authorize`] twice per request at most: once
//! before resource resolution (collection-level, no resource) and once
//! after (object-level, with the resolved resource). A missing resource
//! is the caller's problem (404) and never reaches the rules.

use crate::rules::{all_allow, Rule};
use crate::types::{Action, Principal, ResourceKind, ResourceRef};

/// Why a request was denied.
///
/// The split between `Unauthenticated` and `Forbidden` is decided here,
/// not by the rules: an anonymous principal that fails a rule gets 401,
/// a known principal gets 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No (valid) credentials and the rules required some.
    Unauthenticated,
    /// Authenticated, but the rules deny this action.
    Forbidden,
    /// The operation does not exist for this resource kind, for anyone.
    MethodNotAllowed,
}

/// The rule sets bound to one resource kind.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Checked for every request, with no target resource.
    pub collection: Vec<Rule>,
    /// Checked additionally once the target resource is resolved.
    pub object: Vec<Rule>,
}

/// The fixed policy for a resource kind.
pub fn policy_for(kind: ResourceKind) -> Policy {
    match kind {
        ResourceKind::Category | ResourceKind::Genre | ResourceKind::Title => Policy {
            collection: vec![Rule::AdminOnlyElseReadOnly],
            object: vec![Rule::AdminOnlyElseReadOnly],
        },
        ResourceKind::Review | ResourceKind::Comment => Policy {
            collection: vec![Rule::AuthenticatedOrReadOnly],
            object: vec![Rule::CreateOrAuthorOrElevatedOrReadOnly],
        },
        ResourceKind::Account => Policy {
            collection: vec![Rule::admin_only()],
            object: vec![Rule::admin_only()],
        },
    }
}

/// Single authorization entry point.
///
/// Evaluates the policy bound to `kind` for `principal` performing
/// `action`. Pass `resource` once the target is resolved; collection
/// rules are evaluated first either way and a collection denial is
/// decisive.
pub fn authorize(
    principal: &Principal,
    action: Action,
    kind: ResourceKind,
    resource: Option<&ResourceRef>,
) -> Result<(), Denial> {
    // Category and genre expose no single-item fetch at all. This is a
    // property of the resource, not of the caller, so it precedes the
    // rules and ignores the role entirely.
    if action == Action::Retrieve
        && matches!(kind, ResourceKind::Category | ResourceKind::Genre)
    {
        return Err(Denial::MethodNotAllowed);
    }

    let policy = policy_for(kind);

    if !all_allow(&policy.collection, principal, action, None) {
        return Err(deny(principal));
    }

    if let Some(resource) = resource {
        if !all_allow(&policy.object, principal, action, Some(resource)) {
            return Err(deny(principal));
        }
    }

    Ok(())
}

/// Whether `actor` may change a role field in a mutation payload.
///
/// False exactly for plain users, independent of whose record is being
/// edited; this blocks self-escalation through the self-service path.
pub fn can_mutate_role(actor: &Principal) -> bool {
    !actor.is_plain_user()
}

fn deny(principal: &Principal) -> Denial {
    if principal.is_authenticated() {
        Denial::Forbidden
    } else {
        Denial::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn admin() -> Principal {
        Principal::known("a1", Role::Admin, false)
    }

    fn moderator() -> Principal {
        Principal::known("m1", Role::Moderator, false)
    }

    fn user(id: &str) -> Principal {
        Principal::known(id, Role::User, false)
    }

    #[test]
    fn anyone_may_list_catalogue_entries() {
        for kind in [ResourceKind::Category, ResourceKind::Genre, ResourceKind::Title] {
            assert_eq!(authorize(&Principal::Anonymous, Action::List, kind, None), Ok(()));
            assert_eq!(authorize(&user("u1"), Action::List, kind, None), Ok(()));
        }
    }

    #[test]
    fn only_admins_mutate_catalogue_entries() {
        for kind in [ResourceKind::Category, ResourceKind::Genre, ResourceKind::Title] {
            assert_eq!(
                authorize(&Principal::Anonymous, Action::Create, kind, None),
                Err(Denial::Unauthenticated)
            );
            assert_eq!(
                authorize(&user("u1"), Action::Create, kind, None),
                Err(Denial::Forbidden)
            );
            assert_eq!(
                authorize(&moderator(), Action::Delete, kind, None),
                Err(Denial::Forbidden)
            );
            assert_eq!(authorize(&admin(), Action::Create, kind, None), Ok(()));
        }
    }

    #[test]
    fn category_and_genre_retrieve_is_never_allowed() {
        for kind in [ResourceKind::Category, ResourceKind::Genre] {
            for principal in [Principal::Anonymous, user("u1"), admin()] {
                assert_eq!(
                    authorize(&principal, Action::Retrieve, kind, None),
                    Err(Denial::MethodNotAllowed)
                );
            }
        }
        // Titles are retrievable.
        assert_eq!(
            authorize(&Principal::Anonymous, Action::Retrieve, ResourceKind::Title, None),
            Ok(())
        );
    }

    #[test]
    fn review_create_requires_authentication() {
        assert_eq!(
            authorize(&Principal::Anonymous, Action::Create, ResourceKind::Review, None),
            Err(Denial::Unauthenticated)
        );
        assert_eq!(
            authorize(&user("u1"), Action::Create, ResourceKind::Review, None),
            Ok(())
        );
    }

    #[test]
    fn review_mutation_is_author_or_elevated() {
        let review = ResourceRef::owned_by(ResourceKind::Review, "u1");

        assert_eq!(
            authorize(&user("u1"), Action::Update, ResourceKind::Review, Some(&review)),
            Ok(())
        );
        assert_eq!(
            authorize(&user("u2"), Action::Update, ResourceKind::Review, Some(&review)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            authorize(&moderator(), Action::Delete, ResourceKind::Review, Some(&review)),
            Ok(())
        );
        // The collection gate still runs at object level and rejects
        // anonymous mutations before ownership is even considered.
        assert_eq!(
            authorize(&Principal::Anonymous, Action::Delete, ResourceKind::Review, Some(&review)),
            Err(Denial::Unauthenticated)
        );
    }

    #[test]
    fn anyone_may_read_reviews() {
        let review = ResourceRef::owned_by(ResourceKind::Review, "u1");
        assert_eq!(
            authorize(&Principal::Anonymous, Action::Retrieve, ResourceKind::Review, Some(&review)),
            Ok(())
        );
        assert_eq!(
            authorize(&Principal::Anonymous, Action::List, ResourceKind::Review, None),
            Ok(())
        );
    }

    #[test]
    fn account_management_is_admin_only_even_for_reads() {
        assert_eq!(
            authorize(&Principal::Anonymous, Action::List, ResourceKind::Account, None),
            Err(Denial::Unauthenticated)
        );
        assert_eq!(
            authorize(&user("u1"), Action::List, ResourceKind::Account, None),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            authorize(&moderator(), Action::Retrieve, ResourceKind::Account, None),
            Err(Denial::Forbidden)
        );
        assert_eq!(authorize(&admin(), Action::Update, ResourceKind::Account, None), Ok(()));
        assert_eq!(
            authorize(&Principal::known("s1", Role::User, true), Action::List, ResourceKind::Account, None),
            Ok(())
        );
    }

    #[test]
    fn role_mutation_guard() {
        assert!(!can_mutate_role(&user("u1")));
        assert!(!can_mutate_role(&Principal::Anonymous));
        assert!(can_mutate_role(&moderator()));
        assert!(can_mutate_role(&admin()));
        assert!(can_mutate_role(&Principal::known("s1", Role::User, true)));
    }
}
