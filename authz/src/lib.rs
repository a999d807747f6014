//! Authorization engine for the Marquee catalogue service.
//!
//! This crate maps `(principal, action, resource)` to an allow/deny
//! decision. It has three layers:
//!
//! 1. **Identity model** ([`types`]): the closed [`types::Role`] set and
//!    the [`types::Principal`] privilege predicates (`is_admin`,
//!    `is_elevated`, `is_plain_user`). These are the only building
//!    blocks the rules compose; no call site re-derives "is this user
//!    privileged" on its own.
//! 2. **Rules** ([`rules`]): immutable [`rules::Rule`] values, each a
//!    pure function of the request. Rule sets compose with AND
//!    semantics; one denial is decisive.
//! 3. **Policy bindings** ([`policy`]): the fixed wiring from resource
//!    kind to rule sets, exposed through a single
//!    [`policy::authorize`] entry point plus the role-mutation guard
//!    [`policy::can_mutate_role`].
//!
//! Everything here is synchronous, allocation-light, and free of I/O;
//! the account lookup that produces a `Principal` happens in the API
//! layer before authorization runs. Deny-by-default applies throughout:
//! an anonymous principal passes only rules that explicitly admit
//! unauthenticated reads.

pub mod policy;
pub mod rules;
pub mod types;

pub use policy::{authorize, can_mutate_role, policy_for, Denial, Policy};
pub use rules::Rule;
pub use types::{Action, Principal, ResourceKind, ResourceRef, Role, UnknownRole};
