//! Business rule layer.
//!
//! Services wrap the generic repositories with entity-specific rules and
//! take the acting [`SessionContext`](copejem_core::session::SessionContext)
//! explicitly wherever an authorization decision or creator stamp is needed.

pub mod auth;
pub mod member;
pub mod project;

pub use auth::AuthService;
pub use member::{CompanyChoice, MemberService};
pub use project::ProjectService;
