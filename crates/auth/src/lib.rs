//! `trafficdesk-auth`: pure authentication/authorization boundary.
//!
//! No HTTP and no storage here: what a session *is*, how it may change, and
//! what a session may see.

pub mod credentials;
pub mod guard;
pub mod roles;
pub mod session;

pub use credentials::{Credentials, LoginResponse};
pub use guard::{RouteDecision, authorize_route};
pub use roles::Role;
pub use session::{Session, SessionEvent, SessionTransition};
