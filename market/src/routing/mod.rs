//! Route classification and the routing decision.
//!
//! The table is plain data; the decision is a pure function of
//! (access, path, table), so it can be tested without any navigation system.

pub mod decision;
pub mod table;

pub use decision::{decide, Access, RouteDecision};
pub use table::{RoleRoutes, RouteTable};
