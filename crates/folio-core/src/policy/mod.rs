//! Authorization policies.
//!
//! Reads are gated by [`can_view`], writes by [`can_mutate`]. Both take a
//! [`Requester`] whose role has already been resolved by [`effective_role`],
//! so no handler derives role logic on its own.

mod ownership;
mod role;
mod visibility;

pub use ownership::{Mutation, authorize, can_mutate};
pub use role::{Requester, effective_role};
pub use visibility::can_view;
