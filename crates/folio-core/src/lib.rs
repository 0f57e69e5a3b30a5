//! # Folio Core
//!
//! The domain layer of the Folio publishing backend.
//! This crate holds the content entities, the role/visibility/ownership
//! policies, the publication lifecycle and the use cases that tie them
//! together. It has no infrastructure dependencies; storage and
//! notification delivery are reached through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use lifecycle::PublicationLifecycle;
pub use policy::{Mutation, Requester};
pub use service::BlogService;
