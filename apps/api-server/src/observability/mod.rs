//! Observability - alerting on ERROR events.

mod alert;

pub use alert::{AlertConfig, AlertLayer};
