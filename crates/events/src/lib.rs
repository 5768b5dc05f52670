//! In-process audit event fan-out.

pub mod bus;

pub use bus::{AuditEvent, EventBus};
