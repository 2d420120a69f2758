//! Core types shared across dirtygraph facilities
//!
//! This crate provides the canonical schema constants used by both the
//! error facility and the logging facility of `dirtygraph-core`:
//!
//! - **Field keys**: component, op, event, duration and entity identifiers
//! - **Event names**: operation start, end and error boundaries

pub mod schema;

pub use schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
