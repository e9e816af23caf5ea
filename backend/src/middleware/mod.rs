//! Actix middleware shared by every route.
//!
//! [`Trace`] gives each request a trace identifier, runs the handler inside a
//! `request` span and echoes the identifier in the `trace-id` header.

pub mod trace;

pub use trace::Trace;
