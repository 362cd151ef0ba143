//! Flutter-facing bindings for Rollbook core.

pub mod api;
