//! Review screens over the wide profile table: resolved listings, field-level
//! saves and per-category approvals.

pub mod handlers;
pub mod resolve;
pub mod store;
pub mod views;
