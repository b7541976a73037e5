// Profiles, their descriptions, and the approval-token lifecycle.

pub mod handlers;
pub mod store;
pub mod workflow;
