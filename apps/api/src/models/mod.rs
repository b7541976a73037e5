pub mod description;
pub mod profile;
