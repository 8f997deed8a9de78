pub mod auth;
pub mod chat;
pub mod groups;
pub mod resources;
pub mod sessions;
