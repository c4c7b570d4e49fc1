pub mod auth;
pub mod cache;
pub mod details;
pub mod navigation;
pub mod profile;
pub mod resolve;
pub mod search;
