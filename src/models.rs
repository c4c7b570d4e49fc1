pub mod auth;
pub mod dashboard;
pub mod geography;
pub mod ids;
pub mod poi;
pub mod profile;
