pub mod auth;
pub mod client;
pub mod favorites;
pub mod geography;
pub mod images;
pub mod poi;
pub mod profile;
pub mod visited;

pub use auth::AuthRepository;
pub use client::{ApiClient, ApiResponse};
pub use favorites::FavoritesRepository;
pub use geography::GeographyRepository;
pub use images::ImageRepository;
pub use poi::PoiRepository;
pub use profile::ProfileRepository;
pub use visited::VisitedRepository;
