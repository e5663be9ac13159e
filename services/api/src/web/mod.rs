pub mod auth;
pub mod consultations;
pub mod medicines;
pub mod middleware;
pub mod nutrition;
pub mod rest;
pub mod screenings;
pub mod state;

#[cfg(test)]
pub mod test_support;

pub use middleware::require_auth;
pub use rest::ApiDoc;
