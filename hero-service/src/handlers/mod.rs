pub mod health;
pub mod heroes;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use heroes::{create_hero, delete_hero, get_hero, list_heroes, update_hero};
