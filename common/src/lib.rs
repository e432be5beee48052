pub mod builders;
pub mod config;
pub mod domain;
pub mod repositories;
pub mod services;

pub use builders::{build_all, Services};
pub use config::settings;
