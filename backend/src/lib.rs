pub mod configuration;
pub mod errors;
pub mod modules;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;

pub use routes::app;
