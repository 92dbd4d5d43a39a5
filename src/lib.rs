pub mod auth;
pub mod configuration;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod testutils;
pub mod users;
pub mod validators;
