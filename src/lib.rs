pub mod auth;
pub mod clients;
pub mod configuration;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod token;
pub mod validators;
