pub mod artifact;
pub mod config;
pub mod generator;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod telemetry;
