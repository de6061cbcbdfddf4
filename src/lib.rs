pub mod config;
pub mod dataset;
pub mod error;
pub mod http_client;
pub mod matchup;
pub mod metrics;
pub mod normalize;
pub mod schema;
pub mod season;
pub mod stats_api;
pub mod table;
pub mod telemetry;
pub mod update;
