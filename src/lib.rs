pub mod config;
pub mod logbook;
pub mod output;
pub mod scoring;
pub mod standings;
pub mod telemetry;
