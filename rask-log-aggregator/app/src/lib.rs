#![warn(rust_2018_idioms)]

pub mod config;
pub mod domain;
pub mod error;
pub mod healthcheck;
pub mod log_exporter;

pub use healthcheck::{healthcheck, healthcheck_with_port};
