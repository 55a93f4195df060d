//! Scripts for compiling, deploying, verifying and exercising the SimpleStorage contract.

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod utils;

/// Our build utils
pub mod build;

/// Our deploy utils
pub mod deploy;

/// Our explorer utils
pub mod verify;

pub mod gas_report;
pub mod output_writer;
pub mod pricing;
pub mod tx;
