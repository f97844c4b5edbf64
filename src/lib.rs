// SPDX-License-Identifier: GPL-2.0-or-later
use thiserror::Error as ThisError;

/// An enumeration of errors the clips service library functions can encounter.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("A database error occurred: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to migrate the database: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Clip with id {0} not found")]
    NotFound(i64),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Error streaming file: {0}")]
    UpstreamFetch(String),
    #[error("The database is unavailable after {attempts} attempts")]
    DatabaseUnavailable { attempts: u32 },
    #[error("Metrics could not be registered or encoded: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("Configuration contains invalid values: {0}")]
    ConfigValueError(String),
    #[error("HTTP server encountered an error: {0}")]
    Server(std::io::Error),
}

pub mod cli;
pub mod config;
pub mod db;
pub mod metrics;
pub mod seed;
pub mod stream;
pub mod web;
