// SPDX-License-Identifier: GPL-2.0-or-later
use clap::{Parser, Subcommand};

use crate::config::Config;

/// CLI to start the clips service and manage its database.
///
/// # Logging
///
/// When running the service, log levels and filtering are controlled by tracing_subscriber's
/// EnvFilter using the RUST_LOG environment variable. Refer to the documentation at
/// https://docs.rs/tracing-subscriber/0.3.1/tracing_subscriber/filter/struct.EnvFilter.html
/// for complete details.
///
/// The most basic form is one of "trace", "debug", "info", "warn", or "error". For example:
///
/// RUST_LOG=warn
///
/// # Configuration
///
/// Every option can also be provided through the environment variable listed in its help.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Clips {
    #[command(flatten)]
    pub config: Config,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Wait for the database, create the schema, seed an empty catalog, and serve the HTTP API
    Run,
    /// Wait for the database, create the schema, and insert the example clips if the catalog is
    /// empty
    Seed {
        /// Remove every existing clip before seeding
        #[arg(long)]
        reset: bool,
    },
}
