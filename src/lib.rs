//! # Drupal benchmark
//!
//! A [Goose](https://docs.rs/goose/) load test that measures how quickly a
//! Drupal site renders its module administration page for a logged in
//! administrator.
//!
//! Each Goose user logs in once with a one-time login link (as generated by
//! `drush user:login`) read from the `ULI` environment variable, then loads
//! `/admin/modules` for as long as the load test runs. Everything else (user
//! launching, scheduling, metrics, reports, logging, Gaggles) is handled by
//! Goose, and all of Goose's command line options are available.
//!
//! ## Running the benchmark
//!
//! ```bash
//! $ export ULI=$(drush uli --uri=https://drupal.ddev.site)
//! $ cargo run --release -- --users 10 --hatch-rate 2 --run-time 30s
//! ```
//!
//! If `--host` is not set, the scheme, host and port of `ULI` are used.
//! Certificate verification is disabled for every request made by the
//! simulated users, so local sites with self-signed certificates can be
//! tested.
//!
//! ## Submitting results
//!
//! When `BENCHMARK_SUBMIT_URL` is set, the request statistics are posted as a
//! `{ "metadata": ..., "stats": [...] }` record to the benchmark results site
//! once the load test finishes. `BENCHMARK_RESULTS_FILE` writes the same record
//! to a local file instead (or as well). See the [`report`] module for the
//! metadata read from the environment.
//!
//! ## License
//!
//! Copyright 2025 Drupal benchmark contributors
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//! <http://www.apache.org/licenses/LICENSE-2.0>
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

#[macro_use]
extern crate log;

pub mod report;
pub mod session;
pub mod user;

use goose::GooseError;
use std::{fmt, io};

/// User agent sent by the simulated users and by result submissions.
pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// An enumeration of all errors the benchmark can return.
#[derive(Debug)]
pub enum BenchmarkError {
    /// Wraps a [`goose::GooseError`](https://docs.rs/goose/*/goose/enum.GooseError.html).
    Goose(GooseError),
    /// Wraps a [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html).
    Io(io::Error),
    /// Wraps a [`reqwest::Error`](https://docs.rs/reqwest/*/reqwest/struct.Error.html).
    Reqwest(reqwest::Error),
    /// Wraps a [`serde_json::Error`](https://docs.rs/serde_json/*/serde_json/struct.Error.html).
    Json(serde_json::Error),
    /// The environment variable holding the one-time login link is not set.
    MissingLoginUrl {
        /// The environment variable that was read.
        variable: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// The benchmark results site did not accept the submitted results.
    SubmitRejected {
        /// The HTTP status code returned by the results site.
        status: u16,
        /// The response body, usually a JSON message.
        body: String,
    },
}
/// Implement a helper to provide a text description of all possible types of errors.
impl BenchmarkError {
    fn describe(&self) -> &str {
        match *self {
            BenchmarkError::Goose(_) => "goose::GooseError",
            BenchmarkError::Io(_) => "io::Error",
            BenchmarkError::Reqwest(_) => "reqwest::Error",
            BenchmarkError::Json(_) => "serde_json::Error",
            BenchmarkError::MissingLoginUrl { .. } => "login url not configured",
            BenchmarkError::SubmitRejected { .. } => "benchmark results rejected",
        }
    }
}

/// Implement format trait to allow displaying errors.
impl fmt::Display for BenchmarkError {
    // Implement display of error with `{}` marker.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BenchmarkError::Goose(ref source) => {
                write!(f, "BenchmarkError: {} ({})", self.describe(), source)
            }
            BenchmarkError::Io(ref source) => {
                write!(f, "BenchmarkError: {} ({})", self.describe(), source)
            }
            BenchmarkError::Reqwest(ref source) => {
                write!(f, "BenchmarkError: {} ({})", self.describe(), source)
            }
            BenchmarkError::Json(ref source) => {
                write!(f, "BenchmarkError: {} ({})", self.describe(), source)
            }
            BenchmarkError::MissingLoginUrl {
                ref variable,
                ref detail,
            } => write!(
                f,
                "BenchmarkError: {} ({}: {})",
                self.describe(),
                variable,
                detail
            ),
            BenchmarkError::SubmitRejected { status, ref body } => write!(
                f,
                "BenchmarkError: {} (status {}: {})",
                self.describe(),
                status,
                body
            ),
        }
    }
}

// Define the lower level source of this error, if any.
impl std::error::Error for BenchmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            BenchmarkError::Goose(ref source) => Some(source),
            BenchmarkError::Io(ref source) => Some(source),
            BenchmarkError::Reqwest(ref source) => Some(source),
            BenchmarkError::Json(ref source) => Some(source),
            _ => None,
        }
    }
}

/// Auto-convert Goose errors.
impl From<GooseError> for BenchmarkError {
    fn from(err: GooseError) -> BenchmarkError {
        BenchmarkError::Goose(err)
    }
}

/// Auto-convert IO errors.
impl From<io::Error> for BenchmarkError {
    fn from(err: io::Error) -> BenchmarkError {
        BenchmarkError::Io(err)
    }
}

/// Auto-convert Reqwest errors.
impl From<reqwest::Error> for BenchmarkError {
    fn from(err: reqwest::Error) -> BenchmarkError {
        BenchmarkError::Reqwest(err)
    }
}

/// Auto-convert serde_json errors.
impl From<serde_json::Error> for BenchmarkError {
    fn from(err: serde_json::Error) -> BenchmarkError {
        BenchmarkError::Json(err)
    }
}
