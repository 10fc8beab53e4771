//! Corporate Memory query runner - eccenca Corporate Memory as a SPARQL
//! data source for BI tools.
//!
//! This library exposes the core modules for use by hosts and integration tests.

pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod registry;
pub mod result;
pub mod runner;
pub mod safety;
pub mod schema;
pub mod sparql;

pub use error::{Result, RunnerError};
pub use result::translate;
pub use runner::{CorporateMemoryRunner, QueryRunner};
