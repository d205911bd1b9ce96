//! Airflow Operators
//!
//! Palette templates for the Airflow operators the DAG builder offers.
//! Each template registers itself at link time, so
//! `PaletteRegistry::with_builtins()` sees every operator in this crate
//! once it is linked.
//!
//! # Categories
//!
//! - **Definition**: The DAG block every graph hangs off
//! - **Util**: Placeholders and cross-DAG triggers
//! - **Bash / Python**: Shell commands, callables and branching
//! - **SQL / Database**: Queries against relational databases
//! - **Sensor**: Tasks that wait for an external condition
//! - **Transfer**: SFTP file movement
//! - **Google Cloud**: BigQuery and Cloud Storage

pub mod bash;
pub mod dag;
pub mod database;
pub mod google_cloud;
pub mod python;
pub mod sensor;
pub mod sql;
pub mod transfer;
pub mod util;

// Re-export all operators for convenience
pub use bash::*;
pub use dag::*;
pub use database::*;
pub use google_cloud::*;
pub use python::*;
pub use sensor::*;
pub use sql::*;
pub use transfer::*;
pub use util::*;
