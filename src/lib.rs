//! Ports avatar animator controllers between two runtimes whose driving
//! parameters have different types.
//!
//! The [`migrate`] module holds the engine: it reconciles the two parameter
//! schemas, rewrites every transition guard of a (nested) state-machine graph
//! so its behavior survives the type change, and splits transitions where one
//! guard has no single equivalent. [`graph`] is the in-memory data model the
//! host hands over; [`controller`] covers override controllers and output
//! naming.

pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod migrate;

pub use config::RigportConfig;
pub use controller::ControllerAsset;
pub use error::{MigrationError, Notice};
pub use graph::Graph;
pub use migrate::{MigrationReport, Migrator};
