//! `tabular-predict` library crate.
//!
//! The binary (`predict`) is a thin wrapper around this library. The core flow
//! is form -> feature encoder -> inference adapter -> report/TUI, and each step
//! is testable without a terminal or a model file on disk.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod encode;
pub mod error;
pub mod form;
pub mod inference;
pub mod io;
pub mod model;
pub mod plot;
pub mod report;
pub mod tui;
