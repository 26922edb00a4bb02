//! Test Module
//!
//! Cross-module test suite for the interpreter.
//!
//! ## Test Categories
//! - `engine_tests`: metrics, path classification and web relaxation working together
//! - `orchestrator_tests`: pipeline ordering, failure handling, single in-flight rule
//! - `session_tests`: commit semantics, truncation, export
//! - `integration_tests`: full session against a mocked HTTP generator

pub mod orchestrator_tests;
