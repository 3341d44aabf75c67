//! strata - model-driven data API core
//!
//! Declarative schemas compile to SQL and OData requests are served through
//! a fixed pipeline with pluggable extension points. This crate holds the
//! two subsystems at the center of that pipeline: the multi-version
//! abstract-SQL model translator and the transactional request-lifecycle
//! hook engine. Parsing, permissions, SQL compilation, and transport are
//! external collaborators consumed through the contracts in [`core`].

pub mod core;
pub mod hooks;
pub mod model;
pub mod translator;
