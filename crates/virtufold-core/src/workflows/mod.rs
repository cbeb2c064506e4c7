//! # Workflows Module
//!
//! High-level entry points that drive a complete optimization run.
//!
//! ## Overview
//!
//! A workflow consumes a sequence string and returns a structured result. It owns
//! the immutable per-sequence data (graph, virtue operators, evolution operator),
//! re-initializes the amplitude store for each run, and reports progress through
//! an optional callback.
//!
//! - **Optimization Workflow** ([`optimize`]) - The iterate, amplify, converge, and
//!   collapse loop behind [`optimize::Engine`].

pub mod optimize;
