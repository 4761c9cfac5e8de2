//! # taskpad-core
//!
//! Domain vocabulary and pure aggregation for taskpad.
//!
//! This crate provides the shared types all other taskpad crates depend on:
//!
//! - **Tasks**: [`task::Task`] rows of the remote `tasks` table,
//!   [`task::TaskDraft`] creation parameters with validation
//! - **Enums**: [`task::Difficulty`] and [`task::TaskStatus`] with their
//!   lowercase wire forms
//! - **Aggregation**: [`stats::summarize`] deriving difficulty buckets and
//!   completion statistics from an in-memory task list
//! - **Errors**: [`errors::ValidationError`] via `thiserror`
//!
//! ## Crate Position
//!
//! Foundation crate. No I/O, no async; everything here is pure.

#![deny(unsafe_code)]

pub mod errors;
pub mod stats;
pub mod task;
