//! # ModKit - shared REST plumbing
//!
//! Pieces every HTTP-facing module leans on:
//!
//! - a type-safe [`OperationBuilder`] that registers a route on an axum
//!   `Router` and describes it to an [`OpenApiRegistry`] in one go
//! - the RFC 9457 [`Problem`] envelope
//! - helpers for decoding JSON request bodies with readable error details

pub use anyhow::Result;

pub mod api;
pub use api::{OpenApiRegistry, OperationBuilder, RequestCtx};

pub use api::problem::{Problem, ProblemResponse};
