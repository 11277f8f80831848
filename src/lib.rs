//! Floodgate - Sliding-Window Rate Limiting
//!
//! This crate implements a concurrent, per-identity rate limiter built on a
//! sliding log of request timestamps, together with two small demo
//! collaborators: a pure text-statistics routine and a simulated upstream
//! fetch with a linear retry loop.

pub mod ratelimit;
pub mod analysis;
pub mod fetch;
pub mod config;
pub mod error;
