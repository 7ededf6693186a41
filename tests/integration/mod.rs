//! Integration tests for the tarsgen generation pipeline
//!
//! Fake generators are shell scripts, so these suites run on Unix only.

#![cfg(unix)]

mod generation_pipeline;
mod host_integration;
