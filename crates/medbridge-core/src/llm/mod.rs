//! LLM provider abstractions for MedBridge.
//!
//! This module defines the core traits and utilities for text-generation
//! transports:
//! - `LlmProvider`: RPITIT trait for concrete transport implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `TransportChain`: primary/secondary fallback over two transports

pub mod box_provider;
pub mod fallback;
pub mod provider;
