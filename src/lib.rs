//! Tokari Wallet - A TUI wallet for custom tokens on the Tokari network.
//!
//! This library provides:
//! - Token identity parsing and configuration-string handling
//! - Registration validation against the local registry and the network
//! - A persistent per-network trusted-token registry
//! - An HTTP client for the Tokari node API

pub mod config;
pub mod domain;
pub mod infra;
