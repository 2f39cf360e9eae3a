//! Use-case services over the persistence adapters.
//!
//! # Responsibility
//! - Run load → registry rule → store cycles for each request kind.
//! - Keep transport layers decoupled from storage details.

pub mod registry_service;
