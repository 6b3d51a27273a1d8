//! # datalog-core
//!
//! Core types and error types for the Datalog import plugin.
//!
//! This crate provides the types shared by every Datalog crate:
//! - Raw stored objects as delivered by the object-storage collaborator
//! - The schema-versioned metadata union and its item variants
//! - Normalized importable data tables and row payloads
//! - Host wire types (requests, responses, items, notifications)
//! - Cross-cutting error types

pub mod constants;
pub mod errors;
pub mod host;
pub mod objects;
pub mod tables;
