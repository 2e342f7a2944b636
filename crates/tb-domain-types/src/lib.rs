// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for Taskboard
//!
//! The enumerations a task moves through. They are shared by the REST
//! contract, the SQLite layer and the server so that no other value can ever
//! be persisted or sent over the wire.

pub mod task;
pub mod user;

pub use task::*;
pub use user::*;
