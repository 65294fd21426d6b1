// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for operations on stored entities.

pub mod ai_log;
pub mod files;
pub mod links;
pub mod users;
