// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for relaybox integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic
//! tests without Telegram or any HTTP service.
//!
//! # Components
//!
//! - [`MockRelay`] - In-memory relay channel with call counters and failure injection
//! - [`MockNotifier`] - Captures notifications
//! - [`MockMirror`], [`MockAnalyzer`], [`MockShortener`] - Side-service doubles
//! - [`SequenceIds`] - Deterministic identifier source
//! - [`TestHarness`] - Registry and dispatcher over a temp SQLite database

pub mod harness;
pub mod ids;
pub mod mock_relay;
pub mod mock_services;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use ids::SequenceIds;
pub use mock_relay::{MockNotifier, MockRelay};
pub use mock_services::{MockAnalyzer, MockMirror, MockShortener};
