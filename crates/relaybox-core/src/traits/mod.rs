// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod analyzer;
pub mod mirror;
pub mod notifier;
pub mod relay;
pub mod shortener;
pub mod store;

pub use adapter::PluginAdapter;
pub use analyzer::{AnalysisInput, FileAnalyzer};
pub use mirror::DriveMirror;
pub use notifier::Notifier;
pub use relay::RelayChannel;
pub use shortener::UrlShortener;
pub use store::MetadataStore;
