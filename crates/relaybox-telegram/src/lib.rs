// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram adapter for relaybox.
//!
//! Implements [`RelayChannel`](relaybox_core::RelayChannel) and
//! [`Notifier`](relaybox_core::Notifier) over the Bot API via teloxide, and
//! runs the long-polling loop that feeds the command dispatcher.

pub mod handler;
pub mod polling;
pub mod relay;

pub use polling::run_polling;
pub use relay::TelegramRelay;
