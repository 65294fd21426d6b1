// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-band text notifications to a chat.

use async_trait::async_trait;

use crate::error::RelayboxError;
use crate::types::ChatTarget;

/// Sends follow-up text messages, used by background side effects to report
/// their results after the primary reply has gone out.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, chat: ChatTarget, text: &str) -> Result<(), RelayboxError>;
}
