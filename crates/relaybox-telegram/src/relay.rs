// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The storage channel as a [`RelayChannel`].
//!
//! Files are posted into a private channel by the bot, which keeps them on
//! Telegram's servers. Downloads forward the stored message to the
//! requester. Side effects pull the bytes back through `getFile`.

use std::time::Duration;

use async_trait::async_trait;
use relaybox_config::model::{FilesConfig, TelegramConfig};
use relaybox_core::types::{
    AdapterType, ChatTarget, FileSource, FileType, HealthStatus, RelayRef, RelayUpload,
};
use relaybox_core::{Notifier, PluginAdapter, RelayChannel, RelayboxError};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId};
use tracing::{debug, info};

use crate::handler::split_reply;

/// Longest caption the Bot API accepts.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Telegram relay channel and notifier.
pub struct TelegramRelay {
    bot: Bot,
    storage_channel: ChatId,
}

impl TelegramRelay {
    /// Builds the bot client.
    ///
    /// Requires `telegram.bot_token` to be set.
    pub fn new(telegram: &TelegramConfig, files: &FilesConfig) -> Result<Self, RelayboxError> {
        let token = telegram.bot_token.as_deref().ok_or_else(|| {
            RelayboxError::Config("telegram.bot_token is required to run the bot".into())
        })?;
        if token.is_empty() {
            return Err(RelayboxError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(telegram.request_timeout_secs))
            .build()
            .map_err(|e| RelayboxError::Relay {
                message: format!("failed to build Telegram HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            bot: Bot::with_client(token, client),
            storage_channel: ChatId(files.storage_channel_id),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn relay_err(action: &str, e: teloxide::RequestError) -> RelayboxError {
    RelayboxError::Relay {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn input_file(source: &FileSource, filename: &str) -> InputFile {
    match source {
        FileSource::Remote(id) => InputFile::file_id(FileId(id.clone())),
        FileSource::Inline(bytes) => {
            InputFile::memory(bytes.clone()).file_name(filename.to_string())
        }
    }
}

/// Cuts a caption to the Bot API limit on a char boundary.
fn clamp_caption(caption: &str) -> String {
    caption.chars().take(MAX_CAPTION_CHARS).collect()
}

#[async_trait]
impl PluginAdapter for TelegramRelay {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Relay
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RelayboxError> {
        debug!("Telegram relay shutting down");
        Ok(())
    }
}

#[async_trait]
impl RelayChannel for TelegramRelay {
    async fn post(&self, upload: &RelayUpload) -> Result<RelayRef, RelayboxError> {
        let chat = self.storage_channel;
        let file = input_file(&upload.source, &upload.filename);
        let caption = clamp_caption(&upload.caption);

        let sent = match upload.file_type {
            FileType::Photo => self.bot.send_photo(chat, file).caption(caption).await,
            FileType::Video => self.bot.send_video(chat, file).caption(caption).await,
            FileType::Audio => self.bot.send_audio(chat, file).caption(caption).await,
            FileType::Document | FileType::Other => {
                self.bot.send_document(chat, file).caption(caption).await
            }
        }
        .map_err(|e| relay_err("post to storage channel", e))?;

        info!(
            channel_id = sent.chat.id.0,
            message_id = sent.id.0,
            "file stored in channel"
        );
        Ok(RelayRef {
            channel_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn redeliver(&self, at: RelayRef, destination: ChatTarget) -> Result<(), RelayboxError> {
        self.bot
            .forward_message(
                ChatId(destination.0),
                ChatId(at.channel_id),
                MessageId(at.message_id),
            )
            .await
            .map_err(|e| relay_err("forward stored message", e))?;
        Ok(())
    }

    async fn fetch(&self, source: &FileSource) -> Result<Vec<u8>, RelayboxError> {
        let id = match source {
            FileSource::Inline(bytes) => return Ok(bytes.clone()),
            FileSource::Remote(id) => id,
        };

        let file = self
            .bot
            .get_file(FileId(id.clone()))
            .await
            .map_err(|e| relay_err("get file info", e))?;

        let mut buf = Vec::new();
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .map_err(|e| RelayboxError::Relay {
                message: format!("failed to download file: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(size = buf.len(), "downloaded file from Telegram");
        Ok(buf)
    }
}

#[async_trait]
impl Notifier for TelegramRelay {
    async fn notify(&self, chat: ChatTarget, text: &str) -> Result<(), RelayboxError> {
        for part in split_reply(text) {
            self.bot
                .send_message(ChatId(chat.0), part)
                .await
                .map_err(|e| relay_err("send notification", e))?;
        }
        Ok(())
    }
}
