// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps commands and uploads onto the registry and the side services.

use std::fmt::Write as _;
use std::sync::Arc;

use relaybox_core::types::{ChatTarget, FileRecord, UserProfile};
use relaybox_core::{FileAnalyzer, MetadataStore, UrlShortener};
use relaybox_registry::{
    FileRegistry, RegistrationError, ResolveError, RetireError, UploadRequest, bounded,
    format_file_size,
};
use tracing::{debug, warn};

use crate::command::Command;
use crate::text;
use crate::url::normalize_url;

/// Files shown per `/myfiles` page.
pub const PAGE_SIZE: u32 = 10;

/// Interaction kind recorded for `/ai` questions.
pub const CHAT_KIND: &str = "chat";

/// Who sent a message and where to answer.
#[derive(Debug, Clone)]
pub struct Sender {
    pub chat: ChatTarget,
    pub profile: UserProfile,
}

impl Sender {
    pub fn user_id(&self) -> i64 {
        self.profile.user_id
    }
}

/// Command dispatcher.
pub struct Dispatcher {
    registry: Arc<FileRegistry>,
    store: Arc<dyn MetadataStore>,
    shortener: Option<Arc<dyn UrlShortener>>,
    analyzer: Option<Arc<dyn FileAnalyzer>>,
    admins: Vec<i64>,
}

impl Dispatcher {
    pub fn new(registry: Arc<FileRegistry>, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            registry,
            store,
            shortener: None,
            analyzer: None,
            admins: Vec::new(),
        }
    }

    pub fn with_shortener(mut self, shortener: Arc<dyn UrlShortener>) -> Self {
        self.shortener = Some(shortener);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn FileAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Users allowed to delete files they do not own.
    pub fn with_admins(mut self, admins: Vec<i64>) -> Self {
        self.admins = admins;
        self
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Handles a text message. Returns `None` for text that is not a command.
    pub async fn handle_text(&self, sender: &Sender, text: &str) -> Option<String> {
        let command = Command::parse(text)?;
        self.touch(sender).await;
        debug!(user_id = sender.user_id(), ?command, "command received");
        Some(self.run(sender, command).await)
    }

    /// Registers an uploaded file on behalf of `sender`.
    pub async fn handle_upload(&self, sender: &Sender, mut request: UploadRequest) -> String {
        self.touch(sender).await;
        request.owner_user_id = Some(sender.user_id());
        request.reply_to = Some(sender.chat);

        match self.registry.register_file(request).await {
            Ok(record) => upload_success(&record),
            Err(RegistrationError::FileTooLarge { size, max }) => format!(
                "File too large\n\nFile size: {}\nMaximum allowed: {}\n\nPlease upload a smaller file.",
                format_file_size(size),
                format_file_size(max)
            ),
            Err(e) => {
                warn!(user_id = sender.user_id(), error = %e, "upload failed");
                format!("Upload failed\n\n{}", e.user_message())
            }
        }
    }

    async fn run(&self, sender: &Sender, command: Command) -> String {
        let max = self.registry.options().max_file_size;
        match command {
            Command::Start => text::welcome(max),
            Command::Help => text::help(max),
            Command::Upload => text::upload(max),
            Command::Download { file_id: None } => text::DOWNLOAD_USAGE.to_string(),
            Command::Download { file_id: Some(id) } => self.download(sender, &id).await,
            Command::Short { url: None, .. } => text::SHORT_USAGE.to_string(),
            Command::Short {
                url: Some(url),
                alias,
            } => self.shorten(sender, &url, alias.as_deref()).await,
            Command::Ai { question, file_id } if question.is_empty() && file_id.is_none() => {
                text::AI_USAGE.to_string()
            }
            Command::Ai { file_id, question } => {
                self.ask(sender, file_id.as_deref(), &question).await
            }
            Command::MyFiles { page } => self.my_files(sender, page).await,
            Command::Delete { file_id: None } => text::DELETE_USAGE.to_string(),
            Command::Delete { file_id: Some(id) } => self.delete(sender, &id).await,
            Command::Stats => self.stats(sender).await,
            Command::Unknown(_) => text::UNKNOWN_COMMAND.to_string(),
        }
    }

    async fn touch(&self, sender: &Sender) {
        let timeout = self.registry.options().store_timeout;
        if let Err(e) = bounded(timeout, self.store.touch_user(&sender.profile)).await {
            warn!(user_id = sender.user_id(), error = %e, "failed to update user session");
        }
    }

    async fn download(&self, sender: &Sender, file_id: &str) -> String {
        match self
            .registry
            .resolve_file(file_id, Some(sender.user_id()), sender.chat)
            .await
        {
            Ok(record) => format!(
                "File retrieved\n\nName: {}\nSize: {}\nID: {}",
                record.filename,
                format_file_size(record.file_size),
                record.file_id
            ),
            Err(ResolveError::NotFound(_)) => {
                format!("File not found\n\nNo file found with ID: {file_id}")
            }
            Err(e) => {
                warn!(file_id, error = %e, "download failed");
                format!("Download failed\n\n{}", e.user_message())
            }
        }
    }

    async fn shorten(&self, sender: &Sender, raw_url: &str, alias: Option<&str>) -> String {
        let Some(shortener) = self.shortener.as_ref().filter(|s| s.is_configured()) else {
            return "URL shortening is not configured.".to_string();
        };
        let Some(url) = normalize_url(raw_url) else {
            return format!("Invalid URL\n\n{raw_url} does not look like a web address.");
        };

        let timeout = self.registry.options().side_effect_timeout;
        match bounded(timeout, shortener.shorten(&url, alias)).await {
            Ok(Some(short)) => {
                if let Err(e) = bounded(
                    self.registry.options().store_timeout,
                    self.store
                        .insert_shortened_url(&url, &short, alias, Some(sender.user_id())),
                )
                .await
                {
                    warn!(error = %e, "failed to record shortened url");
                }
                format!("URL shortened\n\nOriginal: {url}\nShortened: {short}")
            }
            Ok(None) => "URL shortening is not configured.".to_string(),
            Err(e) => {
                warn!(url = %url, error = %e, "url shortening failed");
                "URL shortening failed\n\nPlease check the URL and try again.".to_string()
            }
        }
    }

    async fn ask(&self, sender: &Sender, file_id: Option<&str>, question: &str) -> String {
        let Some(analyzer) = self.analyzer.as_ref().filter(|a| a.is_configured()) else {
            return "The AI assistant is not configured.".to_string();
        };

        let context = match file_id {
            Some(id) => match self.registry.lookup_file(id).await {
                Ok(Some(record)) => Some(file_context(&record)),
                Ok(None) => return format!("File not found\n\nNo file found with ID: {id}"),
                Err(e) => {
                    warn!(file_id = id, error = %e, "file lookup for ai failed");
                    return "Error retrieving file. Please try again later.".to_string();
                }
            },
            None => None,
        };
        let question = if question.is_empty() {
            "Describe this file."
        } else {
            question
        };

        let timeout = self.registry.options().side_effect_timeout;
        match bounded(timeout, analyzer.chat(question, context.as_deref())).await {
            Ok(Some(answer)) => {
                if let Err(e) = bounded(
                    self.registry.options().store_timeout,
                    self.store
                        .log_ai_interaction(sender.user_id(), question, &answer, CHAT_KIND),
                )
                .await
                {
                    warn!(error = %e, "failed to log ai interaction");
                }
                format!("AI assistant:\n\n{answer}")
            }
            Ok(None) => "The AI assistant had nothing to say.".to_string(),
            Err(e) => {
                warn!(error = %e, "ai chat failed");
                "AI assistant error\n\nI could not process your request. Please try again."
                    .to_string()
            }
        }
    }

    async fn my_files(&self, sender: &Sender, page: u32) -> String {
        let offset = (page.saturating_sub(1)).saturating_mul(PAGE_SIZE);
        let files = match self
            .registry
            .list_by_owner(sender.user_id(), PAGE_SIZE, offset)
            .await
        {
            Ok(files) => files,
            Err(e) => {
                warn!(user_id = sender.user_id(), error = %e, "listing files failed");
                return "Could not list your files. Please try again later.".to_string();
            }
        };

        if files.is_empty() {
            return if page == 1 {
                "You have no files yet. Send me a file to upload it.".to_string()
            } else {
                format!("No files on page {page}.")
            };
        }

        let mut reply = format!("Your files (page {page}):\n");
        for (i, record) in files.iter().enumerate() {
            let _ = write!(
                reply,
                "\n{}. {} ({}) - {}",
                offset as usize + i + 1,
                record.filename,
                format_file_size(record.file_size),
                record.file_id
            );
        }
        if files.len() as u32 == PAGE_SIZE {
            let _ = write!(reply, "\n\nMore: /myfiles {}", page + 1);
        }
        reply
    }

    async fn delete(&self, sender: &Sender, file_id: &str) -> String {
        let record = match self.registry.lookup_file(file_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return RetireError::NotFound(file_id.to_string()).user_message(),
            Err(e) => {
                warn!(file_id, error = %e, "file lookup for delete failed");
                return RetireError::Storage(e).user_message();
            }
        };

        let is_admin = self.admins.contains(&sender.user_id());
        if record.owner_user_id != Some(sender.user_id()) && !is_admin {
            return "You can only delete your own files.".to_string();
        }

        match self.registry.retire_file(file_id).await {
            Ok(()) => format!("File deleted\n\nID: {file_id}"),
            Err(e) => {
                if e.is_transient() {
                    warn!(file_id, error = %e, "delete failed");
                }
                e.user_message()
            }
        }
    }

    async fn stats(&self, sender: &Sender) -> String {
        let stats = match self.registry.aggregate_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "stats query failed");
                return "Could not load statistics. Please try again later.".to_string();
            }
        };

        let mut reply = format!(
            "Storage statistics\n\nTotal files: {}\nTotal size: {}",
            stats.total_files,
            format_file_size(stats.total_size)
        );
        for (file_type, count) in &stats.counts_by_type {
            let _ = write!(reply, "\n- {file_type}: {count}");
        }

        let timeout = self.registry.options().store_timeout;
        match bounded(timeout, self.store.get_user_session(sender.user_id())).await {
            Ok(Some(session)) => {
                let _ = write!(
                    reply,
                    "\n\nYou\nUploads: {}\nDownloads: {}\nStorage used: {}",
                    session.total_uploads,
                    session.total_downloads,
                    format_file_size(session.storage_used)
                );
            }
            Ok(None) => {}
            Err(e) => warn!(user_id = sender.user_id(), error = %e, "session lookup failed"),
        }
        reply
    }
}

fn upload_success(record: &FileRecord) -> String {
    format!(
        "File uploaded\n\n\
         Name: {name}\n\
         Size: {size}\n\
         Type: {kind}\n\
         File ID: {id}\n\n\
         Download: /download {id}\n\
         Ask AI about it: /ai {id} <question>",
        name = record.filename,
        size = format_file_size(record.file_size),
        kind = record.file_type,
        id = record.file_id,
    )
}

fn file_context(record: &FileRecord) -> String {
    format!(
        "The user is asking about a stored file.\nName: {}\nType: {}\nMIME type: {}\nSize: {}",
        record.filename,
        record.file_type,
        record
            .mime_type
            .as_deref()
            .unwrap_or_else(|| record.file_type.default_mime()),
        format_file_size(record.file_size)
    )
}
