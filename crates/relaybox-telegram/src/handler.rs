// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts Telegram messages into dispatcher input.
//!
//! Every platform-specific field is read here, once, into an explicit
//! [`UploadRequest`]. Missing values get fixed defaults: the filename
//! becomes `"{type}_{unique_id}"`, the size zero, the MIME type the
//! default for the file type.

use relaybox_bot::Sender;
use relaybox_core::types::{ChatTarget, FileSource, FileType, UserProfile};
use relaybox_registry::{UploadRequest, format_file_size};
use teloxide::types::{FileMeta, Message};

/// Longest text message the Bot API accepts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// The sender of a message, or `None` for anonymous posts.
pub fn sender_of(msg: &Message) -> Option<Sender> {
    let user = msg.from.as_ref()?;
    Some(Sender {
        chat: ChatTarget(msg.chat.id.0),
        profile: UserProfile {
            user_id: user.id.0 as i64,
            username: user.username.clone(),
            first_name: Some(user.first_name.clone()),
            last_name: user.last_name.clone(),
        },
    })
}

struct Attachment<'a> {
    meta: &'a FileMeta,
    file_type: FileType,
    file_name: Option<String>,
    mime_type: Option<String>,
}

fn attachment(msg: &Message) -> Option<Attachment<'_>> {
    if let Some(doc) = msg.document() {
        return Some(Attachment {
            meta: &doc.file,
            file_type: FileType::Document,
            file_name: doc.file_name.clone(),
            mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
        });
    }
    // Telegram provides multiple sizes; the last one is the largest.
    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(Attachment {
            meta: &largest.file,
            file_type: FileType::Photo,
            file_name: None,
            mime_type: None,
        });
    }
    if let Some(video) = msg.video() {
        return Some(Attachment {
            meta: &video.file,
            file_type: FileType::Video,
            file_name: video.file_name.clone(),
            mime_type: video.mime_type.as_ref().map(|m| m.to_string()),
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(Attachment {
            meta: &audio.file,
            file_type: FileType::Audio,
            file_name: audio.file_name.clone(),
            mime_type: audio.mime_type.as_ref().map(|m| m.to_string()),
        });
    }
    None
}

/// Builds an upload request from a file message.
///
/// Returns `None` for messages without a supported attachment. Owner and
/// reply chat are filled in by the dispatcher.
pub fn upload_request(msg: &Message) -> Option<UploadRequest> {
    let Attachment {
        meta,
        file_type,
        file_name,
        mime_type,
    } = attachment(msg)?;

    let filename = file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{file_type}_{}", meta.unique_id));

    Some(UploadRequest {
        source: FileSource::Remote(meta.id.to_string()),
        filename,
        file_size: u64::from(meta.size),
        file_type,
        mime_type: mime_type.or_else(|| Some(file_type.default_mime().to_string())),
        owner_user_id: None,
        is_private: false,
        reply_to: None,
    })
}

/// Interim reply shown while an upload is in flight.
pub fn processing_text(request: &UploadRequest) -> String {
    format!(
        "Processing file upload...\n\nName: {}\nSize: {}\nType: {}\n\nPlease wait.",
        request.filename,
        format_file_size(request.file_size),
        request.file_type
    )
}

/// Splits a reply into pieces the Bot API accepts, preferring line breaks.
pub fn split_reply(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > MAX_MESSAGE_CHARS && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > MAX_MESSAGE_CHARS {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(MAX_MESSAGE_CHARS) {
                parts.push(chunk.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
