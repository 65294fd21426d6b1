// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed reply texts.

use relaybox_registry::format_file_size;

pub fn welcome(max_file_size: u64) -> String {
    format!(
        "Welcome to relaybox!\n\n\
         Files:\n\
         - Upload files up to {max}\n\
         - Download files with unique IDs\n\
         - Any file format\n\n\
         Links:\n\
         - Shorten long URLs\n\n\
         Drive backup:\n\
         - Uploaded files are copied to Google Drive when configured\n\n\
         AI assistant:\n\
         - Ask questions about your files\n\n\
         Commands:\n\
         /help - Detailed help\n\
         /upload - How to upload\n\
         /download <file_id> - Download a file\n\
         /short <url> [alias] - Shorten a URL\n\
         /ai [file_id] <question> - Ask the AI assistant\n\
         /myfiles [page] - List your files\n\
         /delete <file_id> - Delete one of your files\n\
         /stats - Storage statistics\n\n\
         Send me any file to get started.",
        max = format_file_size(max_file_size)
    )
}

pub fn help(max_file_size: u64) -> String {
    format!(
        "Help\n\n\
         File operations:\n\
         - Send any file (up to {max}) to upload it\n\
         - /download <file_id> sends it back\n\
         - /myfiles lists your uploads, /delete <file_id> removes one\n\n\
         URL shortening:\n\
         - /short https://example.com/very/long/url\n\
         - /short example.com my-alias\n\n\
         AI assistant:\n\
         - /ai What is a checksum?\n\
         - /ai <file_id> Summarize this document\n\n\
         File size limit: {max} per file",
        max = format_file_size(max_file_size)
    )
}

pub fn upload(max_file_size: u64) -> String {
    format!(
        "Ready to upload!\n\n\
         Send me any file and I will:\n\
         - Store it in the storage channel\n\
         - Give you a unique file ID\n\
         - Copy it to Google Drive if configured\n\n\
         Maximum file size: {}",
        format_file_size(max_file_size)
    )
}

pub const DOWNLOAD_USAGE: &str =
    "Missing file ID\n\nUsage: /download <file_id>\nExample: /download 12345678ABC123";

pub const SHORT_USAGE: &str =
    "Missing URL\n\nUsage: /short <url> [alias]\nExample: /short https://example.com/very/long/url";

pub const AI_USAGE: &str = "AI assistant ready!\n\n\
     Ask anything, or ask about one of your files.\n\n\
     Usage: /ai [file_id] <question>\n\
     Example: /ai What is this document about?";

pub const DELETE_USAGE: &str = "Missing file ID\n\nUsage: /delete <file_id>";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help for the list of commands.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texts_mention_the_limit() {
        let max = 5 * 1024 * 1024 * 1024;
        assert!(welcome(max).contains("5.0 GB"));
        assert!(help(max).contains("5.0 GB"));
        assert!(upload(max).contains("5.0 GB"));
    }
}
