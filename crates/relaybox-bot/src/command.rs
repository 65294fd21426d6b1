// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash-command parsing.

use relaybox_registry::id::is_well_formed;

/// A parsed chat command. Missing required arguments are kept as `None` so
/// the dispatcher can answer with usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Upload,
    Download { file_id: Option<String> },
    Short { url: Option<String>, alias: Option<String> },
    /// Question for the language model, optionally about one stored file.
    Ai { file_id: Option<String>, question: String },
    MyFiles { page: u32 },
    Delete { file_id: Option<String> },
    Stats,
    Unknown(String),
}

impl Command {
    /// Parses `text` if it is a command. `/cmd@botname` is accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "upload" => Self::Upload,
            "download" => Self::Download {
                file_id: args.first().map(|s| s.to_string()),
            },
            "short" => Self::Short {
                url: args.first().map(|s| s.to_string()),
                alias: args.get(1).map(|s| s.to_string()),
            },
            "ai" => parse_ai(&args),
            "myfiles" => Self::MyFiles {
                page: args
                    .first()
                    .and_then(|s| s.parse::<u32>().ok())
                    .filter(|p| *p > 0)
                    .unwrap_or(1),
            },
            "delete" => Self::Delete {
                file_id: args.first().map(|s| s.to_string()),
            },
            "stats" => Self::Stats,
            _ => Self::Unknown(name),
        };
        Some(command)
    }
}

/// The first well-formed file id among the arguments becomes the file
/// context; everything else is the question.
fn parse_ai(args: &[&str]) -> Command {
    let position = args.iter().position(|a| is_well_formed(a));
    let file_id = position.map(|i| args[i].to_string());
    let question = args
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != position)
        .map(|(_, a)| *a)
        .collect::<Vec<_>>()
        .join(" ");
    Command::Ai { file_id, question }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help@relaybox_bot"), Some(Command::Help));
        assert_eq!(Command::parse("/STATS"), Some(Command::Stats));
        assert_eq!(
            Command::parse("/frobnicate"),
            Some(Command::Unknown("frobnicate".into()))
        );
    }

    #[test]
    fn download_takes_an_id() {
        assert_eq!(
            Command::parse("/download 12345678ABCDEF"),
            Some(Command::Download {
                file_id: Some("12345678ABCDEF".into())
            })
        );
        assert_eq!(
            Command::parse("/download"),
            Some(Command::Download { file_id: None })
        );
    }

    #[test]
    fn short_takes_optional_alias() {
        assert_eq!(
            Command::parse("/short example.com docs"),
            Some(Command::Short {
                url: Some("example.com".into()),
                alias: Some("docs".into())
            })
        );
    }

    #[test]
    fn ai_extracts_file_context() {
        assert_eq!(
            Command::parse("/ai analyze 12345678ABCDEF please"),
            Some(Command::Ai {
                file_id: Some("12345678ABCDEF".into()),
                question: "analyze please".into()
            })
        );
        assert_eq!(
            Command::parse("/ai what is rust"),
            Some(Command::Ai {
                file_id: None,
                question: "what is rust".into()
            })
        );
    }

    #[test]
    fn myfiles_page_defaults_to_one() {
        assert_eq!(Command::parse("/myfiles"), Some(Command::MyFiles { page: 1 }));
        assert_eq!(Command::parse("/myfiles 3"), Some(Command::MyFiles { page: 3 }));
        assert_eq!(Command::parse("/myfiles 0"), Some(Command::MyFiles { page: 1 }));
        assert_eq!(Command::parse("/myfiles x"), Some(Command::MyFiles { page: 1 }));
    }
}
