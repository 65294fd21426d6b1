// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long polling front end.
//!
//! Each incoming message is routed to the command dispatcher. Uploads get an
//! interim "processing" reply that is edited in place once the registry
//! answers.

use std::sync::Arc;
use std::time::Duration;

use relaybox_bot::{Dispatcher as CommandDispatcher, Sender};
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handler;

/// Polls Telegram until `shutdown` is cancelled.
///
/// In-flight handlers finish before this returns.
pub async fn run_polling(bot: Bot, commands: Arc<CommandDispatcher>, shutdown: CancellationToken) {
    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let commands = Arc::clone(&commands);
        async move {
            handle_message(&bot, &commands, &msg).await;
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .default_handler(|_| async {}) // Silently ignore non-message updates
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        info!("stopping Telegram polling");
        loop {
            match token.shutdown() {
                Ok(done) => {
                    done.await;
                    break;
                }
                // Not running yet; try again once it is.
                Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
    });

    info!("starting Telegram long polling");
    dispatcher.dispatch().await;
    debug!("Telegram polling stopped");
}

async fn handle_message(bot: &Bot, commands: &CommandDispatcher, msg: &Message) {
    let Some(sender) = handler::sender_of(msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring message without sender");
        return;
    };

    if let Some(request) = handler::upload_request(msg) {
        handle_upload(bot, commands, &sender, msg, request).await;
        return;
    }

    let Some(text) = msg.text() else {
        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
        return;
    };
    if let Some(reply) = commands.handle_text(&sender, text).await {
        send_reply(bot, msg.chat.id, &reply).await;
    }
}

async fn handle_upload(
    bot: &Bot,
    commands: &CommandDispatcher,
    sender: &Sender,
    msg: &Message,
    request: relaybox_registry::UploadRequest,
) {
    let progress = bot
        .send_message(msg.chat.id, handler::processing_text(&request))
        .await;
    let reply = commands.handle_upload(sender, request).await;

    match progress {
        Ok(sent) => {
            if let Err(e) = bot.edit_message_text(msg.chat.id, sent.id, &reply).await {
                warn!(error = %e, "failed to edit progress message, sending reply");
                send_reply(bot, msg.chat.id, &reply).await;
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to send progress message");
            send_reply(bot, msg.chat.id, &reply).await;
        }
    }
}

async fn send_reply(bot: &Bot, chat: ChatId, text: &str) {
    for part in handler::split_reply(text) {
        if let Err(e) = bot.send_message(chat, part).await {
            warn!(chat_id = chat.0, error = %e, "failed to send reply");
            return;
        }
    }
}
