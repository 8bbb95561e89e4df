// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-polling dispatcher wiring Telegram updates to [`BotContext`].

use std::sync::Arc;

use newsbot_core::types::{Article, NewUser};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, User as TgUser};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::commands::{BotContext, CallbackAction, Command, Reply};
use crate::format::{article_html, favorite_html, short_id};
use crate::recent::RecentArticles;

const TRY_LATER: &str = "❌ Произошла ошибка. Пожалуйста, попробуйте позже.";

/// A one-button inline keyboard for `action`.
pub fn button_markup(action: &CallbackAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        action.label(),
        action.data(),
    )]])
}

/// Sends `article` with an "add to favorites" button and remembers it for the callback.
pub(crate) async fn send_article(
    bot: &Bot,
    recent: &RecentArticles,
    chat_id: ChatId,
    article: &Article,
) -> Result<(), teloxide::RequestError> {
    let id = recent.remember(article);
    bot.send_message(chat_id, article_html(article))
        .parse_mode(ParseMode::Html)
        .reply_markup(button_markup(&CallbackAction::Favorite(id)))
        .await?;
    Ok(())
}

async fn send_text(bot: &Bot, chat_id: ChatId, text: &str) -> Result<(), teloxide::RequestError> {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn send_reply(
    bot: &Bot,
    ctx: &BotContext,
    chat_id: ChatId,
    reply: Reply,
) -> Result<(), teloxide::RequestError> {
    match reply {
        Reply::Text(text) => send_text(bot, chat_id, &text).await,
        Reply::Article(article) => send_article(bot, &ctx.recent, chat_id, &article).await,
        Reply::Favorite(favorite) => {
            let action = CallbackAction::Unfavorite(short_id(&favorite.article_url));
            bot.send_message(chat_id, favorite_html(&favorite))
                .parse_mode(ParseMode::Html)
                .reply_markup(button_markup(&action))
                .await?;
            Ok(())
        }
    }
}

fn new_user(chat_id: i64, from: &TgUser) -> NewUser {
    NewUser {
        chat_id: newsbot_core::types::ChatId(chat_id),
        username: from.username.clone(),
        first_name: from.first_name.clone(),
        last_name: from.last_name.clone(),
    }
}

async fn on_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let (Some(text), Some(from)) = (msg.text(), msg.from.as_ref()) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let user = match ctx.user_for(new_user(chat_id.0, from)).await {
        Ok(user) => user,
        Err(e) => {
            error!(chat_id = chat_id.0, error = %e, "failed to load user");
            send_text(&bot, chat_id, TRY_LATER).await?;
            return Ok(());
        }
    };

    let replies = match Command::parse(text) {
        Some(command) => {
            if let Some(progress) = command.progress_message() {
                send_text(&bot, chat_id, progress).await?;
            }
            ctx.execute(&user, command).await
        }
        None if text.starts_with('/') => {
            vec![Reply::Text("Неизвестная команда. Список команд: /help".into())]
        }
        None => ctx.handle_text(&user, text).await,
    };

    for reply in replies {
        if let Err(e) = send_reply(&bot, &ctx, chat_id, reply).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
        }
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    // Buttons only appear in private chats, where the chat id is the user id.
    let chat_id = q.from.id.0 as i64;
    let user = match ctx.user_for(new_user(chat_id, &q.from)).await {
        Ok(user) => user,
        Err(e) => {
            error!(chat_id, error = %e, "failed to load user for callback");
            bot.answer_callback_query(q.id.clone()).text(TRY_LATER).await?;
            return Ok(());
        }
    };

    let outcome = ctx.handle_callback(&user, data).await;
    if let (Some(next), Some(message)) = (&outcome.next, q.regular_message())
        && let Err(e) = bot
            .edit_message_reply_markup(message.chat.id, message.id)
            .reply_markup(button_markup(next))
            .await
    {
        warn!(chat_id, error = %e, "failed to update favorites button");
    }

    bot.answer_callback_query(q.id.clone())
        .text(outcome.answer)
        .await?;
    Ok(())
}

/// Runs the long-polling dispatcher until `cancel` fires.
pub async fn run_bot(bot: Bot, ctx: Arc<BotContext>, cancel: CancellationToken) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .default_handler(|_| async {})
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        cancel.cancelled().await;
        match shutdown.shutdown() {
            Ok(done) => done.await,
            Err(_) => debug!("dispatcher was idle at shutdown"),
        }
    });

    info!("starting Telegram long polling");
    dispatcher.dispatch().await;
    info!("Telegram dispatcher stopped");
}
