// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML rendering of articles for the Telegram Bot API.
//!
//! Messages use Telegram's HTML parse mode, so every piece of untrusted text
//! (titles, descriptions, source names, URLs) is escaped before interpolation.

use newsbot_core::types::{Article, FavoriteArticle};
use sha2::{Digest, Sha256};

/// Descriptions longer than this many characters are truncated.
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// Length of the identifier carried in callback data.
pub const SHORT_ID_LEN: usize = 10;

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";
const UNKNOWN_SOURCE: &str = "Неизвестный источник";

/// Escapes the characters Telegram's HTML parser treats specially.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Cuts `text` to [`MAX_DESCRIPTION_CHARS`], ending with `...` when shortened.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

fn source_or_unknown(name: &str) -> &str {
    if name.trim().is_empty() {
        UNKNOWN_SOURCE
    } else {
        name
    }
}

/// Renders a delivered article.
pub fn article_html(article: &Article) -> String {
    let description = truncate_description(&article.description);
    format!(
        "<b>{title}</b>\n\n{description}\n\n<i>📰 Источник: {source}</i>\n<i>📅 Опубликовано: {date}</i>\n\n<a href=\"{url}\">Читать полностью →</a>",
        title = escape_html(&article.title),
        description = escape_html(&description),
        source = escape_html(source_or_unknown(&article.source.name)),
        date = article.published_at.format(DATE_FORMAT),
        url = escape_html(&article.url),
    )
}

/// Renders a bookmarked article in the favorites list.
pub fn favorite_html(favorite: &FavoriteArticle) -> String {
    format!(
        "<b>{title}</b>\n\n<i>Источник: {source}</i>\n<i>Опубликовано: {date}</i>\n\n<a href=\"{url}\">Читать полностью</a>",
        title = escape_html(&favorite.title),
        source = escape_html(source_or_unknown(&favorite.source)),
        date = favorite.published_at.format(DATE_FORMAT),
        url = escape_html(&favorite.article_url),
    )
}

/// A stable identifier for `url` that fits in callback data.
///
/// URLs of at most [`SHORT_ID_LEN`] bytes are used as-is; longer URLs map to
/// the first [`SHORT_ID_LEN`] hex digits of their SHA-256.
pub fn short_id(url: &str) -> String {
    if url.len() <= SHORT_ID_LEN {
        return url.to_string();
    }
    let digest = Sha256::digest(url.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(SHORT_ID_LEN);
    id
}
