// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn reserved_word_regex() -> &'static Regex {
    static RESERVED: OnceLock<Regex> = OnceLock::new();
    RESERVED.get_or_init(|| Regex::new(r"(?i)\bend\b").expect("valid end regex"))
}

fn is_wrapped_in_quotes(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Strips exactly one layer of surrounding double quotes.
pub(crate) fn unquote(text: &str) -> &str {
    if is_wrapped_in_quotes(text) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// `true` when `text` holds `end` as a standalone word, in any case.
pub(crate) fn contains_reserved_word(text: &str) -> bool {
    reserved_word_regex().is_match(text)
}

/// Replaces raw newlines with `<br>` so the text stays on one line.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains(['\n', '\r']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "<br>").replace(['\n', '\r'], "<br>"))
}

/// Message and note text as written after the `:`.
///
/// Wrapped in quotes when it would otherwise be misread: a standalone `end`, surrounding
/// whitespace that the parser trims, or quotes the parser would strip.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    let text = normalize_newlines(text);
    let needs_quotes = contains_reserved_word(&text)
        || is_wrapped_in_quotes(&text)
        || text.trim() != text.as_ref();
    if needs_quotes {
        Cow::Owned(format!("\"{text}\""))
    } else {
        text
    }
}
