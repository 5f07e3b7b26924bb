// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaid message arrow tokens.
//!
//! Tokens overlap as substrings (`-->>` contains `-->`, which contains `->`), so matching is
//! longest-first in a fixed priority order: bidirectional tokens, then cross/open-async tokens,
//! then plain tokens.

use memchr::Memchr2;

use crate::model::ArrowType;

const SCAN_ORDER: [(&str, ArrowType); 10] = [
    ("<<-->>", ArrowType::DottedBidirectional),
    ("<<->>", ArrowType::SolidBidirectional),
    ("--x", ArrowType::DottedCross),
    ("--)", ArrowType::DottedOpen),
    ("-x", ArrowType::SolidCross),
    ("-)", ArrowType::SolidOpen),
    ("-->>", ArrowType::DottedArrow),
    ("->>", ArrowType::SolidArrow),
    ("-->", ArrowType::Dotted),
    ("->", ArrowType::Solid),
];

/// All ten literals, in scan priority order.
pub fn tokens() -> impl Iterator<Item = &'static str> {
    SCAN_ORDER.iter().map(|(token, _)| *token)
}

pub fn token_for(arrow: ArrowType) -> &'static str {
    match arrow {
        ArrowType::Solid => "->",
        ArrowType::Dotted => "-->",
        ArrowType::SolidArrow => "->>",
        ArrowType::DottedArrow => "-->>",
        ArrowType::SolidBidirectional => "<<->>",
        ArrowType::DottedBidirectional => "<<-->>",
        ArrowType::SolidCross => "-x",
        ArrowType::DottedCross => "--x",
        ArrowType::SolidOpen => "-)",
        ArrowType::DottedOpen => "--)",
    }
}

/// Exact lookup; `None` for anything that is not one of the ten literals.
pub fn type_for(token: &str) -> Option<ArrowType> {
    SCAN_ORDER
        .iter()
        .find(|(literal, _)| *literal == token)
        .map(|(_, arrow)| *arrow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowMatch {
    pub start: usize,
    pub end: usize,
    pub arrow: ArrowType,
}

/// Iterates arrow tokens in `haystack` from left to right.
///
/// At each candidate position the longest token wins. Matches may overlap (`-->>` at `i` is
/// followed by `->>` at `i + 1`); callers pick the first split that yields valid endpoints.
pub fn find_arrows(haystack: &str) -> ArrowMatches<'_> {
    ArrowMatches {
        haystack,
        candidates: memchr::memchr2_iter(b'-', b'<', haystack.as_bytes()),
    }
}

pub fn contains_arrow(haystack: &str) -> bool {
    find_arrows(haystack).next().is_some()
}

pub struct ArrowMatches<'h> {
    haystack: &'h str,
    candidates: Memchr2<'h>,
}

impl Iterator for ArrowMatches<'_> {
    type Item = ArrowMatch;

    fn next(&mut self) -> Option<Self::Item> {
        for start in self.candidates.by_ref() {
            // Candidates are ASCII bytes, so `start` is always a char boundary.
            let rest = &self.haystack[start..];
            if let Some((token, arrow)) = SCAN_ORDER
                .iter()
                .find(|(token, _)| rest.starts_with(token))
            {
                return Some(ArrowMatch {
                    start,
                    end: start + token.len(),
                    arrow: *arrow,
                });
            }
        }
        None
    }
}
