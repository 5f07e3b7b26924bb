// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! First pass over a single line: decide which statement it is by its keyword prefix.

use crate::format::mermaid::arrow;
use crate::model::{
    ActivationMarker, NotePlacement, ParticipantKind, SequenceBlockKind, SequenceSectionKind,
};

pub(crate) const HEADER: &str = "sequenceDiagram";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Header,
    Autonumber,
    Title,
    Declaration { kind: ParticipantKind, create: bool },
    Destroy,
    Note(NotePlacement),
    BlockStart(SequenceBlockKind),
    BoxStart,
    Branch(SequenceSectionKind),
    End,
    Activation(ActivationMarker),
    Message,
    Unrecognized,
}

/// A classified line: its kind plus the text following the keyword(s), trimmed.
///
/// For `Message` and `Unrecognized` lines `rest` is the whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Classified<'a> {
    pub kind: LineKind,
    pub line: &'a str,
    pub rest: &'a str,
}

fn split_first_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

fn block_kind(keyword: &str) -> Option<SequenceBlockKind> {
    SequenceBlockKind::ALL
        .into_iter()
        .find(|kind| keyword.eq_ignore_ascii_case(kind.keyword()))
}

fn section_kind(keyword: &str) -> Option<SequenceSectionKind> {
    [
        SequenceSectionKind::Else,
        SequenceSectionKind::And,
        SequenceSectionKind::Option,
    ]
    .into_iter()
    .find(|kind| kind.keyword().is_some_and(|kw| keyword.eq_ignore_ascii_case(kw)))
}

fn declaration_kind(keyword: &str) -> Option<ParticipantKind> {
    [ParticipantKind::Participant, ParticipantKind::Actor]
        .into_iter()
        .find(|kind| keyword.eq_ignore_ascii_case(kind.keyword()))
}

fn classify_note(rest: &str) -> Option<(NotePlacement, &str)> {
    let (first, after_first) = split_first_word(rest);
    if first.eq_ignore_ascii_case("over") {
        return Some((NotePlacement::Over, after_first));
    }
    let placement = if first.eq_ignore_ascii_case("left") {
        NotePlacement::LeftOf
    } else if first.eq_ignore_ascii_case("right") {
        NotePlacement::RightOf
    } else {
        return None;
    };
    let (of, targets) = split_first_word(after_first);
    of.eq_ignore_ascii_case("of").then_some((placement, targets))
}

/// Classifies one trimmed, non-empty, non-comment line.
///
/// Keywords match case-insensitively and only as whole words, so `loopback->>db` is a message.
pub(crate) fn classify(line: &str) -> Classified<'_> {
    let make = |kind, rest| Classified { kind, line, rest };

    if line == HEADER {
        return make(LineKind::Header, "");
    }

    let (keyword, rest) = split_first_word(line);
    let lower = keyword.to_ascii_lowercase();
    match lower.as_str() {
        "autonumber" => return make(LineKind::Autonumber, rest),
        "title" => return make(LineKind::Title, rest),
        "destroy" => return make(LineKind::Destroy, rest),
        "box" => return make(LineKind::BoxStart, rest),
        "activate" => return make(LineKind::Activation(ActivationMarker::Activate), rest),
        "deactivate" => return make(LineKind::Activation(ActivationMarker::Deactivate), rest),
        "end" if rest.is_empty() => return make(LineKind::End, rest),
        "note" => {
            return match classify_note(rest) {
                Some((placement, targets)) => make(LineKind::Note(placement), targets),
                None => make(LineKind::Unrecognized, line),
            };
        }
        "create" => {
            let (decl, decl_rest) = split_first_word(rest);
            return match declaration_kind(decl) {
                Some(kind) => make(LineKind::Declaration { kind, create: true }, decl_rest),
                None => make(LineKind::Unrecognized, line),
            };
        }
        _ => {}
    }

    if let Some(title) = line.strip_prefix("title:") {
        return make(LineKind::Title, title.trim());
    }
    if let Some(kind) = declaration_kind(keyword) {
        return make(
            LineKind::Declaration {
                kind,
                create: false,
            },
            rest,
        );
    }
    if let Some(kind) = block_kind(keyword) {
        return make(LineKind::BlockStart(kind), rest);
    }
    if let Some(kind) = section_kind(keyword) {
        return make(LineKind::Branch(kind), rest);
    }

    if arrow::contains_arrow(line) {
        return make(LineKind::Message, line);
    }
    make(LineKind::Unrecognized, line)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{classify, LineKind};
    use crate::model::{
        ActivationMarker, NotePlacement, ParticipantKind, SequenceBlockKind, SequenceSectionKind,
    };

    #[rstest]
    #[case("sequenceDiagram", LineKind::Header, "")]
    #[case("autonumber", LineKind::Autonumber, "")]
    #[case("autonumber 10 5", LineKind::Autonumber, "10 5")]
    #[case("title Checkout", LineKind::Title, "Checkout")]
    #[case("title: Checkout", LineKind::Title, "Checkout")]
    #[case(
        "participant A as Alice",
        LineKind::Declaration { kind: ParticipantKind::Participant, create: false },
        "A as Alice"
    )]
    #[case(
        "create actor B",
        LineKind::Declaration { kind: ParticipantKind::Actor, create: true },
        "B"
    )]
    #[case("destroy B", LineKind::Destroy, "B")]
    #[case("Note over A,B: hi", LineKind::Note(NotePlacement::Over), "A,B: hi")]
    #[case("note left of A: hi", LineKind::Note(NotePlacement::LeftOf), "A: hi")]
    #[case("Note right  of A: hi", LineKind::Note(NotePlacement::RightOf), "A: hi")]
    #[case("loop Every minute", LineKind::BlockStart(SequenceBlockKind::Loop), "Every minute")]
    #[case("critical", LineKind::BlockStart(SequenceBlockKind::Critical), "")]
    #[case("rect rgb(0, 0, 0)", LineKind::BlockStart(SequenceBlockKind::Rect), "rgb(0, 0, 0)")]
    #[case("box Aqua Group", LineKind::BoxStart, "Aqua Group")]
    #[case("else failure", LineKind::Branch(SequenceSectionKind::Else), "failure")]
    #[case("and", LineKind::Branch(SequenceSectionKind::And), "")]
    #[case("option timeout", LineKind::Branch(SequenceSectionKind::Option), "timeout")]
    #[case("end", LineKind::End, "")]
    #[case("activate A", LineKind::Activation(ActivationMarker::Activate), "A")]
    #[case("deactivate A", LineKind::Activation(ActivationMarker::Deactivate), "A")]
    fn classifies_keyword_lines(#[case] line: &str, #[case] kind: LineKind, #[case] rest: &str) {
        let classified = classify(line);
        assert_eq!(classified.kind, kind);
        assert_eq!(classified.rest, rest);
    }

    #[rstest]
    #[case("A->>B: hi")]
    #[case("loopback->>db: ping")]
    #[case("end->>A: keyword-like id")]
    #[case("Note->>A: keyword-like id")]
    fn keyword_prefixes_without_a_word_boundary_are_messages(#[case] line: &str) {
        assert_eq!(classify(line).kind, LineKind::Message);
    }

    #[rstest]
    #[case("hello world")]
    #[case("Note beside A: hi")]
    #[case("create box X")]
    #[case("end now")]
    fn unknown_lines_are_unrecognized(#[case] line: &str) {
        assert_eq!(classify(line).kind, LineKind::Unrecognized);
    }
}
