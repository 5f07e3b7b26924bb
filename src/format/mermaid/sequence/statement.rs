// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed statements: one per significant line, independent of surrounding context.

use crate::format::mermaid::arrow::find_arrows;
use crate::format::mermaid::ident::{participant_id, MermaidIdentError};
use crate::model::{
    ActivationMarker, ArrowType, Autonumber, NotePlacement, NoteTargets, ParticipantId,
    ParticipantKind, SequenceBlockKind, SequenceSectionKind,
};

use super::classify::{Classified, LineKind};
use super::color::split_box_header;
use super::text::unquote;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement {
    Declaration(Declaration),
    Message(MessageStatement),
    Note(NoteStatement),
    BlockStart(BlockStart),
    BoxStart(BoxStart),
    Branch(Branch),
    End,
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
    pub label: Option<String>,
    pub create: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MessageStatement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub arrow: ArrowType,
    pub text: Option<String>,
    pub source_activation: Option<ActivationMarker>,
    pub target_activation: Option<ActivationMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NoteStatement {
    pub placement: NotePlacement,
    pub targets: NoteTargets,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockStart {
    pub kind: SequenceBlockKind,
    pub label: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoxStart {
    pub color: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Branch {
    pub kind: SequenceSectionKind,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    /// `None` is `autonumber off`.
    Autonumber(Option<Autonumber>),
    Title(String),
    Activation {
        participant: ParticipantId,
        marker: ActivationMarker,
    },
    Destroy(ParticipantId),
}

/// Why a line could not be turned into a statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    #[error("not a sequence diagram statement")]
    Unknown,
    #[error("duplicate `sequenceDiagram` header")]
    DuplicateHeader,
    #[error("invalid participant id `{id}`: {reason}")]
    InvalidIdent {
        id: String,
        reason: MermaidIdentError,
    },
    #[error("expected `<id> [as <label>]`")]
    InvalidDeclaration,
    #[error("no arrow splits the line into two valid participant ids")]
    InvalidMessage,
    #[error("conflicting activation markers on the source")]
    ConflictingActivation,
    #[error("note is missing `:` before its text")]
    MissingNoteText,
    #[error("`{placement}` takes exactly one participant")]
    NoteTargetCount { placement: &'static str },
    #[error("invalid autonumber arguments `{args}`")]
    InvalidAutonumber { args: String },
}

fn ident(raw: &str) -> Result<ParticipantId, StatementError> {
    participant_id(raw).map_err(|reason| StatementError::InvalidIdent {
        id: raw.to_owned(),
        reason,
    })
}

fn optional_label(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Turns a classified line into a statement.
pub(crate) fn parse_statement(classified: &Classified<'_>) -> Result<Statement, StatementError> {
    let rest = classified.rest;
    match classified.kind {
        LineKind::Header => Err(StatementError::DuplicateHeader),
        LineKind::Unrecognized => Err(StatementError::Unknown),
        LineKind::Autonumber => parse_autonumber(rest)
            .map(Directive::Autonumber)
            .map(Statement::Directive),
        LineKind::Title => Ok(Statement::Directive(Directive::Title(rest.to_owned()))),
        LineKind::Declaration { kind, create } => parse_declaration(rest, kind, create),
        LineKind::Destroy => Ok(Statement::Directive(Directive::Destroy(ident(rest)?))),
        LineKind::Activation(marker) => Ok(Statement::Directive(Directive::Activation {
            participant: ident(rest)?,
            marker,
        })),
        LineKind::Note(placement) => parse_note(rest, placement),
        LineKind::BlockStart(SequenceBlockKind::Rect) => Ok(Statement::BlockStart(BlockStart {
            kind: SequenceBlockKind::Rect,
            label: None,
            color: optional_label(rest),
        })),
        LineKind::BlockStart(kind) => Ok(Statement::BlockStart(BlockStart {
            kind,
            label: optional_label(rest),
            color: None,
        })),
        LineKind::BoxStart => {
            let (color, label) = split_box_header(rest);
            Ok(Statement::BoxStart(BoxStart { color, label }))
        }
        LineKind::Branch(kind) => Ok(Statement::Branch(Branch {
            kind,
            label: optional_label(rest),
        })),
        LineKind::End => Ok(Statement::End),
        LineKind::Message => parse_message(classified.line).map(Statement::Message),
    }
}

fn parse_autonumber(args: &str) -> Result<Option<Autonumber>, StatementError> {
    if args.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    let invalid = || StatementError::InvalidAutonumber {
        args: args.to_owned(),
    };
    let mut numbers = args
        .split_whitespace()
        .map(|raw| raw.parse::<u32>().map_err(|_| invalid()));
    let start = numbers.next().transpose()?;
    let step = numbers.next().transpose()?;
    if numbers.next().is_some() {
        return Err(invalid());
    }
    Ok(Some(Autonumber { start, step }))
}

fn parse_declaration(
    rest: &str,
    kind: ParticipantKind,
    create: bool,
) -> Result<Statement, StatementError> {
    let (raw_id, after_id) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim_start()),
        None => (rest, ""),
    };
    if raw_id.is_empty() {
        return Err(StatementError::InvalidDeclaration);
    }

    let label = if after_id.is_empty() {
        None
    } else {
        let (keyword, label) = match after_id.find(char::is_whitespace) {
            Some(idx) => (&after_id[..idx], &after_id[idx..]),
            None => (after_id, ""),
        };
        if !keyword.eq_ignore_ascii_case("as") {
            return Err(StatementError::InvalidDeclaration);
        }
        optional_label(label)
    };

    Ok(Statement::Declaration(Declaration {
        id: ident(raw_id)?,
        kind,
        label,
        create,
    }))
}

fn parse_note(rest: &str, placement: NotePlacement) -> Result<Statement, StatementError> {
    let Some((raw_targets, text)) = rest.split_once(':') else {
        return Err(StatementError::MissingNoteText);
    };

    let targets = raw_targets
        .split(',')
        .map(|raw| ident(raw.trim()))
        .collect::<Result<NoteTargets, _>>()?;
    if placement != NotePlacement::Over && targets.len() != 1 {
        return Err(StatementError::NoteTargetCount {
            placement: placement.keyword(),
        });
    }

    Ok(Statement::Note(NoteStatement {
        placement,
        targets,
        text: unquote(text.trim()).to_owned(),
    }))
}

fn split_marker(raw: &str) -> (Option<ActivationMarker>, &str) {
    let mut chars = raw.chars();
    match chars.next().and_then(ActivationMarker::from_symbol) {
        Some(marker) => (Some(marker), chars.as_str().trim_start()),
        None => (None, raw),
    }
}

/// Parses `[+|-]<from><ARROW>[+|-]<to>[: <text>]`.
///
/// Arrow candidates are tried left to right; the first whose surroundings are two valid ids
/// wins, so an id such as `web-app` does not shadow the real arrow further right.
fn parse_message(line: &str) -> Result<MessageStatement, StatementError> {
    let mut first_error = None;
    for candidate in find_arrows(line) {
        match message_at(line, candidate.start, candidate.end, candidate.arrow) {
            Ok(message) => return Ok(message),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or(StatementError::InvalidMessage))
}

fn message_at(
    line: &str,
    start: usize,
    end: usize,
    arrow: ArrowType,
) -> Result<MessageStatement, StatementError> {
    let (prefix_marker, raw_from) = split_marker(line[..start].trim());

    let after_arrow = &line[end..];
    let (raw_target, text) = match after_arrow.split_once(':') {
        Some((target, text)) => (target, Some(unquote(text.trim()).to_owned())),
        None => (after_arrow, None),
    };
    let (target_marker, raw_to) = split_marker(raw_target.trim());

    let invalid = |_: MermaidIdentError| StatementError::InvalidMessage;
    let from = participant_id(raw_from).map_err(invalid)?;
    let to = participant_id(raw_to).map_err(invalid)?;

    let mut source_activation = prefix_marker;
    let mut target_activation = None;
    match target_marker {
        Some(ActivationMarker::Activate) => target_activation = Some(ActivationMarker::Activate),
        Some(ActivationMarker::Deactivate) => {
            if source_activation.is_some() {
                return Err(StatementError::ConflictingActivation);
            }
            source_activation = Some(ActivationMarker::Deactivate);
        }
        None => {}
    }

    Ok(MessageStatement {
        from,
        to,
        arrow,
        text,
        source_activation,
        target_activation,
    })
}
