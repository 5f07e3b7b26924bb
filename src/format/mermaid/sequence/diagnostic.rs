// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::ParticipantId;

use super::statement::StatementError;

/// Fatal parse failures. Everything else is reported as a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MermaidSequenceParseError {
    #[error("expected `sequenceDiagram` as the first non-empty line")]
    MissingHeader,
    #[error("strict mode: {0}")]
    Strict(Diagnostic),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unbalanced {
    #[error("`end` without an open block")]
    UnmatchedEnd,
    #[error("`{keyword}` is never closed")]
    Unclosed { keyword: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("skipped `{line}`: {reason}")]
    UnrecognizedStatement {
        line: String,
        reason: StatementError,
    },
    #[error(transparent)]
    UnbalancedBlock(Unbalanced),
    #[error("`{line}` does not continue an open `alt`, `par` or `critical` block")]
    InvalidBranchContext { line: String, attached: bool },
    #[error("`{id}` was never declared or referenced by a message")]
    DanglingReference { id: ParticipantId },
    #[error("block nesting exceeds {max_depth}")]
    NestingTooDeep { max_depth: usize },
    #[error("`box` opened inside another block or box")]
    MisplacedBox,
    #[error("`{id}` already belongs to a box")]
    ParticipantAlreadyBoxed { id: ParticipantId },
    #[error("`{id}` is created after its first use and moves to its creation point")]
    CreateAfterReference { id: ParticipantId },
    #[error("`{id}` is created mid-diagram and cannot belong to a box")]
    CreatedParticipantBoxed { id: ParticipantId },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnrecognizedStatement { .. }
            | Self::UnbalancedBlock(_)
            | Self::NestingTooDeep { .. } => Severity::Error,
            Self::InvalidBranchContext { .. }
            | Self::MisplacedBox
            | Self::ParticipantAlreadyBoxed { .. }
            | Self::CreateAfterReference { .. }
            | Self::CreatedParticipantBoxed { .. } => Severity::Warning,
            Self::DanglingReference { .. } => Severity::Info,
        }
    }
}

/// A recoverable problem, tied to the 1-based input line it came from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line_no}: {kind}")]
pub struct Diagnostic {
    pub line_no: usize,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(line_no: usize, kind: DiagnosticKind) -> Self {
        Self { line_no, kind }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}
