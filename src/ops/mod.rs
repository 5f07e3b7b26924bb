// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edit operations for sequence diagrams.
//!
//! Operations never touch the model they are given. Header-level edits change a copy of the
//! model, timeline edits change its canonical statement list; either way the result is
//! re-assembled, so every model an operation returns is one the parser could have produced.
//! Timeline positions are addressed by `order`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::mermaid::sequence::{
    assemble, is_color, lower, normalize_newlines, BlockStart, Branch, Declaration, Directive,
    Lowered, MessageStatement, NoteStatement, Statement,
};
use crate::format::mermaid::{validate_mermaid_ident, Diagnostic, MermaidIdentError};
use crate::model::{
    ActivationMarker, ArrowType, Autonumber, NotePlacement, NoteTargets, ParticipantId,
    ParticipantKind, SequenceAst, SequenceBlockKind, SequenceBox, SequenceEvent,
    SequenceParticipant,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SeqOp {
    AddParticipant {
        id: ParticipantId,
        #[serde(default)]
        kind: ParticipantKind,
        #[serde(default)]
        label: Option<String>,
    },
    UpdateParticipant {
        id: ParticipantId,
        patch: SeqParticipantPatch,
    },
    /// Fails while any message, note or activation still references the participant.
    RemoveParticipant {
        id: ParticipantId,
    },
    /// Adds a participant that appears mid-diagram (`create participant`). Without `before` it
    /// is created after the last statement.
    CreateParticipant {
        id: ParticipantId,
        #[serde(default)]
        kind: ParticipantKind,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        before: Option<usize>,
    },
    /// Destroys `id` right after the message at `after`, which must involve it.
    DestroyParticipant {
        id: ParticipantId,
        after: usize,
    },
    AddBox {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        color: Option<String>,
        members: Vec<ParticipantId>,
    },
    RemoveBox {
        index: usize,
    },
    /// Inserts before the statement at `before`, or at the end of the timeline.
    InsertMessage {
        #[serde(default)]
        before: Option<usize>,
        message: MessageSpec,
    },
    UpdateMessage {
        order: usize,
        patch: SeqMessagePatch,
    },
    InsertNote {
        #[serde(default)]
        before: Option<usize>,
        note: NoteSpec,
    },
    UpdateNote {
        order: usize,
        text: String,
    },
    InsertActivation {
        #[serde(default)]
        before: Option<usize>,
        participant: ParticipantId,
        marker: ActivationMarker,
    },
    /// Removes one timeline statement. Removing a block start unwraps the block; removing a
    /// section start merges it into the previous section.
    RemoveStatement {
        order: usize,
    },
    /// Wraps the statements from `first` to `last` (inclusive) in a new block.
    WrapInBlock {
        first: usize,
        last: usize,
        block: BlockSpec,
    },
    /// Appends an `else`/`and`/`option` section to the block starting at `block`.
    AddSection {
        block: usize,
        #[serde(default)]
        label: Option<String>,
    },
    SetBlockLabel {
        block: usize,
        label: Option<String>,
    },
    SetAutonumber {
        autonumber: Option<Autonumber>,
    },
    SetTitle {
        title: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub arrow: ArrowType,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub source_activation: Option<ActivationMarker>,
    #[serde(default)]
    pub target_activation: Option<ActivationMarker>,
}

impl MessageSpec {
    pub fn new(from: ParticipantId, to: ParticipantId, arrow: ArrowType) -> Self {
        Self {
            from,
            to,
            arrow,
            text: None,
            source_activation: None,
            target_activation: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn activating_target(mut self) -> Self {
        self.target_activation = Some(ActivationMarker::Activate);
        self
    }

    pub fn deactivating_source(mut self) -> Self {
        self.source_activation = Some(ActivationMarker::Deactivate);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub placement: NotePlacement,
    pub targets: Vec<ParticipantId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub kind: SequenceBlockKind,
    /// Not allowed on `rect`.
    #[serde(default)]
    pub label: Option<String>,
    /// `rect` only.
    #[serde(default)]
    pub color: Option<String>,
}

impl BlockSpec {
    pub fn labelled(kind: SequenceBlockKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: Some(label.into()),
            color: None,
        }
    }

    pub fn rect(color: impl Into<String>) -> Self {
        Self {
            kind: SequenceBlockKind::Rect,
            label: None,
            color: Some(color.into()),
        }
    }
}

/// `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqParticipantPatch {
    pub kind: Option<ParticipantKind>,
    pub label: Option<Option<String>>,
}

/// `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqMessagePatch {
    pub from: Option<ParticipantId>,
    pub to: Option<ParticipantId>,
    pub arrow: Option<ArrowType>,
    pub text: Option<Option<String>>,
    pub source_activation: Option<Option<ActivationMarker>>,
    pub target_activation: Option<Option<ActivationMarker>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub ast: SequenceAst,
    pub applied: usize,
    /// Diagnostics of the final re-assembly; informational only.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("participant not found: {id}")]
    NotFound { id: ParticipantId },
    #[error("participant already exists: {id}")]
    AlreadyExists { id: ParticipantId },
    #[error("participant {id} is still referenced by the timeline")]
    InUse { id: ParticipantId },
    #[error("invalid participant id {id}: {reason}")]
    InvalidIdent {
        id: ParticipantId,
        reason: MermaidIdentError,
    },
    #[error("no timeline statement at order {order}")]
    UnknownOrder { order: usize },
    #[error("statement at order {order} is not a {expected}")]
    UnexpectedStatement {
        order: usize,
        expected: &'static str,
    },
    #[error("the end of a block cannot be removed on its own (order {order})")]
    NotRemovable { order: usize },
    #[error("statements {first}..={last} do not form a balanced range")]
    InvalidRange { first: usize, last: usize },
    #[error("invalid block: {reason}")]
    InvalidBlock { reason: &'static str },
    #[error("`{kind}` blocks have no further sections")]
    NoSections { kind: &'static str },
    #[error("invalid note: {reason}")]
    InvalidNote { reason: &'static str },
    #[error("message at order {order} does not involve {id}")]
    NotInvolved { order: usize, id: ParticipantId },
    #[error("invalid box: {reason}")]
    InvalidBox { reason: &'static str },
    #[error("participant {id} already belongs to a box")]
    AlreadyBoxed { id: ParticipantId },
    #[error("box not found: {index}")]
    BoxNotFound { index: usize },
}

/// Applies `ops` in sequence. Either all of them apply or none do.
pub fn apply_ops(ast: &SequenceAst, ops: &[SeqOp]) -> Result<ApplyResult, ApplyError> {
    if ops.is_empty() {
        return Ok(ApplyResult {
            ast: ast.clone(),
            applied: 0,
            diagnostics: Vec::new(),
        });
    }

    let mut current = ast.clone();
    let mut diagnostics = Vec::new();
    for (index, op) in ops.iter().enumerate() {
        let (next, op_diagnostics) = apply_seq_op(&current, op).inspect_err(|err| {
            debug!(index, %err, "edit operation rejected");
        })?;
        current = next;
        diagnostics = op_diagnostics;
    }

    debug!(
        applied = ops.len(),
        timeline_len = current.timeline_len(),
        "applied edit operations"
    );
    Ok(ApplyResult {
        ast: current,
        applied: ops.len(),
        diagnostics,
    })
}

include!("ops_impl.rs");

#[cfg(test)]
mod tests;
