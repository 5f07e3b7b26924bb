// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model for sequence diagrams.
//!
//! The model is a plain value: parsing builds a fresh one and edit operations return a new one.

pub mod arrow;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod seq_ast;

pub use arrow::{ActivationMarker, ArrowHead, ArrowType, LineStyle};
pub use ids::{Id, IdError, ParticipantId};
pub use seq_ast::{
    Autonumber, NotePlacement, NoteTargets, ParticipantKind, SequenceActivation, SequenceAst,
    SequenceBlock, SequenceBlockKind, SequenceBox, SequenceEvent, SequenceItem, SequenceMessage,
    SequenceNote, SequenceParticipant, SequenceSection, SequenceSectionKind,
};
