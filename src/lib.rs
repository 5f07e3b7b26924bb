// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Sequin: round-trip parsing and canonical export of Mermaid sequence diagrams.
//!
//! `format::mermaid` turns `sequenceDiagram` text into a [`model::SequenceAst`] and back,
//! `ops` derives edited models from existing ones.

pub mod format;
pub mod model;
pub mod ops;

pub use format::mermaid::{
    export_sequence_diagram as serialize, export_sequence_diagram_with as serialize_with_options,
    parse_sequence_diagram as parse, parse_sequence_diagram_with as parse_with_options,
};
