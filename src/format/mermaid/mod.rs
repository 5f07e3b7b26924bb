// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaid `sequenceDiagram` syntax.

pub mod arrow;
mod ident;
pub mod sequence;

pub use ident::{participant_id, validate_mermaid_ident, MermaidIdentError};
pub use sequence::{
    export_sequence_diagram, export_sequence_diagram_with, parse_sequence_diagram,
    parse_sequence_diagram_with, Diagnostic, DiagnosticKind, ExportOptions,
    MermaidSequenceParseError, ParseOptions, ParsedSequence, Severity,
};
