// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaid `sequenceDiagram` parsing and canonical export.
//!
//! Parsing is line oriented: each significant line is classified by its keyword, parsed into a
//! statement and folded into the model by the assembler. Only a missing header is fatal; every
//! other problem is recovered from and reported as a [`Diagnostic`].

mod assemble;
mod blocks;
mod classify;
mod color;
mod diagnostic;
mod export;
mod options;
mod participants;
mod statement;
mod text;


use tracing::{debug, trace};

use crate::model::SequenceAst;

use classify::{classify, LineKind};
use statement::parse_statement;

pub(crate) use assemble::assemble;
pub(crate) use color::is_color;
pub use diagnostic::{Diagnostic, DiagnosticKind, MermaidSequenceParseError, Severity, Unbalanced};
pub(crate) use export::{lower, Lowered};
pub use options::{ExportOptions, ParseOptions, DEFAULT_INDENT};
pub(crate) use statement::{
    BlockStart, Branch, Declaration, Directive, MessageStatement, NoteStatement, Statement,
};
pub use statement::StatementError;
pub(crate) use text::normalize_newlines;

/// A parsed diagram plus everything that was recovered from on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSequence {
    pub ast: SequenceAst,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedSequence {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity() == Severity::Error)
    }
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("%%")
}

pub fn parse_sequence_diagram(input: &str) -> Result<ParsedSequence, MermaidSequenceParseError> {
    parse_sequence_diagram_with(input, &ParseOptions::default())
}

pub fn parse_sequence_diagram_with(
    input: &str,
    options: &ParseOptions,
) -> Result<ParsedSequence, MermaidSequenceParseError> {
    let mut assembler = assemble::SequenceAssembler::new(options.max_depth);
    let mut saw_header = false;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || is_comment_line(trimmed) {
            continue;
        }

        let classified = classify(trimmed);
        trace!(line_no, kind = ?classified.kind, "classified line");
        if !saw_header {
            if classified.kind != LineKind::Header {
                return Err(MermaidSequenceParseError::MissingHeader);
            }
            saw_header = true;
            continue;
        }

        match parse_statement(&classified) {
            Ok(statement) => assembler.apply(line_no, statement),
            Err(reason) => assembler.report(
                line_no,
                DiagnosticKind::UnrecognizedStatement {
                    line: trimmed.to_owned(),
                    reason,
                },
            ),
        }
    }

    if !saw_header {
        return Err(MermaidSequenceParseError::MissingHeader);
    }

    let (ast, diagnostics) = assembler.finish();
    if options.strict {
        if let Some(diagnostic) = diagnostics
            .iter()
            .find(|d| d.severity() >= Severity::Warning)
        {
            return Err(MermaidSequenceParseError::Strict(diagnostic.clone()));
        }
    }
    debug!(
        participants = ast.participants().len(),
        messages = ast.messages().len(),
        diagnostics = diagnostics.len(),
        "parsed sequence diagram"
    );
    Ok(ParsedSequence { ast, diagnostics })
}

/// Canonical Mermaid text for `ast` with default options. Never fails.
pub fn export_sequence_diagram(ast: &SequenceAst) -> String {
    export_sequence_diagram_with(ast, &ExportOptions::default())
}

pub fn export_sequence_diagram_with(ast: &SequenceAst, options: &ExportOptions) -> String {
    let out = export::export(ast, options);
    debug!(
        bytes = out.len(),
        lines = out.lines().count(),
        "exported sequence diagram"
    );
    out
}
