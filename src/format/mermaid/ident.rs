// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::arrow;
use crate::model::ParticipantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MermaidIdentError {
    #[error("must not be empty")]
    Empty,
    #[error("must not contain whitespace")]
    ContainsWhitespace,
    #[error("contains invalid character: '{ch}'")]
    InvalidChar { ch: char },
    #[error("must not contain the arrow token '{token}'")]
    ContainsArrow { token: &'static str },
    #[error("must not start with an activation marker ('+' or '-')")]
    LeadingMarker,
    #[error("must not end with '-'")]
    TrailingDash,
}

const RESERVED_CHARS: &[char] = &[':', ',', ';', '#', '"', '<', '>', '%'];

/// Checks that `ident` can appear as a message endpoint, note target and declaration id
/// without changing how the surrounding line is split.
pub fn validate_mermaid_ident(ident: &str) -> Result<(), MermaidIdentError> {
    if ident.is_empty() {
        return Err(MermaidIdentError::Empty);
    }
    if ident.chars().any(char::is_whitespace) {
        return Err(MermaidIdentError::ContainsWhitespace);
    }
    if let Some(ch) = ident
        .chars()
        .find(|ch| ch.is_control() || RESERVED_CHARS.contains(ch))
    {
        return Err(MermaidIdentError::InvalidChar { ch });
    }
    if ident.starts_with(['+', '-']) {
        return Err(MermaidIdentError::LeadingMarker);
    }
    if ident.ends_with('-') {
        return Err(MermaidIdentError::TrailingDash);
    }
    if let Some(token) = arrow::tokens().find(|token| ident.contains(token)) {
        return Err(MermaidIdentError::ContainsArrow { token });
    }
    Ok(())
}

/// Validates and converts in one step.
pub fn participant_id(ident: &str) -> Result<ParticipantId, MermaidIdentError> {
    validate_mermaid_ident(ident)?;
    // The Mermaid rules are strictly tighter than the model's.
    ParticipantId::new(ident)
        .map_err(|_| MermaidIdentError::ContainsWhitespace)
}
