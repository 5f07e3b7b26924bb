// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

pub const DEFAULT_INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Fail on the first diagnostic of warning severity or worse.
    pub strict: bool,
    /// Deepest allowed block nesting; deeper blocks are still parsed but reported.
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Written as `%%` comment lines above the header.
    pub header_comment: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            header_comment: None,
        }
    }
}
