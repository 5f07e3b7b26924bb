// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Stroke of a message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dotted,
}

/// Decoration drawn at the end(s) of a message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowHead {
    None,
    Arrow,
    BothArrows,
    Cross,
    Open,
}

/// The ten message arrows of a sequence diagram.
///
/// Every variant is a distinct `(LineStyle, ArrowHead)` pair; the literal tokens live in
/// `format::mermaid::arrow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowType {
    Solid,
    Dotted,
    SolidArrow,
    DottedArrow,
    SolidBidirectional,
    DottedBidirectional,
    SolidCross,
    DottedCross,
    SolidOpen,
    DottedOpen,
}

impl ArrowType {
    pub const ALL: [ArrowType; 10] = [
        ArrowType::Solid,
        ArrowType::Dotted,
        ArrowType::SolidArrow,
        ArrowType::DottedArrow,
        ArrowType::SolidBidirectional,
        ArrowType::DottedBidirectional,
        ArrowType::SolidCross,
        ArrowType::DottedCross,
        ArrowType::SolidOpen,
        ArrowType::DottedOpen,
    ];

    pub fn line_style(self) -> LineStyle {
        match self {
            Self::Solid
            | Self::SolidArrow
            | Self::SolidBidirectional
            | Self::SolidCross
            | Self::SolidOpen => LineStyle::Solid,
            Self::Dotted
            | Self::DottedArrow
            | Self::DottedBidirectional
            | Self::DottedCross
            | Self::DottedOpen => LineStyle::Dotted,
        }
    }

    pub fn head(self) -> ArrowHead {
        match self {
            Self::Solid | Self::Dotted => ArrowHead::None,
            Self::SolidArrow | Self::DottedArrow => ArrowHead::Arrow,
            Self::SolidBidirectional | Self::DottedBidirectional => ArrowHead::BothArrows,
            Self::SolidCross | Self::DottedCross => ArrowHead::Cross,
            Self::SolidOpen | Self::DottedOpen => ArrowHead::Open,
        }
    }

    pub fn from_parts(line_style: LineStyle, head: ArrowHead) -> Self {
        match (line_style, head) {
            (LineStyle::Solid, ArrowHead::None) => Self::Solid,
            (LineStyle::Dotted, ArrowHead::None) => Self::Dotted,
            (LineStyle::Solid, ArrowHead::Arrow) => Self::SolidArrow,
            (LineStyle::Dotted, ArrowHead::Arrow) => Self::DottedArrow,
            (LineStyle::Solid, ArrowHead::BothArrows) => Self::SolidBidirectional,
            (LineStyle::Dotted, ArrowHead::BothArrows) => Self::DottedBidirectional,
            (LineStyle::Solid, ArrowHead::Cross) => Self::SolidCross,
            (LineStyle::Dotted, ArrowHead::Cross) => Self::DottedCross,
            (LineStyle::Solid, ArrowHead::Open) => Self::SolidOpen,
            (LineStyle::Dotted, ArrowHead::Open) => Self::DottedOpen,
        }
    }

    /// Cross-headed messages end the target's lifeline.
    pub fn is_destroying(self) -> bool {
        self.head() == ArrowHead::Cross
    }
}

/// Activation shorthand attached to one endpoint of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMarker {
    Activate,
    Deactivate,
}

impl ActivationMarker {
    pub fn symbol(self) -> char {
        match self {
            Self::Activate => '+',
            Self::Deactivate => '-',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Activate),
            '-' => Some(Self::Deactivate),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
        }
    }
}
