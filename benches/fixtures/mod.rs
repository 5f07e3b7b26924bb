// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::fmt::Write as _;

use sequin::model::{SequenceAst, SequenceItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub participants: usize,
    pub messages: usize,
    pub long_text: bool,
    /// Every n-th message opens a block around the next few; 0 disables blocks.
    pub block_every: usize,
}

impl Params {
    pub const fn new(
        participants: usize,
        messages: usize,
        long_text: bool,
        block_every: usize,
    ) -> Self {
        Self {
            participants,
            messages,
            long_text,
            block_every,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    LargeLongText,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::LargeLongText];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeLongText => "large_long_text",
        }
    }

    pub const fn params(self) -> Params {
        match self {
            Self::Small => Params::new(8, 40, false, 0),
            Self::Medium => Params::new(20, 200, false, 10),
            Self::LargeLongText => Params::new(40, 800, true, 7),
        }
    }
}

fn ascii_repeat_to_len(prefix: &str, fill: char, target_len: usize) -> String {
    if prefix.len() >= target_len {
        return prefix[..target_len].to_owned();
    }

    let mut out = String::with_capacity(target_len);
    out.push_str(prefix);
    while out.len() < target_len {
        out.push(fill);
    }
    out
}

fn participant_name(idx: usize) -> String {
    format!("P{idx:03}")
}

fn message_text(idx: usize, long_text: bool) -> String {
    if long_text {
        let prefix = format!("msg_{idx:06}_");
        ascii_repeat_to_len(&prefix, 'y', 160)
    } else {
        format!("m{idx:04}")
    }
}

const ARROWS: [&str; 4] = ["->>", "-->>", "-)", "->"];
const BLOCKS: [&str; 4] = ["loop", "alt", "opt", "par"];

/// Mermaid source exercising declarations, all statement kinds and nested blocks.
pub fn source(params: Params) -> String {
    assert!(params.participants >= 2, "participants must be >= 2");

    let mut out = String::from("sequenceDiagram\n    autonumber\n");
    for idx in 0..params.participants {
        let keyword = if idx % 5 == 0 { "actor" } else { "participant" };
        let name = participant_name(idx);
        writeln!(out, "    {keyword} {name} as Service {idx}").expect("write to String");
    }

    let mut open_block: Option<(&str, usize)> = None;
    for idx in 0..params.messages {
        if params.block_every > 0 && idx % params.block_every == 0 && open_block.is_none() {
            let keyword = BLOCKS[(idx / params.block_every) % BLOCKS.len()];
            writeln!(out, "    {keyword} round {idx}").expect("write to String");
            open_block = Some((keyword, idx));
        }

        let from = participant_name(idx % params.participants);
        let to = participant_name((idx + 1) % params.participants);
        let arrow = ARROWS[idx % ARROWS.len()];
        let marker = match idx % 6 {
            0 => "+",
            3 => "-",
            _ => "",
        };
        let text = message_text(idx, params.long_text);
        writeln!(out, "    {from}{arrow}{marker}{to}: {text}").expect("write to String");
        if idx % 9 == 4 {
            writeln!(out, "    Note over {from},{to}: checkpoint {idx}").expect("write to String");
        }

        if let Some((keyword, opened)) = open_block {
            if idx == opened + 1 && matches!(keyword, "alt" | "par") {
                let branch = if keyword == "alt" { "else" } else { "and" };
                writeln!(out, "    {branch} fallback {idx}").expect("write to String");
            }
            if idx >= opened + 3 {
                out.push_str("    end\n");
                open_block = None;
            }
        }
    }
    if open_block.is_some() {
        out.push_str("    end\n");
    }
    out
}

pub fn fixture(case: Case) -> String {
    source(case.params())
}

pub fn parsed(case: Case) -> SequenceAst {
    sequin::parse(&fixture(case)).expect("parse fixture").ast
}

pub fn mix(acc: u64, value: usize) -> u64 {
    acc.wrapping_mul(131).wrapping_add(value as u64)
}

fn checksum_items(items: &[SequenceItem], mut acc: u64) -> u64 {
    for item in items {
        acc = mix(acc, item.order());
        match item {
            SequenceItem::Message(message) => {
                acc = mix(acc, message.from().as_str().len());
                acc = mix(acc, message.to().as_str().len());
                if let Some(text) = message.text() {
                    acc = mix(acc, text.len());
                }
            }
            SequenceItem::Note(note) => {
                acc = mix(acc, note.text().len());
            }
            SequenceItem::Activation(activation) => {
                acc = mix(acc, activation.participant().as_str().len());
            }
            SequenceItem::Block(block) => {
                acc = mix(acc, block.end_order());
                for section in block.sections() {
                    acc = checksum_items(section.items(), acc);
                }
            }
        }
    }
    acc
}

pub fn checksum_sequence(ast: &SequenceAst) -> u64 {
    let mut acc = 0u64;
    for (participant_id, participant) in ast.participants() {
        acc = mix(acc, participant_id.as_str().len());
        acc = mix(acc, participant.display_name().len());
    }
    checksum_items(ast.items(), acc)
}
