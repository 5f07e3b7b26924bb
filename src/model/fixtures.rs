// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::arrow::ArrowType;
use super::ids::ParticipantId;
use super::seq_ast::{
    ParticipantKind, SequenceAst, SequenceBlock, SequenceBlockKind, SequenceItem, SequenceMessage,
    SequenceParticipant, SequenceSection, SequenceSectionKind,
};

pub(crate) fn pid(value: &str) -> ParticipantId {
    ParticipantId::new(value).expect("participant id")
}

fn message(from: &str, to: &str, arrow: ArrowType, text: &str, order: usize) -> SequenceItem {
    SequenceItem::Message(SequenceMessage::new(
        pid(from),
        pid(to),
        arrow,
        Some(text.to_owned()),
        order,
    ))
}

/// ```text
/// actor Alice
/// Alice->>Bob: hello
/// loop Every minute
///     Bob-->>Alice: pong
/// end
/// Alice->>Bob: bye
/// ```
pub(crate) fn ping_loop() -> SequenceAst {
    let mut ast = SequenceAst::default();

    let mut alice = SequenceParticipant::new(pid("Alice"));
    alice.set_kind(ParticipantKind::Actor);
    ast.insert_participant(alice);
    ast.insert_participant(SequenceParticipant::implicit(pid("Bob")));

    ast.items_mut().push(message("Alice", "Bob", ArrowType::SolidArrow, "hello", 0));
    ast.items_mut().push(SequenceItem::Block(SequenceBlock::new(
        SequenceBlockKind::Loop,
        Some("Every minute".to_owned()),
        None,
        1,
        3,
        vec![SequenceSection::new(
            SequenceSectionKind::Main,
            None,
            1,
            vec![message("Bob", "Alice", ArrowType::DottedArrow, "pong", 2)],
        )],
    )));
    ast.items_mut().push(message("Alice", "Bob", ArrowType::SolidArrow, "bye", 4));

    ast
}
