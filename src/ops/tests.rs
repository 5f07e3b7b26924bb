// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use crate::format::mermaid::{export_sequence_diagram, parse_sequence_diagram, MermaidIdentError};
use crate::model::fixtures::{pid, ping_loop};
use crate::model::{
    ActivationMarker, ArrowType, Autonumber, NotePlacement, ParticipantKind, SequenceAst,
    SequenceBlockKind, SequenceItem,
};

use super::{
    apply_ops, ApplyError, BlockSpec, MessageSpec, NoteSpec, SeqMessagePatch, SeqOp,
    SeqParticipantPatch,
};

fn parse(input: &str) -> SequenceAst {
    parse_sequence_diagram(input).expect("parse").ast
}

fn apply(ast: &SequenceAst, ops: &[SeqOp]) -> SequenceAst {
    apply_ops(ast, ops).expect("apply").ast
}

fn texts(ast: &SequenceAst) -> Vec<&str> {
    ast.messages().iter().filter_map(|message| message.text()).collect()
}

fn assert_stable(ast: &SequenceAst) {
    let exported = export_sequence_diagram(ast);
    assert_eq!(&parse(&exported), ast, "exported:\n{exported}");
}

fn message(from: &str, to: &str, text: &str) -> MessageSpec {
    MessageSpec::new(pid(from), pid(to), ArrowType::SolidArrow).with_text(text)
}

fn add_participant(id: &str, kind: ParticipantKind) -> SeqOp {
    SeqOp::AddParticipant {
        id: pid(id),
        kind,
        label: None,
    }
}

fn insert_message(before: Option<usize>, message: MessageSpec) -> SeqOp {
    SeqOp::InsertMessage { before, message }
}

fn destroy(id: &str, after: usize) -> SeqOp {
    SeqOp::DestroyParticipant { id: pid(id), after }
}

fn unexpected(order: usize, expected: &'static str) -> ApplyError {
    ApplyError::UnexpectedStatement { order, expected }
}

#[test]
fn builds_a_diagram_from_nothing() {
    let bob = SeqOp::AddParticipant {
        id: pid("Bob"),
        kind: ParticipantKind::Participant,
        label: Some(" Bob B. ".to_owned()),
    };
    let reply = MessageSpec::new(pid("Bob"), pid("Alice"), ArrowType::DottedArrow);
    let ops = [
        add_participant("Alice", ParticipantKind::Actor),
        bob,
        insert_message(None, message("Alice", "Bob", "hello")),
        insert_message(None, reply),
    ];
    let result = apply_ops(&SequenceAst::default(), &ops).expect("apply");

    assert_eq!(result.applied, 4);
    assert!(result.diagnostics.is_empty());
    let expected = "\
sequenceDiagram
    actor Alice
    participant Bob as Bob B.
    Alice->>Bob: hello
    Bob-->>Alice
";
    assert_eq!(export_sequence_diagram(&result.ast), expected);
    assert_stable(&result.ast);
}

#[test]
fn empty_op_list_returns_the_input() {
    let ast = ping_loop();
    let result = apply_ops(&ast, &[]).expect("apply");
    assert_eq!(result.applied, 0);
    assert_eq!(result.ast, ast);
}

#[test]
fn a_failing_op_rejects_the_whole_batch() {
    let ast = ping_loop();
    let ops = [
        SeqOp::SetTitle {
            title: Some("Ping".to_owned()),
        },
        SeqOp::RemoveStatement { order: 99 },
    ];
    assert_eq!(
        apply_ops(&ast, &ops),
        Err(ApplyError::UnknownOrder { order: 99 })
    );
    assert_eq!(ast, ping_loop());
}

#[test]
fn participants_are_added_once_and_validated() {
    let ast = ping_loop();
    let duplicate = [add_participant("Bob", ParticipantKind::Actor)];
    assert_eq!(
        apply_ops(&ast, &duplicate),
        Err(ApplyError::AlreadyExists { id: pid("Bob") })
    );

    let invalid = [add_participant("a:b", ParticipantKind::Participant)];
    assert_eq!(
        apply_ops(&ast, &invalid),
        Err(ApplyError::InvalidIdent {
            id: pid("a:b"),
            reason: MermaidIdentError::InvalidChar { ch: ':' },
        })
    );
}

#[test]
fn updating_a_participant_keeps_its_position() {
    let ast = ping_loop();
    let patch = SeqParticipantPatch {
        kind: Some(ParticipantKind::Actor),
        label: Some(Some("Robert".to_owned())),
    };
    let update = SeqOp::UpdateParticipant {
        id: pid("Bob"),
        patch,
    };
    let next = apply(&ast, &[update]);

    let bob = next.participant("Bob").expect("bob");
    assert_eq!(bob.kind(), ParticipantKind::Actor);
    assert_eq!(bob.label(), Some("Robert"));
    let ids = next.participants().keys().map(|id| id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["Alice", "Bob"]);

    let patch = SeqParticipantPatch {
        kind: None,
        label: Some(None),
    };
    let update = SeqOp::UpdateParticipant {
        id: pid("Bob"),
        patch,
    };
    let cleared = apply(&next, &[update]);
    assert_eq!(cleared.participant("Bob").and_then(|bob| bob.label()), None);
    assert_stable(&cleared);
}

#[test]
fn referenced_participants_cannot_be_removed() {
    let ast = parse(
        "sequenceDiagram\nparticipant A\nparticipant B\nparticipant C\n\
         box Aqua Side\nparticipant D\nend\nA->>B: hi\nNote over C: idle",
    );
    assert_eq!(
        apply_ops(&ast, &[SeqOp::RemoveParticipant { id: pid("C") }]),
        Err(ApplyError::InUse { id: pid("C") })
    );
    assert_eq!(
        apply_ops(&ast, &[SeqOp::RemoveParticipant { id: pid("Z") }]),
        Err(ApplyError::NotFound { id: pid("Z") })
    );

    let next = apply(&ast, &[SeqOp::RemoveParticipant { id: pid("D") }]);
    assert!(next.participant("D").is_none());
    assert_eq!(next.boxes().len(), 1);
    assert!(next.boxes()[0].participants().is_empty());
    assert_stable(&next);
}

#[test]
fn messages_insert_before_an_order() {
    let ast = parse("sequenceDiagram\nA->>B: one\nA->>B: three");
    let next = apply(&ast, &[insert_message(Some(1), message("B", "A", "two"))]);

    assert_eq!(texts(&next), vec!["one", "two", "three"]);
    let orders = next.messages().iter().map(|message| message.order()).collect::<Vec<_>>();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn inserting_a_message_keeps_a_creation_with_its_statement() {
    let ast = parse("sequenceDiagram\nA->>B: hi\ncreate participant C\nA->>C: hey");
    assert_eq!(ast.participant("C").and_then(|c| c.created_at()), Some(1));

    let next = apply(&ast, &[insert_message(Some(1), message("A", "B", "mid"))]);
    assert_eq!(next.participant("C").and_then(|c| c.created_at()), Some(2));
    let expected = "\
sequenceDiagram
    A->>B: hi
    A->>B: mid
    create participant C
    A->>C: hey
";
    assert_eq!(export_sequence_diagram(&next), expected);
}

#[test]
fn messages_are_patched_in_place() {
    let ast = ping_loop();
    let patch = SeqMessagePatch {
        arrow: Some(ArrowType::DottedCross),
        text: Some(Some("line one\nline two".to_owned())),
        target_activation: Some(Some(ActivationMarker::Activate)),
        ..SeqMessagePatch::default()
    };
    let next = apply(&ast, &[SeqOp::UpdateMessage { order: 2, patch }]);

    let updated = next.find_message(2).expect("message");
    assert_eq!(updated.arrow(), ArrowType::DottedCross);
    assert_eq!(updated.text(), Some("line one<br>line two"));
    assert_eq!(updated.target_activation(), Some(ActivationMarker::Activate));
    // A cross arrow destroys its target.
    let alice = next.participant("Alice").expect("alice");
    assert_eq!(alice.destroyed_at(), Some(2));
    assert_stable(&next);
}

#[test]
fn updates_check_the_statement_kind() {
    let ast = ping_loop();
    let patch = SeqMessagePatch {
        text: Some(None),
        ..SeqMessagePatch::default()
    };
    assert_eq!(
        apply_ops(&ast, &[SeqOp::UpdateMessage { order: 1, patch }]),
        Err(unexpected(1, "message"))
    );
    let text = "x".to_owned();
    assert_eq!(
        apply_ops(&ast, &[SeqOp::UpdateNote { order: 0, text }]),
        Err(unexpected(0, "note"))
    );
}

#[test]
fn self_message_target_deactivation_moves_to_the_source() {
    let mut spec = message("A", "A", "think");
    spec.target_activation = Some(ActivationMarker::Deactivate);
    let next = apply(&SequenceAst::default(), &[insert_message(None, spec)]);

    let message = next.find_message(0).expect("message");
    assert_eq!(message.source_activation(), Some(ActivationMarker::Deactivate));
    assert_eq!(message.target_activation(), None);
    assert_stable(&next);
}

#[test]
fn notes_are_inserted_and_updated() {
    let ast = ping_loop();
    let note = NoteSpec {
        placement: NotePlacement::Over,
        targets: vec![pid("Alice"), pid("Bob")],
        text: "sync".to_owned(),
    };
    let ops = [
        SeqOp::InsertNote {
            before: Some(0),
            note,
        },
        SeqOp::UpdateNote {
            order: 0,
            text: "in sync".to_owned(),
        },
    ];
    let next = apply(&ast, &ops);

    assert_eq!(next.notes().len(), 1);
    assert_eq!(next.notes()[0].text(), "in sync");
    assert_eq!(next.notes()[0].order(), 0);
    let hello = next.find_message(1).and_then(|message| message.text());
    assert_eq!(hello, Some("hello"));
    assert_stable(&next);
}

#[rstest]
#[case(NotePlacement::LeftOf, vec![], "a note needs at least one target")]
#[case(NotePlacement::RightOf, vec!["Alice", "Bob"], "sided notes take exactly one target")]
fn invalid_notes_are_rejected(
    #[case] placement: NotePlacement,
    #[case] targets: Vec<&str>,
    #[case] reason: &'static str,
) {
    let note = NoteSpec {
        placement,
        targets: targets.into_iter().map(pid).collect(),
        text: "x".to_owned(),
    };
    assert_eq!(
        apply_ops(&ping_loop(), &[SeqOp::InsertNote { before: None, note }]),
        Err(ApplyError::InvalidNote { reason })
    );
}

#[test]
fn notes_need_known_targets() {
    let note = NoteSpec {
        placement: NotePlacement::Over,
        targets: vec![pid("Alice"), pid("Carol")],
        text: "x".to_owned(),
    };
    assert_eq!(
        apply_ops(&ping_loop(), &[SeqOp::InsertNote { before: None, note }]),
        Err(ApplyError::NotFound { id: pid("Carol") })
    );
}

#[test]
fn standalone_activations_take_their_own_position() {
    let ast = ping_loop();
    let op = SeqOp::InsertActivation {
        before: Some(0),
        participant: pid("Bob"),
        marker: ActivationMarker::Activate,
    };
    let next = apply(&ast, &[op]);

    let SequenceItem::Activation(activation) = &next.items()[0] else {
        panic!("expected activation, got {:?}", next.items()[0]);
    };
    assert_eq!(activation.participant(), &pid("Bob"));
    assert_eq!(activation.order(), 0);
    assert_eq!(next.timeline_len(), ast.timeline_len() + 1);
    assert_stable(&next);
}

#[test]
fn wrapping_a_range_in_a_block() {
    let ast = parse("sequenceDiagram\nA->>B: one\nA->>B: two\nA->>B: three");
    let block = BlockSpec::labelled(SequenceBlockKind::Loop, "Retry");
    let wrap = SeqOp::WrapInBlock {
        first: 1,
        last: 2,
        block,
    };
    let next = apply(&ast, &[wrap]);

    let blocks = next.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), SequenceBlockKind::Loop);
    assert_eq!(blocks[0].label(), Some("Retry"));
    assert_eq!((blocks[0].start_order(), blocks[0].end_order()), (1, 4));
    let expected = "\
sequenceDiagram
    A->>B: one
    loop Retry
        A->>B: two
        A->>B: three
    end
";
    assert_eq!(export_sequence_diagram(&next), expected);
}

#[test]
fn wrapping_a_block_start_takes_the_whole_block() {
    let ast = parse("sequenceDiagram\nA->>B: one\nloop x\nA->>B: two\nend\nA->>B: three");
    let block = BlockSpec::rect("rgb(200, 150, 255)");
    let wrap = SeqOp::WrapInBlock {
        first: 0,
        last: 1,
        block,
    };
    let next = apply(&ast, &[wrap]);

    let blocks = next.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind(), SequenceBlockKind::Rect);
    assert_eq!(blocks[0].color(), Some("rgb(200, 150, 255)"));
    assert_eq!((blocks[0].start_order(), blocks[0].end_order()), (0, 5));
    assert_stable(&next);
}

#[rstest]
#[case(0, 2)]
#[case(2, 3)]
#[case(3, 1)]
fn unbalanced_ranges_are_rejected(#[case] first: usize, #[case] last: usize) {
    let ast = parse("sequenceDiagram\nA->>B: one\nloop x\nA->>B: two\nend\nA->>B: three");
    let block = BlockSpec::labelled(SequenceBlockKind::Opt, "maybe");
    assert_eq!(
        apply_ops(&ast, &[SeqOp::WrapInBlock { first, last, block }]),
        Err(ApplyError::InvalidRange { first, last })
    );
}

#[rstest]
#[case(SequenceBlockKind::Rect, Some("x"), None)]
#[case(SequenceBlockKind::Loop, None, Some("red"))]
fn block_specs_are_validated(
    #[case] kind: SequenceBlockKind,
    #[case] label: Option<&str>,
    #[case] color: Option<&str>,
) {
    let block = BlockSpec {
        kind,
        label: label.map(str::to_owned),
        color: color.map(str::to_owned),
    };
    let wrap = SeqOp::WrapInBlock {
        first: 0,
        last: 0,
        block,
    };
    assert!(matches!(
        apply_ops(&ping_loop(), &[wrap]),
        Err(ApplyError::InvalidBlock { .. })
    ));
}

#[test]
fn removing_a_block_start_unwraps_the_block() {
    let ast = parse("sequenceDiagram\nalt ok\nA->>B: yes\nelse fail\nA->>B: no\nend\nA->>B: after");
    let next = apply(&ast, &[SeqOp::RemoveStatement { order: 0 }]);

    assert!(next.blocks().is_empty());
    assert_eq!(texts(&next), vec!["yes", "no", "after"]);
    assert_eq!(next.timeline_len(), 3);
}

#[test]
fn removing_a_section_start_merges_it_into_the_previous_section() {
    let ast = parse("sequenceDiagram\nalt ok\nA->>B: yes\nelse fail\nA->>B: no\nend");
    let next = apply(&ast, &[SeqOp::RemoveStatement { order: 2 }]);

    let blocks = next.blocks();
    assert_eq!(blocks[0].sections().len(), 1);
    assert_eq!(blocks[0].sections()[0].items().len(), 2);
}

#[test]
fn removing_a_message_or_end() {
    let ast = ping_loop();
    assert_eq!(
        apply_ops(&ast, &[SeqOp::RemoveStatement { order: 3 }]),
        Err(ApplyError::NotRemovable { order: 3 })
    );

    let next = apply(&ast, &[SeqOp::RemoveStatement { order: 2 }]);
    assert_eq!(texts(&next), vec!["hello", "bye"]);
    let block = next.find_block(1).expect("loop");
    assert_eq!(block.end_order(), 2);
    assert!(block.sections()[0].items().is_empty());
}

#[test]
fn sections_are_added_to_blocks_that_allow_them() {
    let ast = parse("sequenceDiagram\nalt ok\nA->>B: yes\nend\nloop again\nA->>B: ping\nend");
    let label = Some("fail".to_owned());
    let next = apply(&ast, &[SeqOp::AddSection { block: 0, label }]);
    let alt = next.find_block(0).expect("alt");
    assert_eq!(alt.sections().len(), 2);
    assert_eq!(alt.sections()[1].label(), Some("fail"));
    assert_eq!(alt.end_order(), 3);

    let label = None;
    assert_eq!(
        apply_ops(&ast, &[SeqOp::AddSection { block: 3, label }]),
        Err(ApplyError::NoSections { kind: "loop" })
    );
    let label = None;
    assert_eq!(
        apply_ops(&ast, &[SeqOp::AddSection { block: 1, label }]),
        Err(unexpected(1, "block start"))
    );
}

#[test]
fn block_labels_are_set_and_cleared() {
    let ast = ping_loop();
    let label = Some("  ".to_owned());
    let next = apply(&ast, &[SeqOp::SetBlockLabel { block: 1, label }]);
    assert_eq!(next.find_block(1).and_then(|block| block.label()), None);

    let rect = parse("sequenceDiagram\nrect red\nA->>B: x\nend");
    let label = Some("x".to_owned());
    assert!(matches!(
        apply_ops(&rect, &[SeqOp::SetBlockLabel { block: 0, label }]),
        Err(ApplyError::InvalidBlock { .. })
    ));
}

#[test]
fn participants_are_created_and_destroyed_mid_diagram() {
    let ast = parse("sequenceDiagram\nA->>B: hi\nA->>B: bye");
    let ops = [
        SeqOp::CreateParticipant {
            id: pid("C"),
            kind: ParticipantKind::Participant,
            label: None,
            before: Some(1),
        },
        insert_message(None, message("A", "C", "ping")),
        destroy("C", 2),
    ];
    let next = apply(&ast, &ops);

    let c = next.participant("C").expect("C");
    assert_eq!(c.created_at(), Some(1));
    assert_eq!(c.destroyed_at(), Some(2));
    let expected = "\
sequenceDiagram
    A->>B: hi
    create participant C
    A->>B: bye
    A->>C: ping
    destroy C
";
    assert_eq!(export_sequence_diagram(&next), expected);
    assert_stable(&next);
}

#[test]
fn destroying_moves_an_earlier_destroy() {
    let ast = parse("sequenceDiagram\nA->>B: one\ndestroy B\nA->>B: two");
    assert_eq!(ast.participant("B").and_then(|b| b.destroyed_at()), Some(0));

    let next = apply(&ast, &[destroy("B", 1)]);
    assert_eq!(next.participant("B").and_then(|b| b.destroyed_at()), Some(1));

    assert_eq!(
        apply_ops(&ast, &[destroy("C", 1)]),
        Err(ApplyError::NotFound { id: pid("C") })
    );
    let with_c = parse("sequenceDiagram\nA->>B: one\nA->>C: two");
    assert_eq!(
        apply_ops(&with_c, &[destroy("C", 0)]),
        Err(ApplyError::NotInvolved {
            order: 0,
            id: pid("C"),
        })
    );
}

#[test]
fn boxes_group_adjacent_participants() {
    let ast = parse("sequenceDiagram\nparticipant A\nparticipant B\nparticipant C\nA->>C: x");
    let add = SeqOp::AddBox {
        label: Some("Front".to_owned()),
        color: Some("Aqua".to_owned()),
        members: vec![pid("B"), pid("A")],
    };
    let next = apply(&ast, &[add]);

    assert_eq!(next.boxes().len(), 1);
    assert_eq!(next.boxes()[0].participants(), &[pid("A"), pid("B")]);
    assert_eq!(next.boxes()[0].color(), Some("Aqua"));
    assert_eq!(next.boxes()[0].label(), Some("Front"));
    assert_stable(&next);

    let removed = apply(&next, &[SeqOp::RemoveBox { index: 0 }]);
    assert!(removed.boxes().is_empty());
    assert_eq!(
        apply_ops(&removed, &[SeqOp::RemoveBox { index: 0 }]),
        Err(ApplyError::BoxNotFound { index: 0 })
    );
}

#[rstest]
#[case(vec!["A", "C"], None, "members must be adjacent in participant order")]
#[case(vec!["A"], Some("not a color"), "color is not a CSS color")]
fn malformed_boxes_are_rejected(
    #[case] members: Vec<&str>,
    #[case] color: Option<&str>,
    #[case] reason: &'static str,
) {
    let ast = parse("sequenceDiagram\nparticipant A\nbox Back\nparticipant B\nend\nparticipant C");
    let op = SeqOp::AddBox {
        label: None,
        color: color.map(str::to_owned),
        members: members.into_iter().map(pid).collect(),
    };
    assert_eq!(
        apply_ops(&ast, &[op]),
        Err(ApplyError::InvalidBox { reason })
    );
}

#[rstest]
#[case("B", ApplyError::AlreadyBoxed { id: pid("B") })]
#[case("Z", ApplyError::NotFound { id: pid("Z") })]
fn box_members_must_be_free_participants(#[case] member: &str, #[case] expected: ApplyError) {
    let ast = parse("sequenceDiagram\nparticipant A\nbox Back\nparticipant B\nend\nparticipant C");
    let op = SeqOp::AddBox {
        label: None,
        color: None,
        members: vec![pid(member)],
    };
    assert_eq!(apply_ops(&ast, &[op]), Err(expected));
}

#[test]
fn autonumber_and_title_are_normalized() {
    let ast = ping_loop();
    let ops = [
        SeqOp::SetAutonumber {
            autonumber: Some(Autonumber {
                start: None,
                step: Some(5),
            }),
        },
        SeqOp::SetTitle {
            title: Some("  Ping  ".to_owned()),
        },
    ];
    let next = apply(&ast, &ops);
    let expected = Autonumber {
        start: Some(1),
        step: Some(5),
    };
    assert_eq!(next.autonumber(), Some(expected));
    assert_eq!(next.title(), Some("Ping"));
    assert_stable(&next);

    let ops = [
        SeqOp::SetAutonumber { autonumber: None },
        SeqOp::SetTitle { title: None },
    ];
    let cleared = apply(&next, &ops);
    assert!(!cleared.is_autonumbered());
    assert_eq!(cleared.title(), None);
}

#[test]
fn ops_deserialize_from_json() {
    let json = r#"[
        {"op": "add_participant", "id": "Alice", "kind": "actor"},
        {
            "op": "insert_message",
            "message": {"from": "Alice", "to": "Bob", "arrow": "solid_open", "text": "async"}
        },
        {"op": "wrap_in_block", "first": 0, "last": 0, "block": {"kind": "opt", "label": "maybe"}}
    ]"#;
    let ops: Vec<SeqOp> = serde_json::from_str(json).expect("ops");
    let next = apply(&SequenceAst::default(), &ops);

    let expected = "\
sequenceDiagram
    actor Alice
    opt maybe
        Alice-)Bob: async
    end
";
    assert_eq!(export_sequence_diagram(&next), expected);
}

#[test]
fn invalid_ids_in_json_are_rejected() {
    let json = r#"{"op": "remove_participant", "id": "two words"}"#;
    assert!(serde_json::from_str::<SeqOp>(json).is_err());
}
