// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical serialization in two stages: lowering the model to statements, then rendering
//! statements to text.

use std::collections::{HashMap, HashSet};

use crate::format::mermaid::arrow::token_for;
use crate::model::{
    ActivationMarker, ParticipantId, SequenceAst, SequenceBlockKind, SequenceBox, SequenceEvent,
    SequenceParticipant,
};

use super::classify::HEADER;
use super::color::{starts_with_color, transparent};
use super::options::ExportOptions;
use super::statement::{
    BlockStart, BoxStart, Branch, Declaration, Directive, MessageStatement, NoteStatement,
    Statement,
};
use super::text::{escape_text, normalize_newlines};

/// A statement produced by lowering, tagged with the model order it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lowered {
    pub order: Option<usize>,
    pub statement: Statement,
}

impl Lowered {
    fn untimed(statement: Statement) -> Self {
        Self {
            order: None,
            statement,
        }
    }

    fn at(order: usize, statement: Statement) -> Self {
        Self {
            order: Some(order),
            statement,
        }
    }
}

fn destroy(participant: &SequenceParticipant) -> Statement {
    Statement::Directive(Directive::Destroy(participant.id().clone()))
}

fn declaration(participant: &SequenceParticipant, create: bool) -> Statement {
    Statement::Declaration(Declaration {
        id: participant.id().clone(),
        kind: participant.kind(),
        label: participant.label().map(str::to_owned),
        create,
    })
}

/// Lowers `ast` to the statement list that re-assembles into it.
pub(crate) fn lower(ast: &SequenceAst) -> Vec<Lowered> {
    let timeline = lower_timeline(ast);
    let header = lower_header(ast, &timeline);

    let mut out = Vec::with_capacity(header.len() + timeline.len() + 2);
    if let Some(title) = ast.title() {
        let title = Directive::Title(title.to_owned());
        out.push(Lowered::untimed(Statement::Directive(title)));
    }
    if let Some(autonumber) = ast.autonumber() {
        let autonumber = Directive::Autonumber(Some(autonumber));
        out.push(Lowered::untimed(Statement::Directive(autonumber)));
    }
    out.extend(header);
    out.extend(timeline);
    out
}

fn lower_timeline(ast: &SequenceAst) -> Vec<Lowered> {
    let mut out = Vec::new();

    let mut first_cross: HashMap<&str, usize> = HashMap::new();
    for message in ast.messages() {
        if message.arrow().is_destroying() {
            first_cross
                .entry(message.to().as_str())
                .or_insert(message.order());
        }
    }

    let mut created = ast
        .participants()
        .values()
        .filter(|p| p.created_at().is_some())
        .collect::<Vec<_>>();
    let mut destroyed = ast
        .participants()
        .values()
        .filter(|p| match p.destroyed_at() {
            Some(at) => first_cross.get(p.id().as_str()) != Some(&at),
            None => false,
        })
        .collect::<Vec<_>>();

    for event in ast.events() {
        let order = event.order();
        created.retain(|participant| {
            if participant.created_at() == Some(order) {
                out.push(Lowered::untimed(declaration(participant, true)));
                false
            } else {
                true
            }
        });

        let statement = match event {
            SequenceEvent::Message(message) => Statement::Message(MessageStatement {
                from: message.from().clone(),
                to: message.to().clone(),
                arrow: message.arrow(),
                text: message.text().map(str::to_owned),
                source_activation: message.source_activation(),
                target_activation: message.target_activation(),
            }),
            SequenceEvent::Note(note) => Statement::Note(NoteStatement {
                placement: note.placement(),
                targets: note.targets().iter().cloned().collect(),
                text: note.text().to_owned(),
            }),
            SequenceEvent::Activation(activation) => Statement::Directive(Directive::Activation {
                participant: activation.participant().clone(),
                marker: activation.marker(),
            }),
            SequenceEvent::BlockStart(block) => Statement::BlockStart(BlockStart {
                kind: block.kind(),
                label: block.label().map(str::to_owned),
                color: block.color().map(str::to_owned),
            }),
            SequenceEvent::SectionStart { section, .. } => Statement::Branch(Branch {
                kind: section.kind(),
                label: section.label().map(str::to_owned),
            }),
            SequenceEvent::BlockEnd(_) => Statement::End,
        };
        out.push(Lowered::at(order, statement));

        if let SequenceEvent::Message(_) = event {
            destroyed.retain(|participant| {
                if participant.destroyed_at() == Some(order) {
                    out.push(Lowered::untimed(destroy(participant)));
                    false
                } else {
                    true
                }
            });
        }
    }

    // Markers past the last statement, or pointing at positions no statement occupies.
    for participant in created {
        out.push(Lowered::untimed(declaration(participant, true)));
    }
    for participant in destroyed {
        out.push(Lowered::untimed(destroy(participant)));
    }
    out
}

fn needs_declaration(ast: &SequenceAst, participant: &SequenceParticipant) -> bool {
    participant.is_explicit()
        || participant.kind() != Default::default()
        || participant.label().is_some()
        || ast.box_of(participant.id().as_str()).is_some()
}

/// Participant order a parser would infer from `header` followed by `timeline`. A `create`
/// moves its participant to the end.
fn inferred_order<'a>(
    header: &[&'a ParticipantId],
    timeline: &'a [Lowered],
) -> Vec<&'a ParticipantId> {
    let mut seen = header.iter().map(|id| id.as_str()).collect::<HashSet<_>>();
    let mut order = header.to_vec();
    for lowered in timeline {
        if let Statement::Declaration(decl) = &lowered.statement {
            if decl.create {
                order.retain(|known| **known != decl.id);
                order.push(&decl.id);
                seen.insert(decl.id.as_str());
                continue;
            }
        }

        let mut visit = |id: &'a ParticipantId| {
            if seen.insert(id.as_str()) {
                order.push(id);
            }
        };
        match &lowered.statement {
            Statement::Declaration(decl) => visit(&decl.id),
            Statement::Message(message) => {
                visit(&message.from);
                visit(&message.to);
            }
            Statement::Note(note) => note.targets.iter().for_each(&mut visit),
            Statement::Directive(Directive::Activation { participant, .. }) => visit(participant),
            Statement::Directive(Directive::Destroy(id)) => visit(id),
            _ => {}
        }
    }
    order
}

/// Declares the shortest prefix of non-created participants that pins down order, kinds,
/// labels and boxes; the rest is left to first-reference inference. Falls back to declaring
/// every non-created participant when inference would reorder them.
fn lower_header(ast: &SequenceAst, timeline: &[Lowered]) -> Vec<Lowered> {
    let standing = ast
        .participants()
        .values()
        .filter(|p| p.created_at().is_none())
        .collect::<Vec<_>>();
    let prefix_len = standing
        .iter()
        .rposition(|p| needs_declaration(ast, p))
        .map_or(0, |idx| idx + 1);

    let prefix_ids = standing[..prefix_len]
        .iter()
        .map(|p| p.id())
        .collect::<Vec<_>>();
    let stored = ast.participants().keys().collect::<Vec<_>>();
    let declared = if inferred_order(&prefix_ids, timeline) == stored {
        &standing[..prefix_len]
    } else {
        &standing[..]
    };

    let mut out = Vec::new();
    let mut emitted_boxes: Vec<&SequenceBox> = Vec::new();
    for participant in declared {
        match ast.box_of(participant.id().as_str()) {
            Some(group) if emitted_boxes.iter().any(|done| std::ptr::eq(*done, group)) => {}
            Some(group) => {
                emitted_boxes.push(group);
                lower_box(group, declared, &mut out);
            }
            None => out.push(Lowered::untimed(declaration(participant, false))),
        }
    }
    for group in ast.boxes() {
        if !emitted_boxes.iter().any(|done| std::ptr::eq(*done, group)) {
            lower_box(group, declared, &mut out);
        }
    }
    out
}

fn lower_box(group: &SequenceBox, declared: &[&SequenceParticipant], out: &mut Vec<Lowered>) {
    out.push(Lowered::untimed(Statement::BoxStart(BoxStart {
        color: group.color().map(str::to_owned),
        label: group.label().map(str::to_owned),
    })));
    for participant in declared.iter().filter(|p| group.contains(p.id().as_str())) {
        out.push(Lowered::untimed(declaration(participant, false)));
    }
    out.push(Lowered::untimed(Statement::End));
}

struct Writer<'o> {
    out: String,
    options: &'o ExportOptions,
}

impl Writer<'_> {
    fn line(&mut self, depth: usize, parts: &[&str]) {
        self.out.extend(std::iter::repeat(' ').take(depth * self.options.indent));
        for part in parts {
            self.out.push_str(part);
        }
        self.out.push('\n');
    }
}

/// Renders statements below the header, one line each (messages may add follow-up lines).
pub(crate) fn render<'a, I>(statements: I, options: &ExportOptions) -> String
where
    I: IntoIterator<Item = &'a Statement>,
{
    let mut writer = Writer {
        out: String::new(),
        options,
    };
    if let Some(comment) = &options.header_comment {
        for line in comment.lines() {
            writer.line(0, &["%% ", line]);
        }
    }
    writer.line(0, &[HEADER]);

    let mut depth = 1usize;
    for statement in statements {
        match statement {
            Statement::Declaration(decl) => {
                let create = if decl.create { "create " } else { "" };
                let label = decl.label.as_deref().map(normalize_newlines);
                let alias = if label.is_some() { " as " } else { "" };
                let parts = [
                    create,
                    decl.kind.keyword(),
                    " ",
                    decl.id.as_str(),
                    alias,
                    label.as_deref().unwrap_or_default(),
                ];
                writer.line(depth, &parts);
            }
            Statement::Message(message) => render_message(&mut writer, depth, message),
            Statement::Note(note) => {
                let targets = note
                    .targets
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                let text = escape_text(&note.text);
                let sep = if text.is_empty() { ":" } else { ": " };
                let parts = [
                    "Note ",
                    note.placement.keyword(),
                    " ",
                    targets.as_str(),
                    sep,
                    &*text,
                ];
                writer.line(depth, &parts);
            }
            Statement::BlockStart(block) => {
                let argument = match block.kind {
                    SequenceBlockKind::Rect => block.color.as_deref(),
                    _ => block.label.as_deref(),
                };
                match argument.map(normalize_newlines) {
                    Some(argument) if !argument.is_empty() => {
                        writer.line(depth, &[block.kind.keyword(), " ", &*argument])
                    }
                    _ => writer.line(depth, &[block.kind.keyword()]),
                }
                depth += 1;
            }
            Statement::BoxStart(group) => {
                let label = group.label.as_deref().map(normalize_newlines);
                let color = match (&group.color, &label) {
                    (Some(color), _) => Some(color.as_str()),
                    (None, Some(label)) if starts_with_color(label) => Some(transparent()),
                    (None, _) => None,
                };
                let mut parts = vec!["box"];
                if let Some(color) = color {
                    parts.extend([" ", color]);
                }
                if let Some(label) = &label {
                    parts.extend([" ", &**label]);
                }
                writer.line(depth, &parts);
                depth += 1;
            }
            Statement::Branch(branch) => {
                let keyword = branch.kind.keyword().unwrap_or("else");
                let outer = depth.saturating_sub(1).max(1);
                match branch.label.as_deref().map(normalize_newlines) {
                    Some(label) if !label.is_empty() => {
                        writer.line(outer, &[keyword, " ", &*label])
                    }
                    _ => writer.line(outer, &[keyword]),
                }
            }
            Statement::End => {
                depth = depth.saturating_sub(1).max(1);
                writer.line(depth, &["end"]);
            }
            Statement::Directive(directive) => render_directive(&mut writer, depth, directive),
        }
    }
    writer.out
}

fn render_directive(writer: &mut Writer<'_>, depth: usize, directive: &Directive) {
    match directive {
        Directive::Autonumber(None) => writer.line(depth, &["autonumber off"]),
        Directive::Autonumber(Some(autonumber)) => {
            let mut start_buf = itoa::Buffer::new();
            let mut step_buf = itoa::Buffer::new();
            match (autonumber.start, autonumber.step) {
                (None, None) => writer.line(depth, &["autonumber"]),
                (Some(start), None) => {
                    writer.line(depth, &["autonumber ", start_buf.format(start)])
                }
                (start, Some(step)) => {
                    let start = start_buf.format(start.unwrap_or(1));
                    writer.line(depth, &["autonumber ", start, " ", step_buf.format(step)])
                }
            }
        }
        Directive::Title(title) => writer.line(depth, &["title ", &*normalize_newlines(title)]),
        Directive::Activation {
            participant,
            marker,
        } => writer.line(depth, &[marker.keyword(), " ", participant.as_str()]),
        Directive::Destroy(id) => writer.line(depth, &["destroy ", id.as_str()]),
    }
}

/// Writes a message with the shorthand Mermaid understands and follow-up lines for the rest.
///
/// `->>+` activates the target and `->>-` deactivates the source. A follow-up `activate X`
/// folds into the target first, so on a self-message a source activation is written as a
/// leading `+` instead.
fn render_message(writer: &mut Writer<'_>, depth: usize, message: &MessageStatement) {
    let mut source = message.source_activation;
    let mut target = message.target_activation;

    let shorthand = if target == Some(ActivationMarker::Activate) {
        target = None;
        "+"
    } else if source == Some(ActivationMarker::Deactivate) {
        source = None;
        "-"
    } else {
        ""
    };
    let prefix = if message.from == message.to && source == Some(ActivationMarker::Activate) {
        source = None;
        "+"
    } else {
        ""
    };

    let text = message.text.as_deref().map(escape_text);
    let (sep, text) = match &text {
        Some(text) if text.is_empty() => (":", ""),
        Some(text) => (": ", text.as_ref()),
        None => ("", ""),
    };
    let parts = [
        prefix,
        message.from.as_str(),
        token_for(message.arrow),
        shorthand,
        message.to.as_str(),
        sep,
        text,
    ];
    writer.line(depth, &parts);

    if let Some(marker) = source {
        writer.line(depth, &[marker.keyword(), " ", message.from.as_str()]);
    }
    if let Some(marker) = target {
        writer.line(depth, &[marker.keyword(), " ", message.to.as_str()]);
    }
}

/// Canonical text of `ast`.
pub(crate) fn export(ast: &SequenceAst, options: &ExportOptions) -> String {
    let lowered = lower(ast);
    render(lowered.iter().map(|lowered| &lowered.statement), options)
}
