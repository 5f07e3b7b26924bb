// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folds a statement stream into a [`SequenceAst`].
//!
//! Every timeline statement consumes one order position: messages, notes, standalone
//! activations, block starts, section starts and block ends. Declarations, boxes and
//! directives that modify existing entries do not.

use tracing::{debug, trace};

use crate::model::{
    ActivationMarker, Autonumber, ParticipantId, SequenceActivation, SequenceAst, SequenceBox,
    SequenceItem, SequenceMessage, SequenceNote,
};

use super::blocks::{BlockStack, Closed};
use super::diagnostic::{Diagnostic, DiagnosticKind, Unbalanced};
use super::participants::{ParticipantResolver, Resolution};
use super::statement::{
    BlockStart, BoxStart, Branch, Declaration, Directive, MessageStatement, NoteStatement,
    Statement,
};

pub(crate) struct SequenceAssembler {
    max_depth: Option<usize>,
    resolver: ParticipantResolver,
    stack: BlockStack,
    boxes: Vec<SequenceBox>,
    next_order: usize,
    pending_destroys: Vec<ParticipantId>,
    autonumber: Option<Autonumber>,
    title: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl SequenceAssembler {
    pub(crate) fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            resolver: ParticipantResolver::default(),
            stack: BlockStack::default(),
            boxes: Vec::new(),
            next_order: 0,
            pending_destroys: Vec::new(),
            autonumber: None,
            title: None,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, line_no: usize, kind: DiagnosticKind) {
        debug!(line_no, severity = ?kind.severity(), %kind, "recovered parse problem");
        self.diagnostics.push(Diagnostic::new(line_no, kind));
    }

    fn take_order(&mut self) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    /// Registers a reference that is not a message endpoint; unknown ids are reported.
    fn resolve_reference(&mut self, line_no: usize, id: &ParticipantId) {
        if self.resolver.resolve_or_register(id) == Resolution::Registered {
            self.report(
                line_no,
                DiagnosticKind::DanglingReference { id: id.clone() },
            );
        }
    }

    fn is_boxed(&self, id: &str) -> bool {
        self.boxes.iter().any(|group| group.contains(id))
            || self.stack.boxes().any(|open| open.contains(id))
    }

    pub(crate) fn apply(&mut self, line_no: usize, statement: Statement) {
        match statement {
            Statement::Declaration(declaration) => self.declare(line_no, declaration),
            Statement::Message(message) => self.message(message),
            Statement::Note(note) => self.note(line_no, note),
            Statement::BlockStart(block) => self.open_block(line_no, block),
            Statement::BoxStart(group) => self.open_box(line_no, group),
            Statement::Branch(branch) => self.branch(line_no, branch),
            Statement::End => self.end(line_no),
            Statement::Directive(Directive::Autonumber(autonumber)) => self.autonumber = autonumber,
            Statement::Directive(Directive::Title(title)) => self.title = Some(title),
            Statement::Directive(Directive::Activation {
                participant,
                marker,
            }) => self.activation(line_no, participant, marker),
            Statement::Directive(Directive::Destroy(id)) => self.destroy(line_no, id),
        }
    }

    fn declare(&mut self, line_no: usize, declaration: Declaration) {
        let Declaration {
            id,
            kind,
            label,
            create,
        } = declaration;
        let in_box = self.stack.innermost_box_mut().is_some();
        if create {
            if self.resolver.create(&id, kind, label, self.next_order) {
                self.report(
                    line_no,
                    DiagnosticKind::CreateAfterReference { id: id.clone() },
                );
                for group in &mut self.boxes {
                    group.participants_mut().retain(|member| *member != id);
                }
                self.stack.remove_box_member(id.as_str());
            }
            if in_box {
                self.report(line_no, DiagnosticKind::CreatedParticipantBoxed { id });
            }
            return;
        }

        let created = self
            .resolver
            .declare(&id, kind, label, true)
            .created_at()
            .is_some();
        if !in_box {
            return;
        }
        if created {
            self.report(line_no, DiagnosticKind::CreatedParticipantBoxed { id });
        } else if self.is_boxed(id.as_str()) {
            self.report(line_no, DiagnosticKind::ParticipantAlreadyBoxed { id });
        } else if let Some(open) = self.stack.innermost_box_mut() {
            open.add_member(id);
        }
    }

    fn message(&mut self, statement: MessageStatement) {
        let MessageStatement {
            from,
            to,
            arrow,
            text,
            source_activation,
            target_activation,
        } = statement;
        self.resolver.resolve_or_register(&from);
        self.resolver.resolve_or_register(&to);

        let order = self.take_order();
        let mut message = SequenceMessage::new(from, to, arrow, text, order);
        message.set_source_activation(source_activation);
        message.set_target_activation(target_activation);

        let pending = std::mem::take(&mut self.pending_destroys);
        for id in pending {
            if message.involves(id.as_str()) {
                if let Some(participant) = self.resolver.get_mut(id.as_str()) {
                    participant.set_destroyed_at(Some(order));
                }
            } else {
                self.pending_destroys.push(id);
            }
        }
        if arrow.is_destroying() {
            if let Some(target) = self.resolver.get_mut(message.to().as_str()) {
                if target.destroyed_at().is_none() {
                    target.set_destroyed_at(Some(order));
                }
            }
        }

        self.stack.push_item(SequenceItem::Message(message));
    }

    fn note(&mut self, line_no: usize, note: NoteStatement) {
        for target in &note.targets {
            self.resolve_reference(line_no, target);
        }
        let order = self.take_order();
        let note = SequenceNote::new(note.placement, note.targets, note.text, order);
        self.stack.push_item(SequenceItem::Note(note));
    }

    /// The message directly before the current position, if the last statement was one.
    fn previous_message_mut(&mut self) -> Option<&mut SequenceMessage> {
        let previous = self.next_order.checked_sub(1)?;
        match self.stack.last_item_mut()? {
            SequenceItem::Message(message) if message.order() == previous => Some(message),
            _ => None,
        }
    }

    /// Folds an `activate`/`deactivate` line into the previous message when it names one of
    /// its endpoints that has no marker yet. Activation prefers the target, deactivation the
    /// source.
    fn fold_activation(&mut self, id: &ParticipantId, marker: ActivationMarker) -> bool {
        let Some(message) = self.previous_message_mut() else {
            return false;
        };
        let source_free = message.from() == id && message.source_activation().is_none();
        let target_free = message.to() == id && message.target_activation().is_none();
        let prefer_target = marker == ActivationMarker::Activate;
        let (first_free, second_free) = if prefer_target {
            (target_free, source_free)
        } else {
            (source_free, target_free)
        };

        let set_target = match (first_free, second_free) {
            (true, _) => prefer_target,
            (false, true) => !prefer_target,
            (false, false) => return false,
        };
        if set_target {
            message.set_target_activation(Some(marker));
        } else {
            message.set_source_activation(Some(marker));
        }
        true
    }

    fn activation(&mut self, line_no: usize, participant: ParticipantId, marker: ActivationMarker) {
        self.resolve_reference(line_no, &participant);
        if self.fold_activation(&participant, marker) {
            trace!(line_no, participant = %participant, ?marker, "folded activation into message");
            return;
        }
        let order = self.take_order();
        let activation = SequenceActivation::new(participant, marker, order);
        self.stack.push_item(SequenceItem::Activation(activation));
    }

    fn destroy(&mut self, line_no: usize, id: ParticipantId) {
        self.resolve_reference(line_no, &id);
        let attached = self
            .previous_message_mut()
            .filter(|message| message.involves(id.as_str()))
            .map(|message| message.order());
        match attached {
            Some(order) => {
                if let Some(participant) = self.resolver.get_mut(id.as_str()) {
                    participant.set_destroyed_at(Some(order));
                }
            }
            None => {
                if !self.pending_destroys.contains(&id) {
                    self.pending_destroys.push(id);
                }
            }
        }
    }

    fn open_block(&mut self, line_no: usize, block: BlockStart) {
        if let Some(max_depth) = self.max_depth {
            if self.stack.block_depth() >= max_depth {
                self.report(line_no, DiagnosticKind::NestingTooDeep { max_depth });
            }
        }
        let order = self.take_order();
        self.stack.open_block(block.kind, block.label, block.color, order, line_no);
    }

    fn open_box(&mut self, line_no: usize, group: BoxStart) {
        if !self.stack.is_empty() {
            self.report(line_no, DiagnosticKind::MisplacedBox);
        }
        self.stack.open_box(group.label, group.color, line_no);
    }

    fn branch(&mut self, line_no: usize, branch: Branch) {
        let accepts = self
            .stack
            .top_block_mut()
            .is_some_and(|block| block.kind().section_kind() == Some(branch.kind));
        if accepts {
            let order = self.take_order();
            self.stack.start_section(branch.kind, branch.label, order);
            return;
        }

        let keyword = branch.kind.keyword().unwrap_or_default();
        let line = match &branch.label {
            Some(label) => format!("{keyword} {label}"),
            None => keyword.to_owned(),
        };
        let attached = match self.stack.top_block_mut() {
            Some(block) => {
                block.append_to_label(&line);
                true
            }
            None => false,
        };
        self.report(
            line_no,
            DiagnosticKind::InvalidBranchContext { line, attached },
        );
    }

    fn end(&mut self, line_no: usize) {
        if self.stack.is_empty() {
            self.report(
                line_no,
                DiagnosticKind::UnbalancedBlock(Unbalanced::UnmatchedEnd),
            );
            return;
        }
        // Box ends do not consume the position.
        let candidate = self.next_order;
        match self.stack.pop(candidate) {
            Some(Closed::Block { kind }) => {
                self.next_order += 1;
                trace!(
                    line_no,
                    block = kind.keyword(),
                    end_order = candidate,
                    "closed block"
                );
            }
            Some(Closed::Box(group)) => self.boxes.push(group),
            None => {}
        }
    }

    pub(crate) fn finish(mut self) -> (SequenceAst, Vec<Diagnostic>) {
        let end_order = self.next_order;
        for id in std::mem::take(&mut self.pending_destroys) {
            if let Some(participant) = self.resolver.get_mut(id.as_str()) {
                participant.set_destroyed_at(Some(end_order));
            }
        }

        let (items, open_boxes, unclosed) = self.stack.finish(end_order);
        self.boxes.extend(open_boxes);
        for frame in unclosed {
            self.diagnostics.push(Diagnostic::new(
                frame.line_no,
                DiagnosticKind::UnbalancedBlock(Unbalanced::Unclosed {
                    keyword: frame.keyword,
                }),
            ));
        }
        self.diagnostics.sort_by_key(|diagnostic| diagnostic.line_no);

        let mut ast = SequenceAst::default();
        for participant in self.resolver.into_participants().into_values() {
            ast.insert_participant(participant);
        }
        *ast.boxes_mut() = self.boxes;
        *ast.items_mut() = items;
        ast.set_autonumber(self.autonumber);
        ast.set_title(self.title);

        debug!(
            participants = ast.participants().len(),
            items = ast.items().len(),
            timeline_len = end_order,
            diagnostics = self.diagnostics.len(),
            "assembled sequence diagram"
        );
        (ast, self.diagnostics)
    }
}

/// Rebuilds a model from statements that were produced by lowering a model.
pub(crate) fn assemble<I>(statements: I) -> (SequenceAst, Vec<Diagnostic>)
where
    I: IntoIterator<Item = Statement>,
{
    let mut assembler = SequenceAssembler::new(None);
    for (idx, statement) in statements.into_iter().enumerate() {
        assembler.apply(idx + 1, statement);
    }
    assembler.finish()
}
