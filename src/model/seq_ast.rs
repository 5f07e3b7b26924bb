// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::arrow::{ActivationMarker, ArrowType};
use super::ids::ParticipantId;

/// A parsed (or edited) sequence diagram.
///
/// Participants keep their declaration/first-reference order. The timeline is an explicit tree:
/// blocks own their sections and sections own their child items. Every timeline statement
/// carries a strictly increasing `order`; block starts, section starts and block ends consume
/// order positions too, so blocks can be anchored between specific messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceAst {
    participants: IndexMap<ParticipantId, SequenceParticipant>,
    boxes: Vec<SequenceBox>,
    items: Vec<SequenceItem>,
    autonumber: Option<Autonumber>,
    title: Option<String>,
}

impl SequenceAst {
    pub fn participants(&self) -> &IndexMap<ParticipantId, SequenceParticipant> {
        &self.participants
    }

    pub fn participant(&self, id: &str) -> Option<&SequenceParticipant> {
        self.participants.get(id)
    }

    pub fn participant_mut(&mut self, id: &str) -> Option<&mut SequenceParticipant> {
        self.participants.get_mut(id)
    }

    /// Inserts `participant` keyed by its id.
    ///
    /// An existing entry is replaced in place and keeps its position.
    pub fn insert_participant(&mut self, participant: SequenceParticipant) {
        self.participants.insert(participant.id().clone(), participant);
    }

    /// Removes a participant, preserving the relative order of the others.
    pub fn remove_participant(&mut self, id: &str) -> Option<SequenceParticipant> {
        let removed = self.participants.shift_remove(id)?;
        for group in &mut self.boxes {
            group.participants.retain(|member| member.as_str() != id);
        }
        Some(removed)
    }

    pub fn boxes(&self) -> &[SequenceBox] {
        &self.boxes
    }

    pub fn boxes_mut(&mut self) -> &mut Vec<SequenceBox> {
        &mut self.boxes
    }

    pub fn box_of(&self, id: &str) -> Option<&SequenceBox> {
        self.boxes.iter().find(|group| group.contains(id))
    }

    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<SequenceItem> {
        &mut self.items
    }

    pub fn autonumber(&self) -> Option<Autonumber> {
        self.autonumber
    }

    pub fn set_autonumber(&mut self, autonumber: Option<Autonumber>) {
        self.autonumber = autonumber;
    }

    pub fn is_autonumbered(&self) -> bool {
        self.autonumber.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title<T: Into<String>>(&mut self, title: Option<T>) {
        self.title = title.map(Into::into);
    }

    /// Flattened timeline in `order`.
    pub fn events(&self) -> Vec<SequenceEvent<'_>> {
        let mut out = Vec::new();
        push_events(&self.items, &mut out);
        out
    }

    /// Number of order positions consumed by the timeline.
    ///
    /// A block that was never closed ends *at* this value without consuming it.
    pub fn timeline_len(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| !matches!(event, SequenceEvent::BlockEnd(block) if !block.is_closed()))
            .map(|event| event.order() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Returns messages in timeline order, descending into blocks.
    pub fn messages(&self) -> Vec<&SequenceMessage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SequenceEvent::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn notes(&self) -> Vec<&SequenceNote> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SequenceEvent::Note(note) => Some(note),
                _ => None,
            })
            .collect()
    }

    /// Returns every block (outer blocks first) in timeline order.
    pub fn blocks(&self) -> Vec<&SequenceBlock> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SequenceEvent::BlockStart(block) => Some(block),
                _ => None,
            })
            .collect()
    }

    pub fn find_message(&self, order: usize) -> Option<&SequenceMessage> {
        self.messages()
            .into_iter()
            .find(|message| message.order() == order)
    }

    pub fn find_block(&self, start_order: usize) -> Option<&SequenceBlock> {
        self.blocks()
            .into_iter()
            .find(|block| block.start_order() == start_order)
    }

    pub fn event_at(&self, order: usize) -> Option<SequenceEvent<'_>> {
        self.events()
            .into_iter()
            .find(|event| event.order() == order)
    }
}

fn push_events<'a>(items: &'a [SequenceItem], out: &mut Vec<SequenceEvent<'a>>) {
    for item in items {
        match item {
            SequenceItem::Message(message) => out.push(SequenceEvent::Message(message)),
            SequenceItem::Note(note) => out.push(SequenceEvent::Note(note)),
            SequenceItem::Activation(activation) => out.push(SequenceEvent::Activation(activation)),
            SequenceItem::Block(block) => {
                out.push(SequenceEvent::BlockStart(block));
                for (idx, section) in block.sections().iter().enumerate() {
                    if idx > 0 {
                        out.push(SequenceEvent::SectionStart { block, section });
                    }
                    push_events(section.items(), out);
                }
                out.push(SequenceEvent::BlockEnd(block));
            }
        }
    }
}

/// One statement of the flattened timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent<'a> {
    Message(&'a SequenceMessage),
    Note(&'a SequenceNote),
    Activation(&'a SequenceActivation),
    BlockStart(&'a SequenceBlock),
    SectionStart {
        block: &'a SequenceBlock,
        section: &'a SequenceSection,
    },
    BlockEnd(&'a SequenceBlock),
}

impl SequenceEvent<'_> {
    pub fn order(&self) -> usize {
        match self {
            Self::Message(message) => message.order(),
            Self::Note(note) => note.order(),
            Self::Activation(activation) => activation.order(),
            Self::BlockStart(block) => block.start_order(),
            Self::SectionStart { section, .. } => section.start_order(),
            Self::BlockEnd(block) => block.end_order(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    #[default]
    Participant,
    Actor,
}

impl ParticipantKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Actor => "actor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceParticipant {
    id: ParticipantId,
    kind: ParticipantKind,
    label: Option<String>,
    explicit: bool,
    created_at: Option<usize>,
    destroyed_at: Option<usize>,
}

impl SequenceParticipant {
    /// An explicitly declared `participant` without alias.
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            kind: ParticipantKind::Participant,
            label: None,
            explicit: true,
            created_at: None,
            destroyed_at: None,
        }
    }

    /// A participant inferred from its first reference.
    pub fn implicit(id: ParticipantId) -> Self {
        Self {
            explicit: false,
            ..Self::new(id)
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ParticipantKind) {
        self.kind = kind;
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    /// Label if present, id otherwise.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn set_explicit(&mut self, explicit: bool) {
        self.explicit = explicit;
    }

    pub fn created_at(&self) -> Option<usize> {
        self.created_at
    }

    pub fn set_created_at(&mut self, order: Option<usize>) {
        self.created_at = order;
    }

    pub fn destroyed_at(&self) -> Option<usize> {
        self.destroyed_at
    }

    pub fn set_destroyed_at(&mut self, order: Option<usize>) {
        self.destroyed_at = order;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceBox {
    label: Option<String>,
    color: Option<String>,
    participants: Vec<ParticipantId>,
}

impl SequenceBox {
    pub fn new(
        label: Option<String>,
        color: Option<String>,
        participants: Vec<ParticipantId>,
    ) -> Self {
        Self {
            label,
            color,
            participants,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn participants_mut(&mut self) -> &mut Vec<ParticipantId> {
        &mut self.participants
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.iter().any(|member| member.as_str() == id)
    }
}

/// `autonumber [start [step]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Autonumber {
    pub start: Option<u32>,
    pub step: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SequenceItem {
    Message(SequenceMessage),
    Note(SequenceNote),
    Activation(SequenceActivation),
    Block(SequenceBlock),
}

impl SequenceItem {
    /// Order of the first position the item occupies.
    pub fn order(&self) -> usize {
        match self {
            Self::Message(message) => message.order(),
            Self::Note(note) => note.order(),
            Self::Activation(activation) => activation.order(),
            Self::Block(block) => block.start_order(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMessage {
    from: ParticipantId,
    to: ParticipantId,
    arrow: ArrowType,
    text: Option<String>,
    order: usize,
    source_activation: Option<ActivationMarker>,
    target_activation: Option<ActivationMarker>,
}

impl SequenceMessage {
    pub fn new(
        from: ParticipantId,
        to: ParticipantId,
        arrow: ArrowType,
        text: Option<String>,
        order: usize,
    ) -> Self {
        Self {
            from,
            to,
            arrow,
            text,
            order,
            source_activation: None,
            target_activation: None,
        }
    }

    pub fn from(&self) -> &ParticipantId {
        &self.from
    }

    pub fn to(&self) -> &ParticipantId {
        &self.to
    }

    pub fn arrow(&self) -> ArrowType {
        self.arrow
    }

    pub fn set_arrow(&mut self, arrow: ArrowType) {
        self.arrow = arrow;
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text<T: Into<String>>(&mut self, text: Option<T>) {
        self.text = text.map(Into::into);
    }

    /// Text split on `<br>` line-break markers.
    pub fn text_lines(&self) -> Vec<&str> {
        self.text
            .as_deref()
            .map(split_line_breaks)
            .unwrap_or_default()
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn involves(&self, id: &str) -> bool {
        self.from.as_str() == id || self.to.as_str() == id
    }

    pub fn source_activation(&self) -> Option<ActivationMarker> {
        self.source_activation
    }

    pub fn target_activation(&self) -> Option<ActivationMarker> {
        self.target_activation
    }

    pub fn set_source_activation(&mut self, marker: Option<ActivationMarker>) {
        self.source_activation = marker;
    }

    pub fn set_target_activation(&mut self, marker: Option<ActivationMarker>) {
        self.target_activation = marker;
    }

    pub fn activates_source(&self) -> bool {
        self.source_activation == Some(ActivationMarker::Activate)
    }

    pub fn deactivates_source(&self) -> bool {
        self.source_activation == Some(ActivationMarker::Deactivate)
    }

    pub fn activates_target(&self) -> bool {
        self.target_activation == Some(ActivationMarker::Activate)
    }

    pub fn deactivates_target(&self) -> bool {
        self.target_activation == Some(ActivationMarker::Deactivate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotePlacement {
    LeftOf,
    RightOf,
    Over,
}

impl NotePlacement {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::LeftOf => "left of",
            Self::RightOf => "right of",
            Self::Over => "over",
        }
    }
}

pub type NoteTargets = SmallVec<[ParticipantId; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceNote {
    placement: NotePlacement,
    targets: NoteTargets,
    text: String,
    order: usize,
}

impl SequenceNote {
    pub fn new(
        placement: NotePlacement,
        targets: NoteTargets,
        text: impl Into<String>,
        order: usize,
    ) -> Self {
        Self {
            placement,
            targets,
            text: text.into(),
            order,
        }
    }

    pub fn placement(&self) -> NotePlacement {
        self.placement
    }

    pub fn targets(&self) -> &[ParticipantId] {
        &self.targets
    }

    /// `over` a single participant renders centered on its lifeline.
    pub fn is_centered(&self) -> bool {
        self.placement == NotePlacement::Over && self.targets.len() == 1
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text_lines(&self) -> Vec<&str> {
        split_line_breaks(&self.text)
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

/// A standalone `activate`/`deactivate` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceActivation {
    participant: ParticipantId,
    marker: ActivationMarker,
    order: usize,
}

impl SequenceActivation {
    pub fn new(participant: ParticipantId, marker: ActivationMarker, order: usize) -> Self {
        Self {
            participant,
            marker,
            order,
        }
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn marker(&self) -> ActivationMarker {
        self.marker
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceBlockKind {
    Loop,
    Alt,
    Opt,
    Par,
    Critical,
    Break,
    Rect,
}

impl SequenceBlockKind {
    pub const ALL: [SequenceBlockKind; 7] = [
        SequenceBlockKind::Loop,
        SequenceBlockKind::Alt,
        SequenceBlockKind::Opt,
        SequenceBlockKind::Par,
        SequenceBlockKind::Critical,
        SequenceBlockKind::Break,
        SequenceBlockKind::Rect,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Alt => "alt",
            Self::Opt => "opt",
            Self::Par => "par",
            Self::Critical => "critical",
            Self::Break => "break",
            Self::Rect => "rect",
        }
    }

    /// The continuation keyword that opens another section, if the kind has one.
    pub fn section_kind(self) -> Option<SequenceSectionKind> {
        match self {
            Self::Alt => Some(SequenceSectionKind::Else),
            Self::Par => Some(SequenceSectionKind::And),
            Self::Critical => Some(SequenceSectionKind::Option),
            Self::Loop | Self::Opt | Self::Break | Self::Rect => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceBlock {
    kind: SequenceBlockKind,
    label: Option<String>,
    color: Option<String>,
    start_order: usize,
    end_order: usize,
    closed: bool,
    sections: Vec<SequenceSection>,
}

impl SequenceBlock {
    /// `sections` must start with the main section, whose `start_order` equals `start_order`.
    pub fn new(
        kind: SequenceBlockKind,
        label: Option<String>,
        color: Option<String>,
        start_order: usize,
        end_order: usize,
        sections: Vec<SequenceSection>,
    ) -> Self {
        Self {
            kind,
            label,
            color,
            start_order,
            end_order,
            closed: true,
            sections,
        }
    }

    pub fn kind(&self) -> SequenceBlockKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    /// Background color; only meaningful for `rect`.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn start_order(&self) -> usize {
        self.start_order
    }

    pub fn end_order(&self) -> usize {
        self.end_order
    }

    /// `false` when the source never closed the block; it then ends at the timeline length.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn mark_unclosed(&mut self) {
        self.closed = false;
    }

    pub fn sections(&self) -> &[SequenceSection] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut Vec<SequenceSection> {
        &mut self.sections
    }

    /// `start < order < end`.
    pub fn spans(&self, order: usize) -> bool {
        self.start_order < order && order < self.end_order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceSectionKind {
    Main,
    Else,
    And,
    Option,
}

impl SequenceSectionKind {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Main => None,
            Self::Else => Some("else"),
            Self::And => Some("and"),
            Self::Option => Some("option"),
        }
    }
}

/// One branch of a block: the main body, or an `else`/`and`/`option` continuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSection {
    kind: SequenceSectionKind,
    label: Option<String>,
    start_order: usize,
    items: Vec<SequenceItem>,
}

impl SequenceSection {
    pub fn new(
        kind: SequenceSectionKind,
        label: Option<String>,
        start_order: usize,
        items: Vec<SequenceItem>,
    ) -> Self {
        Self {
            kind,
            label,
            start_order,
            items,
        }
    }

    pub fn kind(&self) -> SequenceSectionKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn start_order(&self) -> usize {
        self.start_order
    }

    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<SequenceItem> {
        &mut self.items
    }
}

fn line_break_regex() -> &'static Regex {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    LINE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid <br> regex"))
}

fn split_line_breaks(text: &str) -> Vec<&str> {
    line_break_regex().split(text).collect()
}
