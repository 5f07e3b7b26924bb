// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Stack of open blocks and boxes while the timeline tree is built.

use crate::model::{
    ParticipantId, SequenceBlock, SequenceBlockKind, SequenceBox, SequenceItem, SequenceSection,
    SequenceSectionKind,
};

#[derive(Debug)]
pub(crate) struct OpenBlock {
    kind: SequenceBlockKind,
    label: Option<String>,
    color: Option<String>,
    start_order: usize,
    sections: Vec<SequenceSection>,
    line_no: usize,
}

impl OpenBlock {
    pub(crate) fn kind(&self) -> SequenceBlockKind {
        self.kind
    }

    fn current_section_mut(&mut self) -> &mut SequenceSection {
        // `sections` always holds the main section.
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Appends `text` to the label of the section currently being filled.
    pub(crate) fn append_to_label(&mut self, text: &str) {
        let append = |label: Option<&str>| match label {
            Some(label) if !label.is_empty() => format!("{label} {text}"),
            _ => text.to_owned(),
        };
        if self.sections.len() == 1 {
            self.label = Some(append(self.label.as_deref()));
        } else {
            let section = self.current_section_mut();
            let label = append(section.label());
            section.set_label(Some(label));
        }
    }

    fn into_block(self, end_order: usize) -> SequenceBlock {
        SequenceBlock::new(
            self.kind,
            self.label,
            self.color,
            self.start_order,
            end_order,
            self.sections,
        )
    }
}

#[derive(Debug)]
pub(crate) struct OpenBox {
    label: Option<String>,
    color: Option<String>,
    members: Vec<ParticipantId>,
    line_no: usize,
}

impl OpenBox {
    pub(crate) fn add_member(&mut self, id: ParticipantId) {
        self.members.push(id);
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|member| member.as_str() == id)
    }

    fn into_box(self) -> SequenceBox {
        SequenceBox::new(self.label, self.color, self.members)
    }
}

#[derive(Debug)]
pub(crate) enum Frame {
    Block(OpenBlock),
    Box(OpenBox),
}

/// What a frame turned into when it was popped.
#[derive(Debug)]
pub(crate) enum Closed {
    /// The block was attached to its parent container.
    Block { kind: SequenceBlockKind },
    Box(SequenceBox),
}

/// Frame left open at end of input.
#[derive(Debug)]
pub(crate) struct Unclosed {
    pub keyword: &'static str,
    pub line_no: usize,
}

#[derive(Debug, Default)]
pub(crate) struct BlockStack {
    root: Vec<SequenceItem>,
    frames: Vec<Frame>,
}

impl BlockStack {
    fn container_mut(&mut self) -> &mut Vec<SequenceItem> {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Block(block) = frame {
                return block.current_section_mut().items_mut();
            }
        }
        &mut self.root
    }

    /// Appends to the innermost open section, or to the top level.
    pub(crate) fn push_item(&mut self, item: SequenceItem) {
        self.container_mut().push(item);
    }

    /// Last item of the innermost open section, or of the top level.
    pub(crate) fn last_item_mut(&mut self) -> Option<&mut SequenceItem> {
        self.container_mut().last_mut()
    }

    pub(crate) fn open_block(
        &mut self,
        kind: SequenceBlockKind,
        label: Option<String>,
        color: Option<String>,
        start_order: usize,
        line_no: usize,
    ) {
        let main = SequenceSection::new(SequenceSectionKind::Main, None, start_order, Vec::new());
        self.frames.push(Frame::Block(OpenBlock {
            kind,
            label,
            color,
            start_order,
            sections: vec![main],
            line_no,
        }));
    }

    pub(crate) fn open_box(
        &mut self,
        label: Option<String>,
        color: Option<String>,
        line_no: usize,
    ) {
        self.frames.push(Frame::Box(OpenBox {
            label,
            color,
            members: Vec::new(),
            line_no,
        }));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn block_depth(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| matches!(frame, Frame::Block(_)))
            .count()
    }

    /// The top frame, if it is a block.
    pub(crate) fn top_block_mut(&mut self) -> Option<&mut OpenBlock> {
        match self.frames.last_mut() {
            Some(Frame::Block(block)) => Some(block),
            _ => None,
        }
    }

    /// The innermost open box, wherever it sits on the stack.
    pub(crate) fn innermost_box_mut(&mut self) -> Option<&mut OpenBox> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Box(open) => Some(open),
            Frame::Block(_) => None,
        })
    }

    pub(crate) fn boxes(&self) -> impl Iterator<Item = &OpenBox> {
        self.frames.iter().filter_map(|frame| match frame {
            Frame::Box(open) => Some(open),
            Frame::Block(_) => None,
        })
    }

    /// Drops `id` from every open box.
    pub(crate) fn remove_box_member(&mut self, id: &str) {
        for frame in &mut self.frames {
            if let Frame::Box(open) = frame {
                open.members.retain(|member| member.as_str() != id);
            }
        }
    }

    /// Starts a new section of the top block.
    ///
    /// The caller checks that the top frame is a block accepting `kind`.
    pub(crate) fn start_section(
        &mut self,
        kind: SequenceSectionKind,
        label: Option<String>,
        order: usize,
    ) {
        if let Some(block) = self.top_block_mut() {
            block.sections.push(SequenceSection::new(kind, label, order, Vec::new()));
        }
    }

    /// Pops the top frame. Blocks end at `end_order` and are attached to their parent.
    pub(crate) fn pop(&mut self, end_order: usize) -> Option<Closed> {
        match self.frames.pop()? {
            Frame::Block(open) => {
                let kind = open.kind;
                let block = open.into_block(end_order);
                self.push_item(SequenceItem::Block(block));
                Some(Closed::Block { kind })
            }
            Frame::Box(open) => Some(Closed::Box(open.into_box())),
        }
    }

    /// Closes every remaining frame at `end_order` and returns the top-level items.
    ///
    /// Blocks closed here are marked unclosed and do not consume `end_order`.
    pub(crate) fn finish(
        mut self,
        end_order: usize,
    ) -> (Vec<SequenceItem>, Vec<SequenceBox>, Vec<Unclosed>) {
        let mut boxes = Vec::new();
        let mut unclosed = Vec::new();
        while let Some(frame) = self.frames.pop() {
            match frame {
                Frame::Block(open) => {
                    unclosed.push(Unclosed {
                        keyword: open.kind.keyword(),
                        line_no: open.line_no,
                    });
                    let mut block = open.into_block(end_order);
                    block.mark_unclosed();
                    self.push_item(SequenceItem::Block(block));
                }
                Frame::Box(open) => {
                    unclosed.push(Unclosed {
                        keyword: "box",
                        line_no: open.line_no,
                    });
                    boxes.push(open.into_box());
                }
            }
        }
        unclosed.reverse();
        (self.root, boxes, unclosed)
    }
}
