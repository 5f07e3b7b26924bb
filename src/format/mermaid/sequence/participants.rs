// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use indexmap::IndexMap;

use crate::model::{ParticipantId, ParticipantKind, SequenceParticipant};

/// Whether a reference hit a known participant or registered a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Known,
    Registered,
}

/// Participant table in first-appearance order.
#[derive(Debug, Default)]
pub(crate) struct ParticipantResolver {
    participants: IndexMap<ParticipantId, SequenceParticipant>,
}

impl ParticipantResolver {
    /// Declares `id`, or updates kind and label of an existing entry in place.
    pub(crate) fn declare(
        &mut self,
        id: &ParticipantId,
        kind: ParticipantKind,
        label: Option<String>,
        explicit: bool,
    ) -> &mut SequenceParticipant {
        let participant = self
            .participants
            .entry(id.clone())
            .or_insert_with(|| SequenceParticipant::implicit(id.clone()));
        participant.set_kind(kind);
        participant.set_label(label);
        if explicit {
            participant.set_explicit(true);
        }
        participant
    }

    /// Declares `id` as created at `created_at`. The participant takes its place in the order
    /// at this point, so an entry registered earlier moves to the end. Returns whether one
    /// existed.
    pub(crate) fn create(
        &mut self,
        id: &ParticipantId,
        kind: ParticipantKind,
        label: Option<String>,
        created_at: usize,
    ) -> bool {
        let existed = self.participants.shift_remove(id).is_some();
        let mut participant = SequenceParticipant::new(id.clone());
        participant.set_kind(kind);
        participant.set_label(label);
        participant.set_created_at(Some(created_at));
        self.participants.insert(id.clone(), participant);
        existed
    }

    /// Looks `id` up, registering an implicit participant at the end of the order if unknown.
    pub(crate) fn resolve_or_register(&mut self, id: &ParticipantId) -> Resolution {
        if self.participants.contains_key(id) {
            return Resolution::Known;
        }
        self.participants.insert(id.clone(), SequenceParticipant::implicit(id.clone()));
        Resolution::Registered
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut SequenceParticipant> {
        self.participants.get_mut(id)
    }

    pub(crate) fn into_participants(self) -> IndexMap<ParticipantId, SequenceParticipant> {
        self.participants
    }
}
