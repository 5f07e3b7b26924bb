// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Sequin and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

type Applied = (SequenceAst, Vec<Diagnostic>);

fn apply_seq_op(ast: &SequenceAst, op: &SeqOp) -> Result<Applied, ApplyError> {
    match op {
        SeqOp::AddParticipant { id, kind, label } => {
            check_ident(id)?;
            if ast.participant(id.as_str()).is_some() {
                return Err(ApplyError::AlreadyExists { id: id.clone() });
            }
            let mut next = ast.clone();
            let mut participant = SequenceParticipant::new(id.clone());
            participant.set_kind(*kind);
            participant.set_label(clean_label(label.as_deref()));
            next.insert_participant(participant);
            Ok(normalize(&next))
        }
        SeqOp::UpdateParticipant { id, patch } => {
            let mut next = ast.clone();
            let participant = next
                .participant_mut(id.as_str())
                .ok_or_else(|| ApplyError::NotFound { id: id.clone() })?;
            if let Some(kind) = patch.kind {
                participant.set_kind(kind);
            }
            if let Some(label) = &patch.label {
                participant.set_label(clean_label(label.as_deref()));
            }
            Ok(normalize(&next))
        }
        SeqOp::RemoveParticipant { id } => {
            require_participant(ast, id)?;
            if is_referenced(ast, id) {
                return Err(ApplyError::InUse { id: id.clone() });
            }
            let mut next = ast.clone();
            next.remove_participant(id.as_str());
            for group in next.boxes_mut() {
                group.participants_mut().retain(|member| member != id);
            }
            Ok(normalize(&next))
        }
        SeqOp::AddBox {
            label,
            color,
            members,
        } => add_box(ast, label.as_deref(), color.as_deref(), members),
        SeqOp::RemoveBox { index } => {
            if *index >= ast.boxes().len() {
                return Err(ApplyError::BoxNotFound { index: *index });
            }
            let mut next = ast.clone();
            next.boxes_mut().remove(*index);
            Ok(normalize(&next))
        }
        SeqOp::SetAutonumber { autonumber } => {
            let mut next = ast.clone();
            next.set_autonumber(autonumber.map(|mut autonumber| {
                // A step needs a start to be written.
                if autonumber.step.is_some() && autonumber.start.is_none() {
                    autonumber.start = Some(1);
                }
                autonumber
            }));
            Ok(normalize(&next))
        }
        SeqOp::SetTitle { title } => {
            let mut next = ast.clone();
            next.set_title(clean_label(title.as_deref()));
            Ok(normalize(&next))
        }
        SeqOp::CreateParticipant {
            id,
            kind,
            label,
            before,
        } => edit_timeline(ast, |statements| {
            check_ident(id)?;
            if ast.participant(id.as_str()).is_some() {
                return Err(ApplyError::AlreadyExists { id: id.clone() });
            }
            let idx = insertion_point(statements, *before)?;
            let declaration = Declaration {
                id: id.clone(),
                kind: *kind,
                label: clean_label(label.as_deref()),
                create: true,
            };
            statements.insert(idx, untimed(Statement::Declaration(declaration)));
            Ok(())
        }),
        SeqOp::DestroyParticipant { id, after } => edit_timeline(ast, |statements| {
            require_participant(ast, id)?;
            let idx = position_of(statements, *after)?;
            match &statements[idx].statement {
                Statement::Message(message) if message.from == *id || message.to == *id => {}
                Statement::Message(_) => {
                    return Err(ApplyError::NotInvolved {
                        order: *after,
                        id: id.clone(),
                    });
                }
                _ => return Err(unexpected(*after, "message")),
            }
            let removed_before = statements[..idx]
                .iter()
                .filter(|lowered| is_destroy_of(lowered, id))
                .count();
            statements.retain(|lowered| !is_destroy_of(lowered, id));
            let idx = idx - removed_before;
            let destroy = Directive::Destroy(id.clone());
            statements.insert(idx + 1, untimed(Statement::Directive(destroy)));
            Ok(())
        }),
        SeqOp::InsertMessage { before, message } => edit_timeline(ast, |statements| {
            check_ident(&message.from)?;
            check_ident(&message.to)?;
            let idx = insertion_point(statements, *before)?;
            let mut statement = MessageStatement {
                from: message.from.clone(),
                to: message.to.clone(),
                arrow: message.arrow,
                text: message.text.as_deref().map(normalize_text),
                source_activation: message.source_activation,
                target_activation: message.target_activation,
            };
            normalize_self_markers(&mut statement);
            statements.insert(idx, untimed(Statement::Message(statement)));
            Ok(())
        }),
        SeqOp::UpdateMessage { order, patch } => edit_timeline(ast, |statements| {
            let idx = position_of(statements, *order)?;
            let Statement::Message(message) = &mut statements[idx].statement else {
                return Err(unexpected(*order, "message"));
            };
            if let Some(from) = &patch.from {
                check_ident(from)?;
                message.from = from.clone();
            }
            if let Some(to) = &patch.to {
                check_ident(to)?;
                message.to = to.clone();
            }
            if let Some(arrow) = patch.arrow {
                message.arrow = arrow;
            }
            if let Some(text) = &patch.text {
                message.text = text.as_deref().map(normalize_text);
            }
            if let Some(marker) = patch.source_activation {
                message.source_activation = marker;
            }
            if let Some(marker) = patch.target_activation {
                message.target_activation = marker;
            }
            normalize_self_markers(message);
            Ok(())
        }),
        SeqOp::InsertNote { before, note } => edit_timeline(ast, |statements| {
            let targets = note_targets(ast, note)?;
            let idx = insertion_point(statements, *before)?;
            let statement = NoteStatement {
                placement: note.placement,
                targets,
                text: normalize_text(&note.text),
            };
            statements.insert(idx, untimed(Statement::Note(statement)));
            Ok(())
        }),
        SeqOp::UpdateNote { order, text } => edit_timeline(ast, |statements| {
            let idx = position_of(statements, *order)?;
            let Statement::Note(note) = &mut statements[idx].statement else {
                return Err(unexpected(*order, "note"));
            };
            note.text = normalize_text(text);
            Ok(())
        }),
        SeqOp::InsertActivation {
            before,
            participant,
            marker,
        } => edit_timeline(ast, |statements| {
            require_participant(ast, participant)?;
            let idx = insertion_point(statements, *before)?;
            let directive = Directive::Activation {
                participant: participant.clone(),
                marker: *marker,
            };
            statements.insert(idx, untimed(Statement::Directive(directive)));
            Ok(())
        }),
        SeqOp::RemoveStatement { order } => {
            edit_timeline(ast, |statements| remove_statement(statements, *order))
        }
        SeqOp::WrapInBlock { first, last, block } => {
            edit_timeline(ast, |statements| wrap_in_block(statements, *first, *last, block))
        }
        SeqOp::AddSection { block, label } => edit_timeline(ast, |statements| {
            let idx = block_start(statements, *block)?;
            let Statement::BlockStart(start) = &statements[idx].statement else {
                return Err(unexpected(*block, "block start"));
            };
            let Some(kind) = start.kind.section_kind() else {
                return Err(ApplyError::NoSections {
                    kind: start.kind.keyword(),
                });
            };
            let end = matching_end(statements, idx)?;
            let branch = Branch {
                kind,
                label: clean_label(label.as_deref()),
            };
            statements.insert(end, untimed(Statement::Branch(branch)));
            Ok(())
        }),
        SeqOp::SetBlockLabel { block, label } => edit_timeline(ast, |statements| {
            let idx = block_start(statements, *block)?;
            let Statement::BlockStart(start) = &mut statements[idx].statement else {
                return Err(unexpected(*block, "block start"));
            };
            if start.kind == SequenceBlockKind::Rect {
                return Err(invalid_block(RECT_LABEL));
            }
            start.label = clean_label(label.as_deref());
            Ok(())
        }),
    }
}

fn edit_timeline<F>(ast: &SequenceAst, edit: F) -> Result<Applied, ApplyError>
where
    F: FnOnce(&mut Vec<Lowered>) -> Result<(), ApplyError>,
{
    let mut statements = lower(ast);
    edit(&mut statements)?;
    Ok(assemble(statements.into_iter().map(|lowered| lowered.statement)))
}

fn add_box(
    ast: &SequenceAst,
    label: Option<&str>,
    color: Option<&str>,
    members: &[ParticipantId],
) -> Result<Applied, ApplyError> {
    let color = match color.map(str::trim).filter(|color| !color.is_empty()) {
        Some(color) if !is_color(color) => {
            return Err(invalid_box("color is not a CSS color"));
        }
        Some(color) if color.eq_ignore_ascii_case("transparent") => None,
        other => other.map(str::to_owned),
    };

    let mut positions = Vec::with_capacity(members.len());
    for id in members {
        let position = ast
            .participants()
            .get_index_of(id.as_str())
            .ok_or_else(|| ApplyError::NotFound { id: id.clone() })?;
        if ast.box_of(id.as_str()).is_some() {
            return Err(ApplyError::AlreadyBoxed { id: id.clone() });
        }
        if ast.participants()[position].created_at().is_some() {
            return Err(invalid_box("created participants cannot be boxed"));
        }
        positions.push(position);
    }
    positions.sort_unstable();
    positions.dedup();
    if positions.windows(2).any(|pair| pair[1] != pair[0] + 1) {
        return Err(invalid_box("members must be adjacent in participant order"));
    }

    let mut next = ast.clone();
    let members = positions
        .iter()
        .filter_map(|&position| ast.participants().get_index(position))
        .map(|(id, _)| id.clone())
        .collect();
    next.boxes_mut().push(SequenceBox::new(clean_label(label), color, members));
    Ok(normalize(&next))
}

fn remove_statement(statements: &mut Vec<Lowered>, order: usize) -> Result<(), ApplyError> {
    let idx = position_of(statements, order)?;
    match &statements[idx].statement {
        Statement::End => return Err(ApplyError::NotRemovable { order }),
        Statement::BlockStart(_) => {
            let end = matching_end(statements, idx)?;
            let mut depth = 0usize;
            let mut doomed = vec![idx, end];
            for (offset, lowered) in statements[idx + 1..end].iter().enumerate() {
                match lowered.statement {
                    Statement::BlockStart(_) | Statement::BoxStart(_) => depth += 1,
                    Statement::End => depth = depth.saturating_sub(1),
                    Statement::Branch(_) if depth == 0 => doomed.push(idx + 1 + offset),
                    _ => {}
                }
            }
            doomed.sort_unstable();
            for position in doomed.into_iter().rev() {
                statements.remove(position);
            }
        }
        _ => {
            statements.remove(idx);
        }
    }
    Ok(())
}

fn wrap_in_block(
    statements: &mut Vec<Lowered>,
    first: usize,
    last: usize,
    block: &BlockSpec,
) -> Result<(), ApplyError> {
    let label = clean_label(block.label.as_deref());
    let color = block
        .color
        .as_deref()
        .map(str::trim)
        .filter(|color| !color.is_empty())
        .map(str::to_owned);
    match block.kind {
        SequenceBlockKind::Rect if label.is_some() => return Err(invalid_block(RECT_LABEL)),
        SequenceBlockKind::Rect => {}
        _ if color.is_some() => return Err(invalid_block("only rect blocks carry a color")),
        _ => {}
    }

    let invalid = ApplyError::InvalidRange { first, last };
    if first > last {
        return Err(invalid);
    }
    let mut start = position_of(statements, first)?;
    let mut end = position_of(statements, last)?;
    if matches!(statements[end].statement, Statement::BlockStart(_)) {
        end = matching_end(statements, end)?;
    }
    // Keep create declarations with the statement they precede, destroys with their message.
    while start > 0 && is_create(&statements[start - 1]) {
        start -= 1;
    }
    while end + 1 < statements.len() && is_destroy(&statements[end + 1]) {
        end += 1;
    }

    let mut depth = 0usize;
    for lowered in &statements[start..=end] {
        match lowered.statement {
            Statement::BlockStart(_) | Statement::BoxStart(_) => depth += 1,
            Statement::End if depth == 0 => return Err(invalid),
            Statement::End => depth -= 1,
            Statement::Branch(_) if depth == 0 => return Err(invalid),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid);
    }

    statements.insert(end + 1, untimed(Statement::End));
    let opening = BlockStart {
        kind: block.kind,
        label,
        color,
    };
    statements.insert(start, untimed(Statement::BlockStart(opening)));
    Ok(())
}

fn normalize(ast: &SequenceAst) -> Applied {
    assemble(lower(ast).into_iter().map(|lowered| lowered.statement))
}

fn untimed(statement: Statement) -> Lowered {
    Lowered {
        order: None,
        statement,
    }
}

const RECT_LABEL: &str = "rect blocks carry a color, not a label";

fn unexpected(order: usize, expected: &'static str) -> ApplyError {
    ApplyError::UnexpectedStatement { order, expected }
}

fn invalid_box(reason: &'static str) -> ApplyError {
    ApplyError::InvalidBox { reason }
}

fn invalid_block(reason: &'static str) -> ApplyError {
    ApplyError::InvalidBlock { reason }
}

fn check_ident(id: &ParticipantId) -> Result<(), ApplyError> {
    validate_mermaid_ident(id.as_str()).map_err(|reason| ApplyError::InvalidIdent {
        id: id.clone(),
        reason,
    })
}

fn require_participant(ast: &SequenceAst, id: &ParticipantId) -> Result<(), ApplyError> {
    match ast.participant(id.as_str()) {
        Some(_) => Ok(()),
        None => Err(ApplyError::NotFound { id: id.clone() }),
    }
}

/// Trimmed, single-line, and `None` when empty.
fn clean_label(label: Option<&str>) -> Option<String> {
    let label = normalize_text(label?.trim());
    (!label.is_empty()).then_some(label)
}

fn normalize_text(text: &str) -> String {
    normalize_newlines(text).into_owned()
}

fn is_referenced(ast: &SequenceAst, id: &ParticipantId) -> bool {
    ast.events().iter().any(|event| match event {
        SequenceEvent::Message(message) => message.involves(id.as_str()),
        SequenceEvent::Note(note) => note.targets().contains(id),
        SequenceEvent::Activation(activation) => activation.participant() == id,
        _ => false,
    })
}

fn note_targets(ast: &SequenceAst, note: &NoteSpec) -> Result<NoteTargets, ApplyError> {
    match (note.placement, note.targets.len()) {
        (_, 0) => {
            return Err(ApplyError::InvalidNote {
                reason: "a note needs at least one target",
            });
        }
        (NotePlacement::LeftOf | NotePlacement::RightOf, 1) | (NotePlacement::Over, _) => {}
        _ => {
            return Err(ApplyError::InvalidNote {
                reason: "sided notes take exactly one target",
            });
        }
    }
    for target in &note.targets {
        require_participant(ast, target)?;
    }
    Ok(note.targets.iter().cloned().collect())
}

/// A self-message cannot carry a lone deactivation on its target; it belongs on the source.
fn normalize_self_markers(message: &mut MessageStatement) {
    if message.from == message.to
        && message.source_activation.is_none()
        && message.target_activation == Some(ActivationMarker::Deactivate)
    {
        message.source_activation = message.target_activation.take();
    }
}

fn position_of(statements: &[Lowered], order: usize) -> Result<usize, ApplyError> {
    statements
        .iter()
        .position(|lowered| lowered.order == Some(order))
        .ok_or(ApplyError::UnknownOrder { order })
}

fn block_start(statements: &[Lowered], order: usize) -> Result<usize, ApplyError> {
    let idx = position_of(statements, order)?;
    match statements[idx].statement {
        Statement::BlockStart(_) => Ok(idx),
        _ => Err(unexpected(order, "block start")),
    }
}

/// Index to insert at so the new statement takes the place of the one at `before`. Create
/// declarations that precede that statement stay attached to it.
fn insertion_point(statements: &[Lowered], before: Option<usize>) -> Result<usize, ApplyError> {
    let Some(order) = before else {
        return Ok(statements.len());
    };
    let mut idx = position_of(statements, order)?;
    while idx > 0 && is_create(&statements[idx - 1]) {
        idx -= 1;
    }
    Ok(idx)
}

fn matching_end(statements: &[Lowered], start: usize) -> Result<usize, ApplyError> {
    let mut depth = 0usize;
    for (idx, lowered) in statements.iter().enumerate().skip(start) {
        match lowered.statement {
            Statement::BlockStart(_) | Statement::BoxStart(_) => depth += 1,
            Statement::End => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx);
                }
            }
            _ => {}
        }
    }
    // Lowering always closes what it opens.
    Err(ApplyError::UnknownOrder {
        order: statements[start].order.unwrap_or_default(),
    })
}

fn is_create(lowered: &Lowered) -> bool {
    matches!(&lowered.statement, Statement::Declaration(declaration) if declaration.create)
}

fn is_destroy(lowered: &Lowered) -> bool {
    matches!(lowered.statement, Statement::Directive(Directive::Destroy(_)))
}

fn is_destroy_of(lowered: &Lowered, id: &ParticipantId) -> bool {
    matches!(
        &lowered.statement,
        Statement::Directive(Directive::Destroy(destroyed)) if destroyed == id
    )
}
