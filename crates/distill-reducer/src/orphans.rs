//! Fold moves left standing between clicks into the adjacent click

use crate::reducer::Reducer;
use crate::report::Diagnostics;
use distill_core::{ActionEvent, Child, Stage};
use tracing::info;

/// Attaches standalone move runs to a neighboring click-family node.
///
/// A run goes to the click directly after it. A run that ends the log goes
/// to the click directly before it. Runs next to anything else stay put.
#[derive(Debug, Default)]
pub struct OrphanMoveAbsorber;

impl OrphanMoveAbsorber {
    pub fn new() -> Self {
        Self
    }

    pub fn absorb(&self, events: Vec<ActionEvent>) -> Vec<ActionEvent> {
        let before = events.len();
        let mut out: Vec<ActionEvent> = Vec::with_capacity(before);
        let mut pending: Vec<ActionEvent> = Vec::new();
        let mut forward = 0usize;
        let mut backward = 0usize;

        for event in events {
            if event.is_move() {
                pending.push(event);
            } else if event.is_click_family() {
                if pending.is_empty() {
                    out.push(event);
                } else {
                    forward += 1;
                    out.push(prepend_moves(event, std::mem::take(&mut pending)));
                }
            } else {
                out.append(&mut pending);
                out.push(event);
            }
        }

        if !pending.is_empty() {
            match out.pop() {
                Some(last) if last.is_click_family() => {
                    backward += 1;
                    out.push(append_moves(last, pending));
                }
                last => {
                    out.extend(last);
                    out.append(&mut pending);
                }
            }
        }

        info!(
            stage = %Stage::OrphanMoves,
            before,
            after = out.len(),
            forward,
            backward,
            "stage done"
        );
        out
    }
}

impl Reducer for OrphanMoveAbsorber {
    fn stage(&self) -> Stage {
        Stage::OrphanMoves
    }

    fn reduce(&self, events: Vec<ActionEvent>, _diagnostics: &mut Diagnostics) -> Vec<ActionEvent> {
        self.absorb(events)
    }
}

fn as_child(node: ActionEvent) -> Child {
    match node.into_raw() {
        Ok(raw) => Child::Raw(raw),
        Err(node) => Child::Action(node),
    }
}

fn mark(reducers: &mut Vec<Stage>) {
    if reducers.last() != Some(&Stage::OrphanMoves) {
        reducers.push(Stage::OrphanMoves);
    }
}

/// Moves come first, then the click's own children; identity is unchanged.
fn prepend_moves(mut click: ActionEvent, moves: Vec<ActionEvent>) -> ActionEvent {
    let mut children: Vec<Child> = moves.into_iter().map(as_child).collect();
    children.append(&mut click.children);
    click.children = children;
    mark(&mut click.reducers);
    click
}

fn append_moves(mut click: ActionEvent, moves: Vec<ActionEvent>) -> ActionEvent {
    click.children.extend(moves.into_iter().map(as_child));
    mark(&mut click.reducers);
    click
}
