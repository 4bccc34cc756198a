use crate::report::Diagnostics;
use distill_core::{ActionEvent, Stage};

/// One pass over the action log.
///
/// Stages consume the log and return a new one; nodes already built are moved
/// or wrapped, never edited in place.
pub trait Reducer: Send + Sync {
    fn stage(&self) -> Stage;

    fn reduce(&self, events: Vec<ActionEvent>, diagnostics: &mut Diagnostics) -> Vec<ActionEvent>;
}
