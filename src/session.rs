use crate::reconcile::HabitSchedule;

/// Viewing/editing state for one schedule.
///
/// Saving or cancelling always switches back to a schedule reloaded from the
/// store. The draft is never promoted to the saved view directly.
#[derive(Debug, Clone)]
pub enum EditSession {
    Viewing(HabitSchedule),
    Editing {
        saved: HabitSchedule,
        draft: HabitSchedule,
    },
}

impl EditSession {
    pub fn new(saved: HabitSchedule) -> Self {
        EditSession::Viewing(saved)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    /// What should be shown right now: the draft while editing.
    pub fn current(&self) -> &HabitSchedule {
        match self {
            EditSession::Viewing(saved) => saved,
            EditSession::Editing { draft, .. } => draft,
        }
    }

    pub fn saved(&self) -> &HabitSchedule {
        match self {
            EditSession::Viewing(saved) | EditSession::Editing { saved, .. } => saved,
        }
    }

    /// Starts editing from a copy of the saved schedule. Calling this while
    /// already editing keeps the existing draft.
    pub fn begin_edit(&mut self) -> &mut HabitSchedule {
        if let EditSession::Viewing(saved) = self {
            let saved = std::mem::take(saved);
            *self = EditSession::Editing {
                draft: saved.clone(),
                saved,
            };
        }
        match self {
            EditSession::Editing { draft, .. } => draft,
            EditSession::Viewing(saved) => saved,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut HabitSchedule> {
        match self {
            EditSession::Editing { draft, .. } => Some(draft),
            EditSession::Viewing(_) => None,
        }
    }

    /// The draft to hand to the save workflow.
    pub fn draft(&self) -> Option<&HabitSchedule> {
        match self {
            EditSession::Editing { draft, .. } => Some(draft),
            EditSession::Viewing(_) => None,
        }
    }

    pub fn cancel(&mut self, reloaded: HabitSchedule) {
        *self = EditSession::Viewing(reloaded);
    }

    pub fn finish_save(&mut self, reloaded: HabitSchedule) {
        *self = EditSession::Viewing(reloaded);
    }
}
