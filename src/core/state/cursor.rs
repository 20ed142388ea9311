//! Checkpoint cursor

/// Tracks the index a resumed run should start from
///
/// The cursor is the scan position: it moves past every record the run has
/// finished with, whether it was recorded, skipped or failed. Failed indices
/// are kept aside for reporting. They are retried by the next full pass,
/// which starts from 0 once the checkpoint is cleared. It never moves
/// backwards.
///
/// # Examples
///
/// ```
/// use ferry::core::state::CheckpointCursor;
///
/// let mut cursor = CheckpointCursor::new(10);
/// cursor.settle(10);
/// cursor.fail(11);
/// cursor.settle(12);
/// assert_eq!(cursor.position(), 13);
/// assert_eq!(cursor.failures(), &[11]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointCursor {
    position: usize,
    failures: Vec<usize>,
}

impl CheckpointCursor {
    /// Start at `position`
    pub fn new(position: usize) -> Self {
        Self {
            position,
            failures: Vec::new(),
        }
    }

    /// Record at `index` was recorded or skipped
    pub fn settle(&mut self, index: usize) {
        self.advance_past(index);
    }

    /// Record at `index` failed
    pub fn fail(&mut self, index: usize) {
        self.advance_past(index);
        self.failures.push(index);
    }

    fn advance_past(&mut self, index: usize) {
        self.position = self.position.max(index.saturating_add(1));
    }

    /// Index the next run should start from
    pub fn position(&self) -> usize {
        self.position
    }

    /// Indices that failed during this run, in order
    pub fn failures(&self) -> &[usize] {
        &self.failures
    }
}
