//! Two-stage subject/badge load synchronization.
//!
//! The subject image loads first, then the badge. Only once both are decoded may
//! the compositor paint. Each subject selection bumps a generation counter; a
//! completion carrying an older ticket is discarded, which is how a superseded
//! subject's late decode gets ignored without any cancellation.

use crate::source::LoadError;

/// Identifies one load sequence. Copied into every completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Coarse phase of the current load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// No subject selected yet.
    Idle,
    /// Waiting for the subject image.
    Subject,
    /// Subject decoded, waiting for the badge image.
    Badge,
    /// Both images decoded.
    Decoded,
    /// One of the images failed. Terminal until the next `begin`.
    Failed,
}

/// What the caller should do after reporting a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStep {
    /// Subject decoded; start fetching the badge.
    FetchBadge,
    /// Both images decoded; paint now.
    Decoded,
    /// The image failed. No paint may happen for this subject.
    Failed(LoadError),
    /// Completion belongs to a superseded generation and was dropped.
    Stale,
    /// Completion arrived in a phase that doesn't expect it and was dropped.
    Unexpected,
}

enum Stage<I> {
    Idle,
    AwaitingSubject,
    AwaitingBadge { subject: I },
    Decoded { subject: I, badge: I },
    Failed { error: LoadError },
}

/// Sequences the subject and badge decodes of the current selection.
///
/// Generic over the decoded image type so the core stays independent of the
/// raster backend.
pub struct LoadSynchronizer<I> {
    generation: u64,
    stage: Stage<I>,
}

impl<I> Default for LoadSynchronizer<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> LoadSynchronizer<I> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            stage: Stage::Idle,
        }
    }

    /// Start a new sequence, superseding whatever was in flight.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.stage = Stage::AwaitingSubject;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Forget the current sequence. Pending completions become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.stage = Stage::Idle;
    }

    /// Whether `ticket` belongs to the live sequence.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Report the subject image result.
    pub fn subject_loaded(&mut self, ticket: LoadTicket, result: Result<I, LoadError>) -> LoadStep {
        if !self.is_current(ticket) {
            log::debug!("Dropping stale subject completion (gen {})", ticket.generation);
            return LoadStep::Stale;
        }
        if !matches!(self.stage, Stage::AwaitingSubject) {
            return LoadStep::Unexpected;
        }
        match result {
            Ok(subject) => {
                self.stage = Stage::AwaitingBadge { subject };
                LoadStep::FetchBadge
            }
            Err(error) => self.fail(error),
        }
    }

    /// Report the badge image result.
    pub fn badge_loaded(&mut self, ticket: LoadTicket, result: Result<I, LoadError>) -> LoadStep {
        if !self.is_current(ticket) {
            log::debug!("Dropping stale badge completion (gen {})", ticket.generation);
            return LoadStep::Stale;
        }
        let stage = std::mem::replace(&mut self.stage, Stage::Idle);
        let subject = match stage {
            Stage::AwaitingBadge { subject } => subject,
            other => {
                self.stage = other;
                return LoadStep::Unexpected;
            }
        };
        match result {
            Ok(badge) => {
                self.stage = Stage::Decoded { subject, badge };
                LoadStep::Decoded
            }
            Err(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: LoadError) -> LoadStep {
        log::warn!("Image load failed (gen {}): {}", self.generation, error);
        self.stage = Stage::Failed {
            error: error.clone(),
        };
        LoadStep::Failed(error)
    }

    /// Decoded `(subject, badge)` pair, once both are available.
    pub fn images(&self) -> Option<(&I, &I)> {
        match &self.stage {
            Stage::Decoded { subject, badge } => Some((subject, badge)),
            _ => None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> LoadPhase {
        match self.stage {
            Stage::Idle => LoadPhase::Idle,
            Stage::AwaitingSubject => LoadPhase::Subject,
            Stage::AwaitingBadge { .. } => LoadPhase::Badge,
            Stage::Decoded { .. } => LoadPhase::Decoded,
            Stage::Failed { .. } => LoadPhase::Failed,
        }
    }

    /// The error that ended the current sequence, if any.
    pub fn failure(&self) -> Option<&LoadError> {
        match &self.stage {
            Stage::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        assert_eq!(sync.phase(), LoadPhase::Idle);

        let ticket = sync.begin();
        assert_eq!(sync.phase(), LoadPhase::Subject);
        assert!(sync.images().is_none());

        assert_eq!(sync.subject_loaded(ticket, Ok("photo")), LoadStep::FetchBadge);
        assert_eq!(sync.phase(), LoadPhase::Badge);
        assert!(sync.images().is_none());

        assert_eq!(sync.badge_loaded(ticket, Ok("badge")), LoadStep::Decoded);
        assert_eq!(sync.images(), Some((&"photo", &"badge")));
    }

    #[test]
    fn test_subject_failure_is_terminal() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        let ticket = sync.begin();

        let err = LoadError::Decode("bad header".to_string());
        assert_eq!(sync.subject_loaded(ticket, Err(err.clone())), LoadStep::Failed(err.clone()));
        assert_eq!(sync.phase(), LoadPhase::Failed);
        assert_eq!(sync.failure(), Some(&err));

        // Nothing moves it out of the failed state except a new begin
        assert_eq!(sync.badge_loaded(ticket, Ok("badge")), LoadStep::Unexpected);
        assert_eq!(sync.subject_loaded(ticket, Ok("photo")), LoadStep::Unexpected);
        assert!(sync.images().is_none());
    }

    #[test]
    fn test_badge_failure_is_terminal() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        let ticket = sync.begin();
        sync.subject_loaded(ticket, Ok("photo"));

        let step = sync.badge_loaded(ticket, Err(LoadError::NotFound("badge.png".into())));
        assert!(matches!(step, LoadStep::Failed(LoadError::NotFound(_))));
        assert!(sync.images().is_none());
    }

    #[test]
    fn test_stale_completion_dropped() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        let old = sync.begin();
        let new = sync.begin();
        assert!(!sync.is_current(old));

        assert_eq!(sync.subject_loaded(old, Ok("old photo")), LoadStep::Stale);
        assert_eq!(sync.phase(), LoadPhase::Subject);

        sync.subject_loaded(new, Ok("new photo"));
        assert_eq!(sync.badge_loaded(old, Ok("badge")), LoadStep::Stale);
        assert_eq!(sync.badge_loaded(new, Ok("badge")), LoadStep::Decoded);
        assert_eq!(sync.images(), Some((&"new photo", &"badge")));
    }

    #[test]
    fn test_new_subject_recovers_from_failure() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        let first = sync.begin();
        sync.subject_loaded(first, Err(LoadError::Io("boom".into())));

        let second = sync.begin();
        assert!(sync.failure().is_none());
        sync.subject_loaded(second, Ok("photo"));
        assert_eq!(sync.badge_loaded(second, Ok("badge")), LoadStep::Decoded);
    }

    #[test]
    fn test_badge_before_subject_is_unexpected() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        let ticket = sync.begin();
        assert_eq!(sync.badge_loaded(ticket, Ok("badge")), LoadStep::Unexpected);
        assert_eq!(sync.phase(), LoadPhase::Subject);
    }

    #[test]
    fn test_reset_makes_tickets_stale() {
        let mut sync: LoadSynchronizer<&str> = LoadSynchronizer::new();
        let ticket = sync.begin();
        sync.reset();
        assert_eq!(sync.phase(), LoadPhase::Idle);
        assert_eq!(sync.subject_loaded(ticket, Ok("photo")), LoadStep::Stale);
    }
}
