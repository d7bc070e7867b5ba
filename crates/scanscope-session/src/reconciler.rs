/// Session reconciliation: which scan is "current", and which notifications
/// may touch visible state.
///
/// The engine issues session identities; the client only learns a new one
/// when the start call is acknowledged. Notifications keep arriving from
/// older sessions in the meantime, and acknowledgements can lag behind the
/// first progress event. Every notification therefore passes through
/// [`admit`], a pure function of the message and the current
/// [`SessionContext`], before it is applied.
use crate::error::SessionError;
use scanscope_core::engine::{EngineError, NotificationClass, SessionId, StartTicket};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Identity bookkeeping shared by every admission decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    /// The session whose notifications are applied.
    pub active: Option<SessionId>,
    /// The session replaced by the most recent start.
    pub superseded: Option<SessionId>,
    /// Identities from start replies that arrived after their request was
    /// replaced. Never admitted.
    pub abandoned: BTreeSet<SessionId>,
    /// The session that most recently finished or was cancelled.
    pub completed: Option<SessionId>,
    /// A scan has been started and has not finished or been cancelled.
    pub in_progress: bool,
}

/// The user-visible lifecycle of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing running, no finished session to follow.
    Idle,
    /// Start requested, engine has not issued an identity yet.
    Pending,
    /// Scanning under a known identity.
    Active,
    /// Finished or cancelled; filesystem changes are folded in.
    Completed,
}

/// Result of the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Belongs to the active session.
    Accept,
    /// No identity known yet: the notification's identity becomes active.
    Adopt,
    /// Late event from the session that already finished.
    RejectCompleted,
    /// Event from the session replaced by the latest start.
    RejectSuperseded,
    /// Progress while nothing is in progress.
    RejectIdle,
    /// Filesystem change while a scan is running.
    RejectScanning,
    /// Any other identity.
    RejectForeign,
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accept | Self::Adopt)
    }
}

/// Decide whether a notification from session `id` may be applied.
///
/// Progress and completion:
/// 1. the completed session is rejected;
/// 2. the superseded session and any abandoned identity are rejected;
/// 3. nothing in progress rejects everything;
/// 4. with no active identity, `id` is adopted;
/// 5. otherwise only the active identity passes.
///
/// Filesystem changes are only meaningful for the most recently completed
/// session, and only until a new scan starts.
pub fn admit(ctx: &SessionContext, id: SessionId, class: NotificationClass) -> Admission {
    if ctx.superseded == Some(id) || ctx.abandoned.contains(&id) {
        return Admission::RejectSuperseded;
    }

    if !class.is_progress_class() {
        if ctx.in_progress {
            return Admission::RejectScanning;
        }
        return if ctx.completed == Some(id) {
            Admission::Accept
        } else {
            Admission::RejectForeign
        };
    }

    if ctx.completed == Some(id) {
        Admission::RejectCompleted
    } else if !ctx.in_progress {
        Admission::RejectIdle
    } else if ctx.active.is_none() {
        Admission::Adopt
    } else if ctx.active == Some(id) {
        Admission::Accept
    } else {
        Admission::RejectForeign
    }
}

/// What a start acknowledgement did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The pending start now has this identity.
    Accepted(SessionId),
    /// The engine refused; the previous identity is back.
    Rejected(EngineError),
    /// Reply to an earlier start that has since been replaced. An identity
    /// it carries is marked superseded and should be cancelled.
    Stale(Option<SessionId>),
}

/// Owner of the [`SessionContext`] and the session's timing.
#[derive(Debug, Default)]
pub struct Reconciler {
    ctx: SessionContext,
    pending: Option<StartTicket>,
    /// Active identity before the pending start, restored on rejection.
    rollback: Option<SessionId>,
    next_ticket: u64,
    root: String,
    started_at: Option<Instant>,
    last_duration: Option<Duration>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Root of the most recently started session.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.ctx.in_progress, self.ctx.active, self.ctx.completed) {
            (true, None, _) => SessionPhase::Pending,
            (true, Some(_), _) => SessionPhase::Active,
            (false, _, Some(_)) => SessionPhase::Completed,
            (false, _, None) => SessionPhase::Idle,
        }
    }

    /// Time since the running session started, `None` when nothing runs.
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        if !self.ctx.in_progress {
            return None;
        }
        self.started_at.map(|t| now.saturating_duration_since(t))
    }

    /// Duration of the last finished or cancelled session.
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    /// Start a new session over `root`.
    ///
    /// The current identity is superseded immediately, before the engine has
    /// answered, so its stragglers are rejected from here on.
    pub fn begin(&mut self, root: &str, now: Instant) -> Result<StartTicket, SessionError> {
        let root = root.trim();
        if root.is_empty() {
            return Err(SessionError::EmptyRoot);
        }

        self.rollback = self.ctx.active;
        if let Some(previous) = self.ctx.active.take() {
            self.ctx.superseded = Some(previous);
        }
        self.ctx.completed = None;
        self.ctx.in_progress = true;
        self.started_at = Some(now);
        self.last_duration = None;
        self.root = root.to_string();

        self.next_ticket += 1;
        let ticket = StartTicket(self.next_ticket);
        self.pending = Some(ticket);

        info!(
            "Session: starting scan of {} (superseded {:?})",
            self.root, self.ctx.superseded
        );
        Ok(ticket)
    }

    /// Apply the engine's answer to a start request.
    pub fn on_start_reply(
        &mut self,
        ticket: StartTicket,
        result: Result<SessionId, EngineError>,
    ) -> StartOutcome {
        if self.pending != Some(ticket) {
            let stale = result.ok().filter(|id| self.ctx.active != Some(*id));
            if let Some(id) = stale {
                debug!("Session: late start reply for {}, abandoning it", id);
                self.ctx.abandoned.insert(id);
            }
            return StartOutcome::Stale(stale);
        }
        self.pending = None;

        match result {
            Ok(id) => {
                info!("Session: engine accepted scan {}", id);
                self.ctx.active = Some(id);
                self.ctx.superseded = None;
                self.rollback = None;
                StartOutcome::Accepted(id)
            }
            Err(e) => {
                warn!("Session: engine rejected scan of {}: {}", self.root, e);
                self.ctx.active = self.rollback.take();
                self.ctx.superseded = None;
                self.ctx.in_progress = false;
                self.started_at = None;
                StartOutcome::Rejected(e)
            }
        }
    }

    /// Run the admission gate, adopting the identity when rule 4 applies.
    pub fn admit(&mut self, id: SessionId, class: NotificationClass) -> Admission {
        let admission = admit(&self.ctx, id, class);
        match admission {
            Admission::Adopt => {
                debug!("Session: adopting {} before its start reply", id);
                self.ctx.active = Some(id);
                self.ctx.superseded = None;
            }
            Admission::Accept => {}
            rejected => debug!("Session: dropped {:?} from {}: {:?}", class, id, rejected),
        }
        admission
    }

    /// Mark session `id` finished. Returns how long it ran.
    ///
    /// The active identity is kept so the session's filesystem changes stay
    /// admissible.
    pub fn complete(&mut self, id: SessionId, now: Instant) -> Duration {
        let duration = self
            .started_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.ctx.in_progress = false;
        self.ctx.completed = Some(id);
        self.last_duration = Some(duration);
        info!("Session: scan {} complete in {:?}", id, duration);
        duration
    }

    /// Treat the active session as finished from the client's side.
    ///
    /// Returns the identity the engine should be asked to cancel.
    pub fn cancel(&mut self, now: Instant) -> Result<SessionId, SessionError> {
        let id = self.ctx.active.ok_or(SessionError::NoActiveSession)?;
        if self.ctx.in_progress {
            self.last_duration = self.elapsed(now);
        }
        self.ctx.in_progress = false;
        self.ctx.completed = Some(id);
        info!("Session: scan {} cancelled", id);
        Ok(id)
    }
}
