/// The session controller: single consumer of the engine's message stream.
///
/// The host calls [`SessionController::update`] from its event loop (once
/// per frame in a GUI). Each call drains the inbound channel in arrival
/// order, runs every notification through the admission gate, applies what
/// survives, and fires any due debounce timers. User actions
/// ([`start_session`](SessionController::start_session),
/// [`cancel_session`](SessionController::cancel_session),
/// [`select_path`](SessionController::select_path),
/// [`refresh_usage`](SessionController::refresh_usage)) are plain method
/// calls on the same thread, so no state here needs a lock.
use crate::debounce::Debouncer;
use crate::error::SessionError;
use crate::reconciler::{Reconciler, SessionContext, SessionPhase, StartOutcome};
use crate::state::AppState;
use crate::throttle::{RefreshReason, RefreshThrottler};
use crossbeam_channel::{Receiver, Sender};
use scanscope_core::engine::{
    EngineError, FsChange, FsChangeKind, Inbound, NotificationClass, RequestId, ScanEngine,
    ScanSnapshot, SessionId, StartTicket, UsageService,
};
use scanscope_core::history::{HistoryEntry, HistoryLedger, HistoryStore};
use scanscope_core::model::TopFiles;
use scanscope_core::settings::Settings;
use scanscope_core::usage::DiskOverview;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum inbound messages handled per [`SessionController::process_messages`] call.
///
/// Keeps one call short even after a backlog built up (window hidden,
/// engine bursting); the remainder is picked up on the next call.
pub const MAX_MESSAGES_PER_TICK: usize = 300;

pub struct SessionController<E: ScanEngine, U: UsageService> {
    engine: E,
    usage: U,
    tx: Sender<Inbound>,
    rx: Receiver<Inbound>,
    reconciler: Reconciler,
    throttler: RefreshThrottler,
    path_debounce: Debouncer,
    change_debounce: Debouncer,
    ledger: HistoryLedger,
    state: AppState,
}

impl<E: ScanEngine, U: UsageService> SessionController<E, U> {
    /// Build a controller and load the persisted ledger from `store`.
    pub fn new(engine: E, usage: U, settings: &Settings, store: Box<dyn HistoryStore>) -> Self {
        // Services may answer synchronously from inside a call made on this
        // thread, so sending must never block.
        let (tx, rx) = crossbeam_channel::unbounded();

        let mut ledger = HistoryLedger::new(store, settings.history_capacity);
        ledger.load();

        Self {
            engine,
            usage,
            tx,
            rx,
            reconciler: Reconciler::new(),
            throttler: RefreshThrottler::new(settings.refresh_min_interval()),
            path_debounce: Debouncer::new(settings.path_debounce()),
            change_debounce: Debouncer::new(settings.change_debounce()),
            ledger,
            state: AppState::new(settings.top_n),
        }
    }

    /// Sender for engine notifications. Clone it into the engine adapter.
    pub fn sender(&self) -> Sender<Inbound> {
        self.tx.clone()
    }

    // ── Presentation reads ─────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.reconciler.phase()
    }

    pub fn context(&self) -> &SessionContext {
        self.reconciler.context()
    }

    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.reconciler.elapsed(now)
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.reconciler.last_duration()
    }

    pub fn top_files(&self) -> &TopFiles {
        &self.state.top_files
    }

    /// Finished scans, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.ledger.entries()
    }

    pub fn throttler(&self) -> &RefreshThrottler {
        &self.throttler
    }

    // ── Actions ────────────────────────────────────────

    /// Start scanning `root`. The session stays pending until the engine
    /// answers; progress already resets to the new baseline.
    pub fn start_session(&mut self, root: &str, now: Instant) -> Result<StartTicket, SessionError> {
        let ticket = self.reconciler.begin(root, now)?;
        let root = self.reconciler.root().to_string();
        self.state.reset_for_scan(&root);
        self.select_path(&root, now);
        self.engine.start_scan(ticket, &root, self.tx.clone());
        Ok(ticket)
    }

    /// Cancel the active scan.
    ///
    /// Takes effect locally at once; the engine's answer is only logged.
    pub fn cancel_session(&mut self, now: Instant) -> Result<SessionId, SessionError> {
        let id = self.reconciler.cancel(now)?;
        self.engine.cancel_scan(id, self.tx.clone());
        Ok(id)
    }

    /// Change the root the disk-usage panel describes. The query follows
    /// once the path has been stable for the path debounce delay.
    pub fn select_path(&mut self, path: &str, now: Instant) {
        let path = path.trim();
        if path == self.state.selected_path {
            return;
        }
        self.state.select_path(path);
        self.throttler.set_path(path);
        if path.is_empty() {
            self.path_debounce.cancel();
        } else {
            self.path_debounce.schedule(now, path);
        }
    }

    /// Manual disk-usage refresh, bypassing the throttle guards.
    /// Returns `true` if a query was issued.
    pub fn refresh_usage(&mut self, now: Instant) -> bool {
        self.request_refresh(RefreshReason::Manual, "", true, now)
    }

    // ── Event loop ─────────────────────────────────────

    /// Drain messages and fire due timers. Returns `true` if anything
    /// visible changed.
    pub fn update(&mut self, now: Instant) -> bool {
        let messages = self.process_messages(now);
        let timers = self.poll_timers(now);
        messages || timers
    }

    /// Handle up to [`MAX_MESSAGES_PER_TICK`] pending messages in arrival order.
    pub fn process_messages(&mut self, now: Instant) -> bool {
        let mut repaint = false;
        let mut handled = 0usize;
        while handled < MAX_MESSAGES_PER_TICK {
            let msg = match self.rx.try_recv() {
                Ok(m) => m,
                Err(_) => break,
            };
            handled += 1;
            repaint |= self.handle(msg, now);
        }
        repaint
    }

    /// Fire the path and filesystem-change debounce timers if due.
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        let mut issued = false;
        if let Some(path) = self.path_debounce.fire(now) {
            issued |= self.request_refresh(RefreshReason::PathChanged, &path, false, now);
        }
        if let Some(path) = self.change_debounce.fire(now) {
            issued |= self.request_refresh(RefreshReason::FsChange, &path, false, now);
        }
        issued
    }

    fn handle(&mut self, msg: Inbound, now: Instant) -> bool {
        match msg {
            Inbound::Progress(snapshot) => self.on_progress(snapshot),
            Inbound::Complete(snapshot) => self.on_complete(snapshot, now),
            Inbound::FsChange(change) => self.on_fs_change(change, now),
            Inbound::StartReply { ticket, result } => self.on_start_reply(ticket, result),
            Inbound::CancelReply { id, result } => {
                match result {
                    Ok(true) => debug!("Session: engine stopped {}", id),
                    Ok(false) => debug!("Session: engine had nothing to cancel for {}", id),
                    Err(e) => warn!("Session: cancel of {} failed: {}", id, e),
                }
                false
            }
            Inbound::UsageReply { request_id, result } => self.on_usage_reply(request_id, result),
        }
    }

    fn on_progress(&mut self, snapshot: ScanSnapshot) -> bool {
        let admission = self
            .reconciler
            .admit(snapshot.session_id, NotificationClass::Progress);
        if !admission.is_accepted() {
            return false;
        }
        self.state.apply_snapshot(snapshot);
        true
    }

    fn on_complete(&mut self, snapshot: ScanSnapshot, now: Instant) -> bool {
        let id = snapshot.session_id;
        if !self.reconciler.admit(id, NotificationClass::Completion).is_accepted() {
            return false;
        }
        self.state.apply_snapshot(snapshot);
        let duration = self.reconciler.complete(id, now);

        let root = self.reconciler.root().to_string();
        self.ledger.record(HistoryEntry {
            id,
            root_path: root.clone(),
            scanned_files: self.state.scanned_files,
            scanned_bytes: self.state.scanned_bytes,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            finished_at: chrono::Utc::now().timestamp_millis(),
        });

        self.request_refresh(RefreshReason::ScanComplete, &root, false, now);
        true
    }

    fn on_fs_change(&mut self, change: FsChange, now: Instant) -> bool {
        if !self
            .reconciler
            .admit(change.session_id, NotificationClass::Change)
            .is_accepted()
        {
            return false;
        }
        let outcome = self.state.top_files.apply_change(&change);
        debug!("Top files: {:?} {} -> {:?}", change.kind, change.path, outcome);

        if matches!(change.kind, FsChangeKind::Create | FsChangeKind::Remove) {
            self.change_debounce.schedule(now, change.path);
        }
        outcome.changed()
    }

    fn on_start_reply(
        &mut self,
        ticket: StartTicket,
        result: Result<SessionId, EngineError>,
    ) -> bool {
        match self.reconciler.on_start_reply(ticket, result) {
            StartOutcome::Accepted(_) => true,
            StartOutcome::Rejected(e) => {
                self.state.error_message = Some(format!("Could not start scan: {e}"));
                true
            }
            StartOutcome::Stale(Some(id)) => {
                info!("Session: cancelling replaced scan {}", id);
                self.engine.cancel_scan(id, self.tx.clone());
                false
            }
            StartOutcome::Stale(None) => false,
        }
    }

    fn on_usage_reply(
        &mut self,
        request_id: RequestId,
        result: Result<DiskOverview, EngineError>,
    ) -> bool {
        if !self.throttler.resolve(request_id) {
            return false;
        }
        self.state.overview_loading = false;
        match result {
            Ok(overview) => {
                self.state.overview = Some(overview);
                self.state.overview_error = None;
            }
            Err(e) => {
                warn!("Usage: query for {} failed: {}", self.throttler.path(), e);
                self.state.overview_error = Some(e.to_string());
            }
        }
        true
    }

    fn request_refresh(
        &mut self,
        reason: RefreshReason,
        detail: &str,
        force: bool,
        now: Instant,
    ) -> bool {
        let Some(ticket) = self.throttler.request(reason, detail, force, now) else {
            return false;
        };
        self.state.overview_loading = true;
        self.usage
            .disk_overview(ticket.id, &ticket.path, self.tx.clone());
        true
    }
}
