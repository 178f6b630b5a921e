//! Recalculation scheduling
//!
//! An explicit state machine (`Idle → Pending → Recomputing → Idle`) owned by
//! the layout controller, driven by host-supplied monotonic timestamps in
//! milliseconds (`performance.now()` on the web, any monotonic clock
//! elsewhere). Timestamp-driven transitions keep the machine deterministic
//! and testable without real timers.

/// Frame interval used to coalesce mutation bursts from a single edit
pub const FRAME_INTERVAL_MS: f64 = 16.0;

/// Debounce after mount before the first recomputation
pub const MOUNT_DEBOUNCE_MS: f64 = 100.0;

/// Delay before retrying a pass that found unrendered content
pub const RENDER_RETRY_DELAY_MS: f64 = 200.0;

/// Retry budget for not-yet-rendered content. A permanently zero-height
/// container would otherwise retry forever; after this many attempts the
/// scheduler idles until a fresh trigger arrives.
pub const MAX_RENDER_RETRIES: u32 = 25;

/// What asked for a recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The document-attributes record changed
    AttributesChanged,
    /// Content mutation under the editable surface (child list, attributes,
    /// or character data)
    Mutation,
    /// The container was resized
    Resize,
    /// The surface was just mounted
    Mounted,
}

impl Trigger {
    /// Scheduling delay for this trigger kind
    fn delay_ms(self) -> f64 {
        match self {
            // Attribute and resize changes recompute on the next poll
            Trigger::AttributesChanged | Trigger::Resize => 0.0,
            // Mutations coalesce per rendering frame
            Trigger::Mutation => FRAME_INTERVAL_MS,
            Trigger::Mounted => MOUNT_DEBOUNCE_MS,
        }
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    /// A pass is scheduled to start at `due_ms`
    Pending { due_ms: f64 },
    Recomputing,
}

/// State machine deciding when recomputation passes run
#[derive(Debug, Clone)]
pub struct RecalcScheduler {
    state: State,
    retries: u32,
}

impl Default for RecalcScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RecalcScheduler {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            retries: 0,
        }
    }

    /// Record a trigger. Last trigger wins: a newer trigger supersedes any
    /// scheduled-but-unstarted pass (there is no queue of duplicate work). A
    /// running pass cannot be cancelled mid-computation; the trigger simply
    /// becomes the next pending pass.
    pub fn note(&mut self, trigger: Trigger, now_ms: f64) {
        self.state = State::Pending {
            due_ms: now_ms + trigger.delay_ms(),
        };
        self.retries = 0;
    }

    /// True when a scheduled pass is due; transitions into `Recomputing`.
    pub fn begin_if_due(&mut self, now_ms: f64) -> bool {
        match self.state {
            State::Pending { due_ms } if now_ms >= due_ms => {
                self.state = State::Recomputing;
                true
            }
            _ => false,
        }
    }

    /// The pass completed and emitted fresh descriptors. A trigger recorded
    /// while the pass ran stays pending.
    pub fn finish_success(&mut self) {
        if self.state == State::Recomputing {
            self.state = State::Idle;
        }
        self.retries = 0;
    }

    /// The pass found content not yet rendered. Reschedules after the retry
    /// delay while budget remains; returns whether a follow-up pass is
    /// scheduled. Stale descriptors stay visible either way.
    pub fn finish_deferred(&mut self, now_ms: f64) -> bool {
        if self.state != State::Recomputing {
            // A newer trigger already superseded this pass
            return true;
        }
        if self.retries < MAX_RENDER_RETRIES {
            self.retries += 1;
            self.state = State::Pending {
                due_ms: now_ms + RENDER_RETRY_DELAY_MS,
            };
            true
        } else {
            log::warn!(
                "giving up on unrendered content after {MAX_RENDER_RETRIES} retries; \
                 keeping previous page layout"
            );
            self.state = State::Idle;
            self.retries = 0;
            false
        }
    }

    /// True when no pass is scheduled or running
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// True when a pass is scheduled but has not started
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }
}
