//! Simulation clock and delayed one-shot events
//!
//! Every cooldown and interval in the simulation reads `GameClock::now`,
//! which excludes time spent paused (explicit pause or level-up choice).

/// Simulation time in milliseconds
pub type Millis = f64;

/// Elapsed simulation time with an accumulated pause offset
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    /// Total time fed through `advance`, paused or not
    elapsed: Millis,
    /// Sum of all completed pause spans
    pause_offset: Millis,
    /// Elapsed time at which the current pause began
    paused_at: Option<Millis>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame of wall time (seconds)
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt as f64 * 1000.0;
    }

    /// Current game time (ms); frozen while paused
    pub fn now(&self) -> Millis {
        self.paused_at.unwrap_or(self.elapsed) - self.pause_offset
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.elapsed);
        }
    }

    pub fn resume(&mut self) {
        if let Some(start) = self.paused_at.take() {
            self.pause_offset += self.elapsed - start;
        }
    }

    pub fn pause_offset(&self) -> Millis {
        self.pause_offset
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: Millis,
    seq: u64,
    payload: T,
}

/// One-shot events keyed by game time, drained once per tick
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Millis, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled { due, seq, payload });
    }

    /// Remove and return every payload due at or before `now`, in due order
    /// (ties keep scheduling order)
    pub fn drain_due(&mut self, now: Millis) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.payload).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
