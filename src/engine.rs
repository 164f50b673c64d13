use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::render::Renderer;
use crate::score::{ScoreLedger, SessionEntry, SessionLog};
use crate::sequence::{Alphabet, Symbol};
use std::fmt;

/// Blink period of the warning cue once its deadline has fired.
const WARNING_BLINK_MS: u64 = 500;

/// Lifecycle of one play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Ended,
}

/// Deadlines for the symbol at the cursor, in clock milliseconds.
/// The engine holds at most one pair; arming a new pair overwrites
/// (and thereby cancels) the previous one.
#[derive(Clone, Copy, Debug)]
struct TimerPair {
    warning_at: u64,
    expiry_at: u64,
    warning_fired: bool,
    warning_on: bool,
    next_toggle_at: u64,
}

/// represents one reflex session: the generated sequence, the cursor over
/// it, and the warning/expiry deadlines for the symbol the cursor points at
pub struct Engine<C: Clock = SystemClock> {
    config: GameConfig,
    alphabet: Alphabet,
    clock: C,
    phase: SessionPhase,
    sequence: Vec<Symbol>,
    cursor: usize,
    hits: u32,
    misses: u32,
    ledger: ScoreLedger,
    timers: Option<TimerPair>,
    session_log: Option<SessionLog>,
    game_over_hook: Option<Box<dyn FnMut(u32)>>,
}

impl Engine<SystemClock> {
    pub fn new(config: GameConfig, ledger: ScoreLedger) -> Self {
        Self::with_clock(config, ledger, SystemClock::new())
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(config: GameConfig, ledger: ScoreLedger, clock: C) -> Self {
        let config = config.normalized();
        let alphabet = Alphabet::from_keys(&config.alphabet);
        Self {
            config,
            alphabet,
            clock,
            phase: SessionPhase::Idle,
            sequence: vec![],
            cursor: 0,
            hits: 0,
            misses: 0,
            ledger,
            timers: None,
            session_log: None,
            game_over_hook: None,
        }
    }

    /// Append a row to `log` whenever a session ends.
    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session_log = Some(log);
        self
    }

    /// Called exactly once per session, at the moment it ends, with the
    /// final session score.
    pub fn set_game_over_hook(&mut self, hook: impl FnMut(u32) + 'static) {
        self.game_over_hook = Some(Box::new(hook));
    }

    /// Begin a session. Valid from any phase; starting over an active
    /// session is an implicit restart, not an error.
    pub fn start(&mut self, renderer: &mut dyn Renderer) {
        self.timers = None;
        self.cursor = 0;
        self.hits = 0;
        self.misses = 0;
        self.ledger.reset_session();
        self.sequence = self.alphabet.sample(self.config.sequence_length);
        self.phase = SessionPhase::Active;
        renderer.render_sequence(&self.sequence);
        self.arm_timers();
    }

    /// Feed one key press. Outside an active session, or when the key does
    /// not equal the symbol at the cursor, this is a silent no-op; a stale
    /// key racing an expiry fails the same equality check and is dropped.
    pub fn handle_key(&mut self, key: char, renderer: &mut dyn Renderer) {
        if self.phase != SessionPhase::Active {
            return;
        }
        let expected = match self.sequence.get(self.cursor) {
            Some(symbol) => *symbol,
            None => return,
        };
        if !expected.matches(key) {
            return;
        }
        self.clear_warning(renderer);
        self.timers = None;
        renderer.consumed_effect(self.cursor);
        self.ledger.award(self.config.points_per_match);
        self.hits += 1;
        self.advance(renderer);
    }

    /// Drive the deadlines. Expiry is checked before the warning, so a
    /// symbol whose time is up is missed on this tick even if its warning
    /// never got to fire.
    pub fn on_tick(&mut self, renderer: &mut dyn Renderer) {
        if self.phase != SessionPhase::Active {
            return;
        }
        let mut pair = match self.timers {
            Some(pair) => pair,
            None => return,
        };
        let now = self.clock.now_ms();

        if now >= pair.expiry_at {
            if pair.warning_fired {
                renderer.warning(self.cursor, false);
            }
            self.timers = None;
            renderer.missed_effect(self.cursor);
            self.misses += 1;
            self.advance(renderer);
            return;
        }

        if now >= pair.warning_at {
            if !pair.warning_fired {
                pair.warning_fired = true;
                pair.warning_on = true;
                pair.next_toggle_at = now + WARNING_BLINK_MS;
                renderer.warning(self.cursor, true);
            } else if now >= pair.next_toggle_at {
                pair.warning_on = !pair.warning_on;
                pair.next_toggle_at = now + WARNING_BLINK_MS;
                renderer.warning(self.cursor, pair.warning_on);
            }
            self.timers = Some(pair);
        }
    }

    /// Abandon whatever is in progress and return to `Idle`. Safe to call
    /// repeatedly and with no timers pending.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.timers = None;
        self.sequence.clear();
        self.cursor = 0;
        self.hits = 0;
        self.misses = 0;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn session_score(&self) -> u32 {
        self.ledger.session_score()
    }

    pub fn cumulative_score(&self) -> u64 {
        self.ledger.cumulative_score()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Milliseconds until the active symbol expires, while a pair is armed.
    pub fn time_remaining_ms(&self) -> Option<u64> {
        self.timers
            .map(|pair| pair.expiry_at.saturating_sub(self.clock.now_ms()))
    }

    fn advance(&mut self, renderer: &mut dyn Renderer) {
        self.cursor += 1;
        if self.cursor >= self.config.advance_limit {
            self.finish();
        } else {
            renderer.shift_from(self.cursor);
            self.arm_timers();
        }
    }

    fn finish(&mut self) {
        self.phase = SessionPhase::Ended;
        self.timers = None;
        let final_score = self.ledger.session_score();
        if let Some(log) = &self.session_log {
            let _ = log.append(&SessionEntry {
                score: final_score,
                hits: self.hits,
                misses: self.misses,
            });
        }
        if let Some(hook) = &mut self.game_over_hook {
            hook(final_score);
        }
    }

    /// Both deadlines are measured from the moment the symbol at the cursor
    /// became active, so they restart fresh for every position.
    fn arm_timers(&mut self) {
        let now = self.clock.now_ms();
        self.timers = Some(TimerPair {
            warning_at: now + self.config.warning_ms,
            expiry_at: now + self.config.expiry_ms,
            warning_fired: false,
            warning_on: false,
            next_toggle_at: 0,
        });
    }

    fn clear_warning(&mut self, renderer: &mut dyn Renderer) {
        if let Some(pair) = &self.timers {
            if pair.warning_fired {
                renderer.warning(self.cursor, false);
            }
        }
    }
}

impl<C: Clock> fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.phase)
            .field("cursor", &self.cursor)
            .field("sequence", &self.sequence)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .field("ledger", &self.ledger)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}
