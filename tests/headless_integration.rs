use std::time::Duration;

use crossterm::event::KeyCode;

use blixt::clock::ManualClock;
use blixt::config::GameConfig;
use blixt::engine::{Engine, SessionPhase};
use blixt::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use blixt::score::{MemoryScoreStore, ScoreLedger};
use blixt::App;

fn headless_app(alphabet: &str, len: usize) -> (App<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let config = GameConfig {
        sequence_length: len,
        advance_limit: len,
        alphabet: alphabet.to_string(),
        ..GameConfig::default()
    };
    let ledger = ScoreLedger::new(Box::new(MemoryScoreStore::new()));
    let engine = Engine::with_clock(config, ledger, clock.clone());
    (App::with_engine(engine), clock)
}

// Headless integration using the internal runtime without a TTY.
// A full session is driven through Runner/TestEventSource to the end.
#[test]
fn headless_session_clears_via_runner() {
    let (mut app, _clock) = headless_app("x", 3);

    let (tx, es) = TestEventSource::channel();
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    // single-symbol alphabet, so the whole session is three 'x' presses
    for _ in 0..3 {
        tx.send(GameEvent::key('x')).unwrap();
    }

    app.start();
    for _ in 0..100u32 {
        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    app.handle_key(c);
                }
            }
        }
        if app.phase() == SessionPhase::Ended {
            break;
        }
    }

    assert_eq!(app.phase(), SessionPhase::Ended);
    assert_eq!(app.engine.session_score(), 30);
    assert_eq!(app.engine.hits(), 3);
}

#[test]
fn headless_session_times_out_via_ticks() {
    let (mut app, clock) = headless_app("xy", 2);

    let (_tx, es) = TestEventSource::channel();
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    app.start();
    for _ in 0..10u32 {
        if let GameEvent::Tick = runner.step() {
            // every tick jumps time past one expiry deadline
            clock.advance_ms(10_000);
            app.on_tick();
        }
        if app.phase() == SessionPhase::Ended {
            break;
        }
    }

    assert_eq!(app.phase(), SessionPhase::Ended);
    assert_eq!(app.engine.session_score(), 0);
    assert_eq!(app.engine.misses(), 2);
}

#[test]
fn headless_wrong_keys_leave_session_running() {
    let (mut app, _clock) = headless_app("x", 2);

    let (tx, es) = TestEventSource::channel();
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    for c in ['q', 'w', 'e'] {
        tx.send(GameEvent::key(c)).unwrap();
    }

    app.start();
    for _ in 0..3 {
        if let GameEvent::Key(key) = runner.step() {
            if let KeyCode::Char(c) = key.code {
                app.handle_key(c);
            }
        }
    }

    assert_eq!(app.phase(), SessionPhase::Active);
    assert_eq!(app.engine.cursor(), 0);
    assert_eq!(app.engine.session_score(), 0);
}

#[test]
fn headless_reset_mid_session_returns_to_idle() {
    let (mut app, _clock) = headless_app("x", 3);

    app.start();
    app.handle_key('x');
    assert_eq!(app.engine.cursor(), 1);

    app.reset();

    assert_eq!(app.phase(), SessionPhase::Idle);
    assert_eq!(app.engine.cursor(), 0);
    assert!(app.playfield.is_empty());
    // the board refills on the next start
    app.start();
    assert_eq!(app.playfield.tiles().len(), 3);
}
