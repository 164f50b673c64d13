use blixt::clock::Clock;
use blixt::config::{ConfigStore, FileConfigStore, GameConfig};
use blixt::engine::SessionPhase;
use blixt::runtime::{CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker};
use blixt::{App, TICK_RATE_MS};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    cell::Cell,
    error::Error,
    io::{self, stdin},
    rc::Rc,
    time::Duration,
};

/// sleek terminal reflex game
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A sleek terminal reflex game: symbols queue up in a lane, each one waits only so long for its key, and every hit feeds an all-time score. Settings stick between runs; flags override them."
)]
pub struct Cli {
    /// number of symbols in a session
    #[clap(short = 'c', long)]
    count: Option<usize>,

    /// end the session after this many symbols (defaults to the full sequence)
    #[clap(short = 'l', long)]
    limit: Option<usize>,

    /// milliseconds before the active symbol starts blinking
    #[clap(long)]
    warning_ms: Option<u64>,

    /// milliseconds before the active symbol counts as missed
    #[clap(long)]
    expiry_ms: Option<u64>,

    /// points awarded per matched symbol
    #[clap(short = 'p', long)]
    points: Option<u32>,

    /// key set to practice on
    #[clap(short = 'a', long, value_enum)]
    alphabet: Option<AlphabetKind>,

    /// custom key set, taking precedence over --alphabet
    #[clap(short = 'k', long)]
    keys: Option<String>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum AlphabetKind {
    HomeRow,
    Letters,
    Digits,
}

impl AlphabetKind {
    fn keys(&self) -> &'static str {
        match self {
            AlphabetKind::HomeRow => "asdfjkl;",
            AlphabetKind::Letters => "abcdefghijklmnopqrstuvwxyz",
            AlphabetKind::Digits => "0123456789",
        }
    }
}

impl Cli {
    /// Saved config overridden by whatever flags were given.
    fn apply_to(&self, mut cfg: GameConfig) -> GameConfig {
        if let Some(count) = self.count {
            cfg.sequence_length = count;
            cfg.advance_limit = count;
        }
        if let Some(limit) = self.limit {
            cfg.advance_limit = limit;
        }
        if let Some(ms) = self.warning_ms {
            cfg.warning_ms = ms;
        }
        if let Some(ms) = self.expiry_ms {
            cfg.expiry_ms = ms;
        }
        if let Some(points) = self.points {
            cfg.points_per_match = points;
        }
        if let Some(kind) = self.alphabet {
            cfg.alphabet = kind.keys().to_string();
        }
        if let Some(keys) = &self.keys {
            cfg.alphabet = keys.clone();
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load()).normalized();
    let _ = config_store.save(&config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let last_score = Rc::new(Cell::new(None));
    {
        let sink = Rc::clone(&last_score);
        app.engine.set_game_over_hook(move |score| sink.set(Some(score)));
    }

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    run_loop(&mut terminal, &mut app, &runner)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(score) = last_score.get() {
        println!("last session: {} points", score);
    }

    Ok(())
}

fn run_loop<B, C, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    C: Clock,
    E: GameEventSource,
    T: Ticker,
{
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                if app.phase() == SessionPhase::Active {
                    app.on_tick();
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            GameEvent::Key(key) => {
                if !apply_key(app, key) {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

/// Per-phase key handling. Returns false when the player wants out.
fn apply_key<C: Clock>(app: &mut App<C>, key: KeyEvent) -> bool {
    // ctrl+c to quit, from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    match app.phase() {
        SessionPhase::Idle => match key.code {
            KeyCode::Esc => return false,
            KeyCode::Enter => app.start(),
            _ => {}
        },
        SessionPhase::Active => match key.code {
            KeyCode::Esc => app.reset(),
            KeyCode::Char(c) => app.handle_key(c),
            _ => {}
        },
        SessionPhase::Ended => match key.code {
            KeyCode::Esc => return false,
            KeyCode::Enter | KeyCode::Char('r') => app.start(),
            _ => {}
        },
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use blixt::clock::ManualClock;
    use blixt::engine::Engine;
    use blixt::score::{MemoryScoreStore, ScoreLedger};

    fn test_app(alphabet: &str, len: usize) -> App<ManualClock> {
        let config = GameConfig {
            sequence_length: len,
            advance_limit: len,
            alphabet: alphabet.to_string(),
            ..GameConfig::default()
        };
        let ledger = ScoreLedger::new(Box::new(MemoryScoreStore::new()));
        App::with_engine(Engine::with_clock(config, ledger, ManualClock::new()))
    }

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let cli = Cli::parse_from(["blixt"]);
        let cfg = cli.apply_to(GameConfig::default());
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn test_count_sets_length_and_limit() {
        let cli = Cli::parse_from(["blixt", "--count", "9"]);
        let cfg = cli.apply_to(GameConfig::default());
        assert_eq!(cfg.sequence_length, 9);
        assert_eq!(cfg.advance_limit, 9);
    }

    #[test]
    fn test_explicit_limit_wins_over_count() {
        let cli = Cli::parse_from(["blixt", "--count", "9", "--limit", "4"]);
        let cfg = cli.apply_to(GameConfig::default());
        assert_eq!(cfg.sequence_length, 9);
        assert_eq!(cfg.advance_limit, 4);
    }

    #[test]
    fn test_deadline_and_point_overrides() {
        let cli = Cli::parse_from([
            "blixt",
            "--warning-ms",
            "3000",
            "--expiry-ms",
            "5000",
            "--points",
            "25",
        ]);
        let cfg = cli.apply_to(GameConfig::default());
        assert_eq!(cfg.warning_ms, 3_000);
        assert_eq!(cfg.expiry_ms, 5_000);
        assert_eq!(cfg.points_per_match, 25);
    }

    #[test]
    fn test_alphabet_kind_maps_to_keys() {
        let cli = Cli::parse_from(["blixt", "--alphabet", "digits"]);
        let cfg = cli.apply_to(GameConfig::default());
        assert_eq!(cfg.alphabet, "0123456789");
        assert_eq!(AlphabetKind::HomeRow.to_string(), "HomeRow");
    }

    #[test]
    fn test_custom_keys_win_over_alphabet_kind() {
        let cli = Cli::parse_from(["blixt", "--alphabet", "letters", "--keys", "qwerty"]);
        let cfg = cli.apply_to(GameConfig::default());
        assert_eq!(cfg.alphabet, "qwerty");
    }

    #[test]
    fn test_merged_config_is_normalized_before_use() {
        let cli = Cli::parse_from(["blixt", "--limit", "0", "--expiry-ms", "0"]);
        let cfg = cli.apply_to(GameConfig::default()).normalized();
        assert!(cfg.advance_limit >= 1);
        assert!(cfg.expiry_ms >= 1);
        assert!(cfg.warning_ms <= cfg.expiry_ms);
    }

    #[test]
    fn test_enter_starts_from_idle() {
        let mut app = test_app("x", 3);
        assert!(apply_key(&mut app, KeyEvent::from(KeyCode::Enter)));
        assert_eq!(app.phase(), SessionPhase::Active);
    }

    #[test]
    fn test_esc_quits_from_idle() {
        let mut app = test_app("x", 3);
        assert!(!apply_key(&mut app, KeyEvent::from(KeyCode::Esc)));
    }

    #[test]
    fn test_esc_backs_out_of_active_session() {
        let mut app = test_app("x", 3);
        app.start();
        assert!(apply_key(&mut app, KeyEvent::from(KeyCode::Esc)));
        assert_eq!(app.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_chars_feed_the_engine_while_active() {
        let mut app = test_app("x", 3);
        app.start();
        assert!(apply_key(&mut app, KeyEvent::from(KeyCode::Char('x'))));
        assert_eq!(app.engine.session_score(), 10);
        assert_eq!(app.engine.cursor(), 1);
    }

    #[test]
    fn test_restart_from_ended() {
        let mut app = test_app("x", 1);
        app.start();
        app.handle_key('x');
        assert_eq!(app.phase(), SessionPhase::Ended);

        assert!(apply_key(&mut app, KeyEvent::from(KeyCode::Char('r'))));
        assert_eq!(app.phase(), SessionPhase::Active);
        assert_eq!(app.engine.session_score(), 0);
    }

    #[test]
    fn test_esc_quits_from_ended() {
        let mut app = test_app("x", 1);
        app.start();
        app.handle_key('x');
        assert!(!apply_key(&mut app, KeyEvent::from(KeyCode::Esc)));
    }

    #[test]
    fn test_ctrl_c_quits_from_any_phase() {
        let mut app = test_app("x", 3);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!apply_key(&mut app, ctrl_c));

        app.start();
        assert!(!apply_key(&mut app, ctrl_c));
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut app = test_app("x", 3);
        assert!(apply_key(&mut app, KeyEvent::from(KeyCode::Tab)));
        assert_eq!(app.phase(), SessionPhase::Idle);
    }
}
