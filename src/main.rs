pub mod ui;

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{info, warn};
use typesprint::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    input::{translate_key, Command, Cycle},
    logging,
    runtime::{
        AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, ThreadTickScheduler,
        TickScheduler, Ticker,
    },
    session::TestDuration,
    typing_test::{SessionConfig, TypingTest},
    vocabulary::{Vocabulary, DEFAULT_VOCABULARY},
    word_source::{RandomShuffler, Shuffler},
};

const REDRAW_INTERVAL_MS: u64 = 250;

/// timed typing speed test with live wpm, accuracy and error count
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test: type the words as they appear, space finishes a word, and the countdown starts with your first keystroke."
)]
pub struct Cli {
    /// seconds on the countdown
    #[clap(short = 'd', long, value_enum)]
    duration: Option<TestDuration>,

    /// number of words to generate for each test
    #[clap(short = 'w', long = "words", value_parser = parse_word_count)]
    word_count: Option<usize>,

    /// word list to draw from: a json list or whitespace separated text
    #[clap(long)]
    vocabulary: Option<PathBuf>,

    /// seed the word shuffle to get the same test every time
    #[clap(long)]
    seed: Option<u64>,

    /// where to write logs
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn parse_word_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(err.to_string()),
    }
}

impl Cli {
    /// Command line flags win over the stored config
    fn apply_to(&self, config: &mut Config) {
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(word_count) = self.word_count {
            config.word_count = word_count;
        }
        if let Some(ref vocabulary) = self.vocabulary {
            config.vocabulary = Some(vocabulary.clone());
        }
    }

    fn shuffler(&self) -> Box<dyn Shuffler> {
        match self.seed {
            Some(seed) => Box::new(RandomShuffler::seeded(seed)),
            None => Box::new(RandomShuffler::thread()),
        }
    }
}

fn load_vocabulary(path: Option<&Path>) -> anyhow::Result<Vocabulary> {
    match path {
        Some(path) => Vocabulary::from_path(path)
            .with_context(|| format!("could not load vocabulary from {}", path.display())),
        None => Vocabulary::builtin(DEFAULT_VOCABULARY).context("built-in vocabulary is broken"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App<T: TickScheduler> {
    pub test: TypingTest<T>,
    config: Config,
    store: Box<dyn ConfigStore>,
}

impl<T: TickScheduler> App<T> {
    pub fn new(test: TypingTest<T>, config: Config, store: Box<dyn ConfigStore>) -> Self {
        Self {
            test,
            config,
            store,
        }
    }

    fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::Input(value) => self.test.input(value),
            Command::BackspaceOnEmpty => self.test.backspace_on_empty(),
            Command::Reset => self.test.reset(),
            Command::CycleDuration(cycle) => self.cycle_duration(cycle),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn cycle_duration(&mut self, cycle: Cycle) {
        let state = self.test.state();
        if state.is_active() {
            return;
        }

        let duration = match cycle {
            Cycle::Next => state.duration().next(),
            Cycle::Prev => state.duration().prev(),
        };
        self.test.set_duration(duration);

        self.config.duration = duration;
        if let Err(err) = self.store.save(&self.config) {
            warn!(%err, "could not save selected duration");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(err) = logging::init(&log_path) {
        eprintln!("warning: logging disabled: {err}");
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);
    let vocabulary = load_vocabulary(config.vocabulary.as_deref())?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode().context("could not enable raw mode")?;
    let restore = TerminalGuard::new(io::stdout());

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let scheduler = ThreadTickScheduler::new(events.sender());
    let test = TypingTest::new(
        SessionConfig::from(&config),
        vocabulary,
        cli.shuffler(),
        scheduler,
    );
    let mut app = App::new(test, config, Box::new(store));
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(REDRAW_INTERVAL_MS)),
    );

    info!("typesprint started");
    let result = start_tui(&mut terminal, &mut app, &runner);

    drop(restore);
    result
}

/// Puts the terminal back when dropped: leaves the alternate screen, shows
/// the cursor and turns raw mode off. Also runs on early returns and panics.
struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            warn!(%err, "could not disable raw mode");
        }
        if let Err(err) = execute!(self.out, LeaveAlternateScreen, Show) {
            warn!(%err, "could not restore terminal");
        }
    }
}

fn start_tui<B: Backend, E: AppEventSource, K: Ticker, T: TickScheduler>(
    terminal: &mut Terminal<B>,
    app: &mut App<T>,
    runner: &Runner<E, K>,
) -> anyhow::Result<()> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick { timer } => {
                app.test.on_timer_tick(timer, Instant::now());
            }
            AppEvent::Resize | AppEvent::Redraw => {}
            AppEvent::Key(key) => {
                if let Some(command) = translate_key(&key, app.test.state().raw_input()) {
                    if app.apply(command) == Flow::Quit {
                        break;
                    }
                }
            }
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui<T: TickScheduler>(app: &App<T>, f: &mut Frame) {
    f.render_widget(app, f.area());
}
