use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};

use studytrack::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    export::export_csv,
    logging,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    session::{display_timestamp, Session},
    store::{SessionStore, SqliteSessionStore},
    timer::{TimerController, TimerMode},
    ui,
    util::{format_hms, total_secs},
};

/// terminal study timer with session notes and history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal study timer. Time sessions with a stopwatch or a countdown, jot notes while you work, and browse every finished session in a local SQLite history."
)]
pub struct Cli {
    /// initial timer mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<TimerMode>,

    /// countdown length offered in the prompt, in minutes
    #[clap(short = 't', long)]
    minutes: Option<u32>,

    /// session database file
    #[clap(short = 'd', long)]
    database: Option<PathBuf>,

    /// print session summaries and exit
    #[clap(long, conflicts_with_all = ["show", "export_csv"])]
    history: bool,

    /// print one session in detail and exit
    #[clap(long, value_name = "ID", conflicts_with = "export_csv")]
    show: Option<i64>,

    /// export all sessions to CSV and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.default_mode = mode;
        }
        if let Some(minutes) = self.minutes {
            config.countdown_minutes = minutes;
        }
        config
    }

    fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("sessions.db"))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = cli.apply(FileConfigStore::new().load());
    if let Err(e) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }

    let db_path = cli.database_path();
    if let Err(e) = logging::init(&AppDirs::log_path(&db_path)) {
        eprintln!("warning: logging disabled: {e}");
    }

    let store = SqliteSessionStore::open(&db_path)?;

    if cli.history {
        write_history(&store, &mut io::stdout().lock())?;
        return Ok(());
    }

    if let Some(id) = cli.show {
        match store.get(id)? {
            Some(session) => write_session(&session, &mut io::stdout().lock())?,
            None => Cli::command()
                .error(ErrorKind::InvalidValue, format!("no session with id {id}"))
                .exit(),
        }
        return Ok(());
    }

    if let Some(path) = &cli.export_csv {
        let count = export_csv(&store, path)?;
        println!("Exported {count} sessions to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let controller = TimerController::new(
        config.default_mode,
        config.limits(),
        Box::new(SystemClock),
        Box::new(store),
    );
    let mut app = App::new(controller, config.countdown_minutes);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("starting in {} mode", config.default_mode);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms)),
    );
    let result = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if app.handle_event(runner.step()) == Flow::Quit {
            return Ok(());
        }
    }
}

fn write_history<W: Write>(store: &dyn SessionStore, out: &mut W) -> Result<(), Box<dyn Error>> {
    let summaries = store.list_summaries()?;
    if summaries.is_empty() {
        writeln!(out, "No sessions recorded yet.")?;
        return Ok(());
    }

    writeln!(out, "{:<6}  {:<19}  DURATION", "ID", "STARTED")?;
    for s in &summaries {
        writeln!(
            out,
            "{:<6}  {}  {}",
            s.id,
            display_timestamp(&s.start_time),
            format_hms(s.duration)
        )?;
    }
    writeln!(
        out,
        "Total: {} across {} sessions",
        format_hms(total_secs(summaries.iter().map(|s| s.duration))),
        summaries.len()
    )?;
    Ok(())
}

fn write_session<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    writeln!(out, "Session {}", session.id)?;
    writeln!(out, "Started:  {}", display_timestamp(&session.start_time))?;
    writeln!(out, "Ended:    {}", display_timestamp(&session.end_time))?;
    writeln!(
        out,
        "Duration: {} ({:.1}s)",
        format_hms(session.duration),
        session.duration
    )?;
    writeln!(out, "Notes:")?;
    if session.notes.is_empty() {
        writeln!(out, "(none)")
    } else {
        writeln!(out, "{}", session.notes)
    }
}
