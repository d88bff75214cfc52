use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use prosetyped_config::Config;
use prosetyped_engine::{EventKind, RevealEvent, RevealSession};
use prosetyped_model::{Fragment, Node, markdown};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::{
    cell::{Cell, RefCell},
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    rc::Rc,
    time::{Duration, Instant},
};

mod chunks;
mod render;

use chunks::ChunkFeed;

/// Upper bound on how long the loop waits for a key when nothing is scheduled.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Stderr shares the alternate screen, so logging is switched off while the
/// guard is alive and restored to its previous level on drop.
struct MutedLog {
    previous: log::LevelFilter,
}

impl MutedLog {
    fn new() -> Self {
        let previous = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        Self { previous }
    }
}

impl Drop for MutedLog {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}

struct App {
    title: String,
    session: RevealSession,
    feed: ChunkFeed,
    chunk_period: Duration,
    next_chunk_at: Option<Instant>,
    snapshot: Rc<RefCell<Fragment>>,
    completed: Rc<Cell<bool>>,
    paused: bool,
}

impl App {
    fn new(title: String, source: &str, config: &Config) -> Self {
        let mut feed = ChunkFeed::new(source);
        let first = feed
            .advance()
            .map(|text| markdown::parse(&text))
            .unwrap_or_else(|| Node::fill_doc(Fragment::empty()));

        let mut session = RevealSession::new(first, config.typing.clone());
        let snapshot = Rc::new(RefCell::new(Fragment::empty()));
        let completed = Rc::new(Cell::new(false));

        let sink = snapshot.clone();
        session.on(EventKind::View, move |event| {
            if let RevealEvent::View(content) = event {
                *sink.borrow_mut() = content.clone();
            }
        });
        let done = completed.clone();
        session.on(EventKind::Complete, move |_| done.set(true));

        let chunk_period = config.chunk_period();
        let next_chunk_at = (feed.remaining() > 0).then(|| Instant::now() + chunk_period);

        Self {
            title,
            session,
            feed,
            chunk_period,
            next_chunk_at,
            snapshot,
            completed,
            paused: false,
        }
    }

    fn push_next_chunk(&mut self) {
        self.next_chunk_at = None;
        let Some(source) = self.feed.advance() else {
            return;
        };
        log::debug!("streaming chunk {}/{}", self.feed.revealed(), self.feed.total());
        self.paused = false;
        self.completed.set(false);
        self.session.update_node(markdown::parse(&source), None);
        if self.feed.remaining() > 0 {
            self.next_chunk_at = Some(Instant::now() + self.chunk_period);
        }
    }

    fn toggle_pause(&mut self) {
        if self.paused {
            self.paused = false;
            self.session.start();
            if self.feed.remaining() > 0 && self.next_chunk_at.is_none() {
                self.next_chunk_at = Some(Instant::now() + self.chunk_period);
            }
        } else {
            self.paused = true;
            self.session.pause();
        }
    }

    fn toggle_cursor(&mut self) {
        if self.session.options().show_cursor {
            self.session.hide_cursor();
        } else {
            self.session.show_cursor();
        }
    }

    fn stop(&mut self) {
        self.session.stop();
    }

    /// Run everything due by `now`.
    fn tick(&mut self, now: Instant) {
        if !self.paused
            && let Some(at) = self.next_chunk_at
            && at <= now
        {
            self.push_next_chunk();
        }
        self.session.poll();
    }

    fn next_wakeup(&self) -> Option<Instant> {
        let chunk = if self.paused { None } else { self.next_chunk_at };
        match (self.session.next_deadline(), chunk) {
            (Some(session), Some(chunk)) => Some(session.min(chunk)),
            (session, chunk) => session.or(chunk),
        }
    }

    fn status(&self) -> String {
        let state = if self.paused {
            "paused"
        } else if self.session.is_running() {
            "typing"
        } else if self.completed.get() {
            "complete"
        } else {
            "idle"
        };
        format!(
            "{state} {}/{} chunk {}/{}",
            self.session.current_pos(),
            self.session.target_pos(),
            self.feed.revealed(),
            self.feed.total()
        )
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    log::info!("Config path: {}", config_path.display());

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let source_path = match args.len() {
        2 => PathBuf::from(&args[1]),
        1 => match config.source_path.clone() {
            Some(path) => path,
            None => {
                eprintln!("Error: No markdown file provided and none set in the config file");
                eprintln!("Usage: {} <markdown-file>", args[0]);
                eprintln!("Or set source_path in {}", config_path.display());
                process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: {} [markdown-file]", args[0]);
            process::exit(1);
        }
    };

    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;
    log::info!("Revealing {}", source_path.display());

    let title = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_path.display().to_string());
    let mut app = App::new(title, &source, &config);

    let muted = MutedLog::new();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    app.session.destroy();
    drop(muted);

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let wait = app
            .next_wakeup()
            .map(|at| at.saturating_duration_since(Instant::now()).min(IDLE_WAIT))
            .unwrap_or(IDLE_WAIT);
        if event::poll(wait)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Char('s') => app.stop(),
                KeyCode::Char('n') => app.push_next_chunk(),
                KeyCode::Char('c') => app.toggle_cursor(),
                _ => {}
            }
        }

        app.tick(Instant::now());
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let lines = render::fragment_to_lines(&app.snapshot.borrow());
    let content = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} [{}]", app.title, app.status())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(content, chunks[0]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("Space: Pause/Resume | "),
        Span::raw("s: Stop | "),
        Span::raw("n: Next chunk | "),
        Span::styled("c: Cursor", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(help_text), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_muted_log_restores_the_previous_level() {
        log::set_max_level(log::LevelFilter::Debug);

        {
            let _muted = MutedLog::new();
            assert_eq!(log::max_level(), log::LevelFilter::Off);
        }

        assert_eq!(log::max_level(), log::LevelFilter::Debug);
    }
}
