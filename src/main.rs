mod api;
mod app;
mod config;
mod event;
mod game;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use api::GameClient;
use app::{App, LeaderboardState, Screen};
use config::Config;
use event::{AppEvent, EventHandler};
use game::play::Phase;
use ui::components::leaderboard::{Leaderboard, LeaderboardView};
use ui::components::play_area::PlayArea;
use ui::components::progress_bar::TimeBar;
use ui::components::results::ResultsPanel;
use ui::components::start_menu::StartMenu;
use ui::layout::{AppLayout, centered_rect, format_clock};

#[derive(Parser)]
#[command(name = "mathdojo", version, about = "Terminal arithmetic trainer")]
struct Cli {
    #[arg(long, help = "Backend base URL (overrides config and environment)")]
    api_url: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging()?;

    let mut config = Config::load().unwrap_or_default();
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let client = GameClient::new(&config.api_base_url)
        .with_context(|| format!("invalid backend URL {}", config.api_base_url))?;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(&config, client, events.sender());

    if let Some(theme_name) = cli.theme {
        match ui::theme::Theme::load(&theme_name) {
            Some(theme) => app.set_theme(theme),
            None => tracing::warn!(
                theme = %theme_name,
                available = ?ui::theme::Theme::available_themes(),
                "unknown theme, keeping configured one"
            ),
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file in the data dir; stderr is unusable under the alternate
/// screen. Controlled via RUST_LOG, default warn.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "mathdojo.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize(_, _) => {}
            AppEvent::Api { epoch, event } => app.handle_api(epoch, event),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Start => handle_start_key(app, key),
        Screen::Playing => handle_play_key(app, key),
        Screen::Results => handle_results_key(app, key),
        Screen::Leaderboard => handle_leaderboard_key(app, key),
    }
}

fn handle_start_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Left => app.menu_cycle(false),
        KeyCode::Right => app.menu_cycle(true),
        KeyCode::Char('l') => app.go_to_leaderboard(),
        KeyCode::Enter => {
            if app.menu_selected == ui::components::start_menu::ROW_START {
                app.start_round();
            } else {
                app.menu_cycle(true);
            }
        }
        _ => {}
    }
}

fn handle_play_key(app: &mut App, key: KeyEvent) {
    let failed = app
        .play
        .as_ref()
        .is_some_and(|p| matches!(p.phase, Phase::Failed(_)));

    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('r') if failed => app.retry_play(),
        KeyCode::Enter => app.submit_answer(),
        KeyCode::Backspace => app.answer_backspace(),
        KeyCode::Char(ch) if ch.is_ascii_digit() || ch == '-' => app.push_answer_char(ch),
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.start_round(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_leaderboard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.refresh_leaderboard(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        Screen::Start => render_start(frame, app),
        Screen::Playing => render_playing(frame, app),
        Screen::Results => render_results(frame, app),
        Screen::Leaderboard => render_leaderboard(frame, app),
    }
}

fn render_start(frame: &mut ratatui::Frame, app: &App) {
    let area = centered_rect(50, 80, frame.area());
    let menu = StartMenu::new(&app.settings, app.menu_selected, app.theme);
    frame.render_widget(menu, area);
}

fn render_playing(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let Some(play) = &app.play else { return };

    let layout = AppLayout::new(frame.area());

    let urgent = play.time_remaining <= 30;
    let clock_style = if urgent {
        Style::default().fg(colors.error()).bg(colors.header_bg())
    } else {
        Style::default().fg(colors.header_fg()).bg(colors.header_bg())
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " math dojo ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("| {} ", format_clock(play.time_remaining)),
            clock_style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "| {}/{} solved | {}% ",
                play.score,
                play.total_problems,
                play.accuracy_percent()
            ),
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(layout.main);

    frame.render_widget(PlayArea::new(play, app.theme), main_layout[0]);

    let bar = TimeBar::new(
        play.elapsed_ratio(),
        format_clock(play.time_remaining),
        urgent,
        app.theme,
    );
    frame.render_widget(bar, main_layout[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Enter] Submit  [Esc] Quit round ",
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_results(frame: &mut ratatui::Frame, app: &App) {
    if let Some(result) = &app.result {
        let area = centered_rect(60, 70, frame.area());
        let panel = ResultsPanel::new(result, app.rank.as_ref(), app.theme);
        frame.render_widget(panel, area);
    }
}

fn render_leaderboard(frame: &mut ratatui::Frame, app: &App) {
    let view = match &app.leaderboard {
        LeaderboardState::Loading => LeaderboardView::Loading,
        LeaderboardState::Loaded(rows) => LeaderboardView::Loaded(rows),
        LeaderboardState::Failed(message) => LeaderboardView::Failed(message),
    };
    let area = centered_rect(60, 80, frame.area());
    frame.render_widget(Leaderboard::new(view, app.theme), area);
}
