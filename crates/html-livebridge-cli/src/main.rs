use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use html_livebridge_config::PreviewConfig;
use html_livebridge_engine::annotate::{ATTR_LINE, annotate, document_shell};
use html_livebridge_engine::models::{ElementBoundary, HtmlFile};
use html_livebridge_engine::parsing::{find_element, split_lines};
use html_livebridge_engine::preview::{
    HeadlessSurface, InteractionController, Key, KeyInput, NodeId, PreviewEvent, RenderSurface,
    ToolbarAction,
};
use html_livebridge_engine::protocol::{FromPreview, ToPreview};
use html_livebridge_engine::session::{HostAction, PreviewSession};
use html_livebridge_engine::{Document, HostDocument, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::collections::VecDeque;
use std::io::{Stdout, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{env, process};

mod serve;

/// Longest wait for input before checking the refresh timer again.
const IDLE_TICK: Duration = Duration::from_millis(250);

struct App {
    file: HtmlFile,
    session: PreviewSession<Document>,
    view: InteractionController<HeadlessSurface>,
    outline_state: ListState,
    status: String,
    unsaved: bool,
}

impl App {
    fn new(file: HtmlFile, config: PreviewConfig) -> Result<Self> {
        let text = io::read_html_file(&file)?;
        let document = Document::from_bytes(text.as_bytes())?;
        let session = PreviewSession::new(document, file.base_uri(), config.clone());
        let view = InteractionController::new(HeadlessSurface::new(), config);

        let mut app = Self {
            file,
            session,
            view,
            outline_state: ListState::default(),
            status: String::new(),
            unsaved: false,
        };
        let ready = app.view.ready();
        app.deliver(vec![ready]);
        app.select_row(0);
        Ok(app)
    }

    fn outline(&self) -> Vec<(NodeId, usize)> {
        self.view.surface().outline()
    }

    /// Shuttles view messages to the session and the session's posts back to
    /// the view until both sides are quiet.
    fn deliver(&mut self, messages: Vec<FromPreview>) {
        let mut queue: VecDeque<FromPreview> = messages.into();
        while let Some(message) = queue.pop_front() {
            for action in self.session.handle_message(message, Instant::now()) {
                match action {
                    HostAction::Post(post) => queue.extend(self.post(post)),
                    HostAction::RevealSelection { start, .. } => {
                        self.status = format!("line {}", start.line + 1);
                    }
                    HostAction::DocumentChanged => {
                        self.unsaved = true;
                        self.status = "modified".to_string();
                    }
                    HostAction::OpenDevtools => {
                        self.status = "no devtools in the terminal".to_string();
                    }
                    HostAction::Notify(notice) => self.status = notice.to_string(),
                }
            }
        }
    }

    fn post(&mut self, message: ToPreview) -> Vec<FromPreview> {
        let reloaded = matches!(message, ToPreview::UpdateContent { .. });
        let replies = self.view.handle_host_message(message);
        if reloaded {
            self.outline_state.select(None);
        }
        self.sync_outline_selection();
        replies
    }

    fn event(&mut self, event: PreviewEvent<NodeId>) {
        let messages = self.view.handle_event(event);
        self.deliver(messages);
        self.sync_outline_selection();
    }

    fn sync_outline_selection(&mut self) {
        if let Some(selected) = self.view.selected() {
            let row = self.outline().iter().position(|&(node, _)| node == selected);
            self.outline_state.select(row);
        }
    }

    fn select_row(&mut self, row: usize) {
        if let Some(&(node, _)) = self.outline().get(row) {
            self.event(PreviewEvent::Activate(node));
        }
    }

    fn step(&mut self, down: bool) {
        let len = self.outline().len();
        if len == 0 {
            return;
        }
        let row = match self.outline_state.selected() {
            Some(row) if down => (row + 1) % len,
            Some(0) => len - 1,
            Some(row) => row - 1,
            None => 0,
        };
        self.select_row(row);
    }

    /// Drags the selected element before its previous sibling or after its
    /// next one.
    fn shift(&mut self, down: bool) {
        let Some(node) = self.view.selected() else {
            return;
        };
        let surface = self.view.surface();
        let neighbour = if down {
            surface.next_sibling(node)
        } else {
            surface.previous_sibling(node)
        };
        let Some(target) = neighbour else {
            self.status = "nothing to swap with".to_string();
            return;
        };
        let rect = surface.bounding_box(target);
        let y = if down { rect.y + rect.height } else { rect.y };

        self.event(PreviewEvent::DragStart(node));
        self.event(PreviewEvent::Drop { target, y });
        self.event(PreviewEvent::Activate(node));
    }

    fn delete(&mut self) {
        let row = self.outline_state.selected().unwrap_or(0);
        self.event(PreviewEvent::Key(KeyInput::plain(Key::Delete)));
        let last = self.outline().len().saturating_sub(1);
        self.select_row(row.min(last));
    }

    fn zoom(&mut self, message: ToPreview) {
        self.post(message);
        self.status = format!("zoom {}%", self.view.zoom().level());
    }

    fn save(&mut self) -> Result<()> {
        io::write_html_file(&self.file, &self.session.document().text())?;
        self.unsaved = false;
        self.status = format!("saved {}", self.file.absolute_path().display());
        Ok(())
    }

    /// Delivers a due refresh and restores the selected row.
    fn tick(&mut self) {
        let row = self.outline_state.selected();
        if let Some(update) = self.session.poll(Instant::now()) {
            self.post(update);
            if let Some(row) = row {
                let last = self.outline().len().saturating_sub(1);
                self.select_row(row.min(last));
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.session
            .next_deadline()
            .map_or(IDLE_TICK, |deadline| {
                deadline.saturating_duration_since(Instant::now()).min(IDLE_TICK)
            })
    }

    fn selected_boundary(&self, text: &str) -> Option<ElementBoundary> {
        let node = self.view.selected()?;
        let id = self.view.surface().tracking_id(node)?;
        let provenance = self.view.source_map().get(id)?;
        find_element(text, &provenance.element)
    }
}

fn init_logging(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_config() -> PreviewConfig {
    match PreviewConfig::load() {
        Ok(Some(config)) => config,
        Ok(None) => PreviewConfig::default(),
        Err(e) => {
            log::warn!("{e}; using default settings");
            PreviewConfig::default()
        }
    }
}

fn html_file(arg: &str) -> Result<HtmlFile> {
    let path = PreviewConfig::expand_path(Path::new(arg)).unwrap_or_else(|| PathBuf::from(arg));
    anyhow::ensure!(
        HtmlFile::is_html_path(&path),
        "not an .html or .htm file: {}",
        path.display()
    );
    let file = HtmlFile::from_path(&path)
        .with_context(|| format!("not a file path: {}", path.display()))?;
    io::validate_root(file.root())?;
    Ok(file)
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <file.html>");
    eprintln!("       {program} annotate <file.html> [base-uri]");
    eprintln!("       {program} serve <file.html>");
    process::exit(1);
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("html-livebridge", String::as_str);

    match args.get(1..).unwrap_or_default() {
        [command, path, rest @ ..] if command == "annotate" && rest.len() <= 1 => {
            init_logging("info");
            let file = html_file(path)?;
            let text = io::read_html_file(&file)?;
            let base_uri = rest.first().cloned().unwrap_or_else(|| file.base_uri());
            println!("{}", document_shell(&annotate(&text).html, &base_uri));
            Ok(())
        }
        [command, path] if command == "serve" => {
            init_logging("info");
            serve::run(html_file(path)?, load_config())
        }
        [path] if path != "annotate" && path != "serve" => {
            // Log output would draw over the terminal UI
            init_logging("off");
            let file = match html_file(path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    process::exit(1);
                }
            };
            let app = App::new(file, load_config())?;
            run_tui(app)
        }
        _ => usage(program),
    }
}

fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    if app.unsaved {
        println!("Unsaved changes to {} were discarded", app.file.display_name());
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(app.timeout())?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let shift = key.modifiers.contains(KeyModifiers::SHIFT);
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Up if shift => app.shift(false),
                KeyCode::Down if shift => app.shift(true),
                KeyCode::Char('K') => app.shift(false),
                KeyCode::Char('J') => app.shift(true),
                KeyCode::Up | KeyCode::Char('k') => app.step(false),
                KeyCode::Down | KeyCode::Char('j') => app.step(true),
                KeyCode::Delete | KeyCode::Backspace => app.delete(),
                KeyCode::Char('u') => app.event(PreviewEvent::Toolbar(ToolbarAction::Undo)),
                KeyCode::Char('r') => app.event(PreviewEvent::Toolbar(ToolbarAction::Redo)),
                KeyCode::Char('s') => {
                    if let Err(e) = app.save() {
                        app.status = format!("save failed: {e}");
                    }
                }
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    let message = app.session.zoom_in();
                    app.zoom(message);
                }
                KeyCode::Char('-') => {
                    let message = app.session.zoom_out();
                    app.zoom(message);
                }
                KeyCode::Char('0') => {
                    let message = app.session.reset_zoom();
                    app.zoom(message);
                }
                _ => {}
            }
        }

        app.tick();
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(rows[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)].as_ref())
        .split(columns[1]);

    // Element outline
    let surface = app.view.surface();
    let items: Vec<ListItem> = app
        .outline()
        .into_iter()
        .map(|(node, depth)| {
            let line = surface.attribute(node, ATTR_LINE).unwrap_or_default();
            let text = format!("{}<{}>  :{line}", "  ".repeat(depth), surface.tag_name(node));
            ListItem::new(Line::from(text))
        })
        .collect();
    let outline = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "{} ({}%)",
            app.file.display_name(),
            app.view.zoom().level()
        )))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(outline, columns[0], &mut app.outline_state);

    // Source with the selected element highlighted
    let text = app.session.document().text();
    let boundary = app.selected_boundary(&text);
    let highlight = Style::default().bg(Color::Blue).fg(Color::White);
    let source: Vec<Line> = split_lines(&text)
        .into_iter()
        .enumerate()
        .map(|(index, line)| match boundary {
            Some(b) if (b.start().line..=b.end().line).contains(&index) => {
                let from = if index == b.start().line { b.start().column } else { 0 };
                let to = if index == b.end().line { b.end().column } else { line.len() };
                let (Some(before), Some(inside), Some(after)) =
                    (line.get(..from), line.get(from..to), line.get(to..))
                else {
                    return Line::from(line.to_string());
                };
                Line::from(vec![
                    Span::raw(before.to_string()),
                    Span::styled(inside.to_string(), highlight),
                    Span::raw(after.to_string()),
                ])
            }
            _ => Line::from(line.to_string()),
        })
        .collect();
    let scroll = boundary
        .map(|b| b.start().line.saturating_sub(3))
        .unwrap_or(0);
    let title = if app.unsaved { "Source [+]" } else { "Source" };
    let source = Paragraph::new(source)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(source, right[0]);

    // Inspector: non-empty computed properties of the selection
    let label = app.view.element_label().unwrap_or_default();
    let properties: Vec<Line> = app
        .view
        .inspector()
        .unwrap_or_default()
        .into_iter()
        .flat_map(|category| category.properties)
        .filter(|property| !property.value.is_empty())
        .map(|property| Line::from(format!("{}: {}", property.name, property.value)))
        .collect();
    let inspector = Paragraph::new(properties)
        .block(Block::default().borders(Borders::ALL).title(label));
    f.render_widget(inspector, right[1]);

    let help = Line::from(vec![
        Span::raw("q: Quit | ↑/↓: Select | Shift+↑/↓ or K/J: Move | Del: Delete | "),
        Span::raw("u/r: Undo/Redo | s: Save | +/-/0: Zoom   "),
        Span::styled(app.status.clone(), Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(vec![help]), rows[1]);
}
