use crate::config::{Config, TabConfig};
use crate::data::User;
use crate::jira::IssueQuery;
use crate::tui::board::plan_toggle;
use crate::tui::clipboard;
use crate::tui::detail::DetailPane;
use crate::tui::keybindings::Mode;
use crate::tui::message::{Message, TabLoad};
use crate::tui::overlay::{ErrorOverlay, FuzzyOverlay, HelpOverlay, Overlay, PickTarget, Picked};
use crate::tui::subprocess::{ExecKind, ExecOutcome, ExecRequest};
use crate::tui::table::{DetailRequest, FilterMode, IssueTable};
use crate::tui::tasks::{self, Service, TabRequest};
use crate::tui::theme::Theme;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Spinner animation frames
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// How long a status line message stays up.
const STATUS_TTL: Duration = Duration::from_secs(1);

/// Rows taken by the tab band when there is more than one tab.
const TAB_BAND_ROWS: u16 = 2;

/// One configured view: its own query, table, cache and detail pane.
pub struct Tab {
    pub config: TabConfig,
    pub table: IssueTable,
    pub detail: DetailPane,
    requested: bool,
}

impl Tab {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn columns(&self) -> Vec<String> {
        self.config.columns()
    }
}

pub struct StatusMessage {
    pub text: String,
    deadline: Instant,
}

pub struct App {
    config: Config,
    service: Service,
    config_path: Option<PathBuf>,
    tabs: Vec<Tab>,
    active: usize,
    overlay: Option<Overlay>,
    theme: Theme,
    size: (u16, u16),
    status: Option<StatusMessage>,
    spinner_frame: usize,

    /// Assignable users, fetched once and kept for the app's lifetime
    users: Option<Vec<User>>,
    users_requested: bool,
    /// Selector to open when the users or epics it needs arrive
    awaiting_users: Option<PickTarget>,
    awaiting_epics: Option<PickTarget>,

    /// Child command the run loop should hand the terminal to
    pending_exec: Option<ExecRequest>,

    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
}

impl App {
    pub fn new(config: Config, service: Service, config_path: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let theme = Theme::from_config(&config.ui.theme);
        let tabs = config
            .effective_tabs()
            .into_iter()
            .map(|tab_config| Tab {
                config: tab_config,
                table: IssueTable::new(),
                detail: DetailPane::new(
                    &config.server,
                    config.ui.issue.comment_limit,
                    config.ui.issue.scroll_step(),
                )
                .with_styles(theme.markdown()),
                requested: false,
            })
            .collect();

        Self {
            config,
            service,
            config_path,
            tabs,
            active: 0,
            overlay: None,
            theme,
            size: (0, 0),
            status: None,
            spinner_frame: 0,
            users: None,
            users_requested: false,
            awaiting_users: None,
            awaiting_epics: None,
            pending_exec: None,
            tx,
            rx,
        }
    }

    /// Kick off loading the first tab.
    pub fn start(&mut self) {
        self.ensure_loaded(self.active);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    pub fn users(&self) -> Option<&[User]> {
        self.users.as_deref()
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Which key table applies right now.
    pub fn mode(&self) -> Mode {
        match &self.overlay {
            Some(overlay) => overlay.mode(),
            None if self.active_tab().table.filter_mode() == FilterMode::Filtering => {
                Mode::Filtering
            }
            None => Mode::Normal,
        }
    }

    /// Child command queued by the last update, if any.
    pub fn take_pending_exec(&mut self) -> Option<ExecRequest> {
        self.pending_exec.take()
    }

    /// Wait for the next background message.
    pub async fn recv_message(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loop hooks
    // ─────────────────────────────────────────────────────────────────────────

    pub fn on_tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        self.expire_status(Instant::now());
    }

    /// Drop the status message once its deadline has passed.
    pub fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| now >= s.deadline) {
            self.status = None;
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            deadline: Instant::now() + STATUS_TTL,
        });
    }

    /// Apply every message that background tasks have delivered so far.
    /// Returns true if one of them asked to quit.
    pub fn poll_messages(&mut self) -> Result<bool> {
        let mut delivered = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            delivered.push(msg);
        }
        for msg in delivered {
            if self.update(msg)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Update
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one message. Returns true when the app should exit.
    pub fn update(&mut self, msg: Message) -> Result<bool> {
        match msg {
            Message::Quit => return Ok(true),
            Message::Back => {
                let tab = &mut self.tabs[self.active];
                if tab.table.filter_mode() == FilterMode::Active {
                    tab.table.cancel_filter();
                    self.sync_detail(self.active);
                } else {
                    return Ok(true);
                }
            }
            Message::Resize { width, height } => match &mut self.overlay {
                Some(overlay) => overlay.resize(width, height),
                None => self.layout(width, height),
            },

            Message::MoveDown => self.move_cursor(1),
            Message::MoveUp => self.move_cursor(-1),
            Message::NextTab => self.switch_tab(1),
            Message::PrevTab => self.switch_tab(-1),
            Message::ScrollDetailDown => self.tabs[self.active].detail.scroll_down(),
            Message::ScrollDetailUp => self.tabs[self.active].detail.scroll_up(),
            Message::CycleLink => {
                if let Some(url) = self.tabs[self.active].detail.cycle_link() {
                    clipboard::copy_in_background(url);
                }
            }

            Message::StartFilter => self.tabs[self.active].table.enter_filter_mode(),
            Message::FilterInput(c) => {
                self.tabs[self.active].table.push_filter_char(c);
                self.sync_detail(self.active);
            }
            Message::FilterBackspace => {
                self.tabs[self.active].table.pop_filter_char();
                self.sync_detail(self.active);
            }
            Message::CommitFilter => self.tabs[self.active].table.commit_filter(),
            Message::CancelFilter => {
                self.tabs[self.active].table.cancel_filter();
                self.sync_detail(self.active);
            }

            Message::OpenInBrowser => {
                if let Some(url) = self.current_url() {
                    if let Err(e) = crate::util::open_url(&url) {
                        tracing::warn!("Failed to open {}: {:#}", url, e);
                    }
                }
            }
            Message::CopyUrl => {
                if let Some(url) = self.current_url() {
                    clipboard::copy_in_background(url.clone());
                    self.set_status(format!("Current issue FQDN copied: {}", url));
                }
            }
            Message::CreateIssue => {
                let project = self.config.tab_project(&self.tabs[self.active].config);
                self.pending_exec = Some(ExecRequest::create(
                    self.active,
                    project,
                    self.config_path.as_deref(),
                ));
            }
            Message::EditIssue => {
                if let Some(key) = self.current_key() {
                    self.pending_exec =
                        Some(ExecRequest::edit(self.active, &key, self.config_path.as_deref()));
                }
            }
            Message::MoveIssue => {
                if let Some(key) = self.current_key() {
                    self.pending_exec = Some(ExecRequest::transition(
                        self.active,
                        &key,
                        self.config_path.as_deref(),
                    ));
                }
            }
            Message::AddComment => {
                if let Some(key) = self.current_key() {
                    self.pending_exec = Some(ExecRequest::comment(
                        self.active,
                        &key,
                        self.config_path.as_deref(),
                    ));
                }
            }
            Message::ToggleBacklog => self.toggle_backlog(),
            Message::Reload => self.reload(self.active),
            Message::OpenUserSelector => self.open_user_selector(),
            Message::OpenEpicSelector => self.open_epic_selector(),

            Message::ToggleHelp => {
                let (w, h) = self.size;
                self.overlay = Some(Overlay::Help(HelpOverlay::new(w, h)));
            }
            Message::HelpScroll(delta) => {
                if let Some(Overlay::Help(help)) = &mut self.overlay {
                    help.scroll_by(delta);
                }
            }
            Message::CloseOverlay => self.close_overlay(),
            Message::SelectorInput(c) => {
                if let Some(Overlay::Fuzzy(fuzzy)) = &mut self.overlay {
                    fuzzy.push_char(c);
                }
            }
            Message::SelectorBackspace => {
                if let Some(Overlay::Fuzzy(fuzzy)) = &mut self.overlay {
                    fuzzy.pop_char();
                }
            }
            Message::SelectorMove(delta) => {
                if let Some(Overlay::Fuzzy(fuzzy)) = &mut self.overlay {
                    fuzzy.move_cursor(delta);
                }
            }
            Message::SelectorPick => self.pick(),
            Message::DismissError => {
                self.close_overlay();
                if let Some(key) = self.current_key() {
                    self.refresh_issue(self.active, &key);
                }
            }

            Message::IssuesLoaded { tab, result } => self.on_issues_loaded(tab, result),
            Message::DetailLoaded {
                tab,
                row,
                key,
                generation,
                result,
            } => {
                let Some(t) = self.tabs.get_mut(tab) else {
                    return Ok(false);
                };
                if generation < t.table.generation(&key) {
                    // A newer fetch was started (or will be) for this key
                    tracing::debug!("Dropping outdated fetch of {}", key);
                    return Ok(false);
                }
                match result {
                    Ok(detail) => {
                        let Some(detail) = t.table.store_detail(detail, generation) else {
                            return Ok(false);
                        };
                        if t.table.is_current(row, &key) {
                            t.detail.set_issue(Some(detail));
                        } else {
                            tracing::debug!("Dropping stale detail for {} (row {})", key, row);
                        }
                    }
                    Err(e) => {
                        if t.table.is_current(row, &key) {
                            self.show_error(format!("Failed to load {}: {}", key, e), "");
                        } else {
                            tracing::debug!("Ignoring failed fetch for stale row {}: {}", key, e);
                        }
                    }
                }
            }
            Message::Prefetched {
                tab,
                key,
                generation,
                result,
            } => {
                let Some(t) = self.tabs.get_mut(tab) else {
                    return Ok(false);
                };
                match result {
                    Ok(detail) => {
                        let Some(detail) = t.table.store_detail(detail, generation) else {
                            return Ok(false);
                        };
                        let showing_current = t.table.current_issue().is_some_and(|i| i.key == key);
                        if showing_current && t.detail.is_loading() {
                            t.detail.set_issue(Some(detail));
                        }
                    }
                    Err(e) => tracing::debug!("Prefetch of {} failed: {}", key, e),
                }
            }
            Message::UsersLoaded(result) => match result {
                Ok(users) => {
                    tracing::info!("Loaded {} assignable users", users.len());
                    self.users = Some(users);
                    if let Some(target) = self.awaiting_users.take() {
                        self.show_user_selector(target);
                    }
                }
                Err(e) => {
                    self.users_requested = false;
                    self.awaiting_users = None;
                    self.show_error(format!("Failed to load assignable users: {}", e), "");
                }
            },
            Message::EpicsLoaded { tab, result } => match result {
                Ok(epics) => {
                    if let Some(target) = self.awaiting_epics.take().filter(|t| t.tab == tab) {
                        let (w, h) = self.size;
                        self.overlay =
                            Some(Overlay::Fuzzy(FuzzyOverlay::epics(target, epics, w, h)));
                    }
                }
                Err(e) => {
                    self.awaiting_epics = None;
                    self.show_error(format!("Failed to load epics: {}", e), "");
                }
            },
            Message::UserAssigned { tab, key, result } => match result {
                Ok(()) => self.refresh_issue(tab, &key),
                Err(e) => self.show_error(format!("Failed to assign {}: {}", key, e), ""),
            },
            Message::BacklogToggled {
                tab,
                key,
                to_backlog,
                result,
            } => match result {
                Ok(()) => {
                    if let Some(board) = self.tabs.get_mut(tab).and_then(|t| t.table.board_mut()) {
                        board.set_in_backlog(&key, to_backlog);
                    }
                    self.refresh_issue(tab, &key);
                }
                Err(e) => self.show_error(format!("Failed to move {}: {}", key, e), ""),
            },
            Message::SubprocessFinished {
                tab,
                kind,
                key,
                outcome,
            } => self.on_subprocess_finished(tab, kind, key, outcome),

            Message::None => {}
        }
        Ok(false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────────

    /// Split the window between table and detail pane, for every tab.
    fn layout(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        let band = if self.tabs.len() > 1 { TAB_BAND_ROWS } else { 0 };
        let available = height.saturating_sub(band);
        let table_height = available * 2 / 5;
        // One row separates the table from the detail pane
        let detail_height = available.saturating_sub(table_height).saturating_sub(1);

        for tab in &mut self.tabs {
            tab.table.set_height(table_height as usize);
            tab.detail.resize(width, detail_height);
        }
    }

    /// Rows of the table and detail pane, as laid out for the current size.
    pub fn pane_heights(&self) -> (u16, u16) {
        let tab = self.active_tab();
        (tab.table.height() as u16, tab.detail.size().1 as u16)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tabs and detail
    // ─────────────────────────────────────────────────────────────────────────

    fn switch_tab(&mut self, delta: isize) {
        let count = self.tabs.len() as isize;
        self.active = (self.active as isize + delta).rem_euclid(count) as usize;
        tracing::debug!("Switched to tab {}", self.active);
        self.ensure_loaded(self.active);
    }

    fn ensure_loaded(&mut self, tab: usize) {
        if !self.tabs[tab].requested {
            self.reload(tab);
        }
    }

    fn reload(&mut self, index: usize) {
        let tab = &mut self.tabs[index];
        tab.requested = true;
        tab.table.set_loading();

        let board = tab.config.board_id.map(|id| {
            (
                id,
                IssueQuery::for_tab(&self.config, &tab.config).filter_clause(),
            )
        });
        let request = TabRequest {
            tab: index,
            jql: IssueQuery::for_tab(&self.config, &tab.config).to_jql(),
            page_size: self.config.ui.list.page_size,
            board,
        };
        tasks::load_tab(Arc::clone(&self.service), self.tx.clone(), request);
    }

    fn on_issues_loaded(&mut self, index: usize, result: Result<TabLoad, String>) {
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        match result {
            Ok(load) => {
                tab.table.load(load.issues);
                tab.table.set_board(load.board);
                self.sync_detail(index);

                let tab = &self.tabs[index];
                let current = tab.table.current_issue().map(|i| i.key.clone());
                let keys: Vec<(String, u64)> = tab
                    .table
                    .keys_from_top(self.config.ui.list.prefetch_from_top)
                    .into_iter()
                    .filter(|(k, _)| Some(k) != current.as_ref())
                    .collect();
                tasks::prefetch(
                    Arc::clone(&self.service),
                    self.tx.clone(),
                    index,
                    keys,
                    self.config.ui.issue.comment_limit,
                );
            }
            Err(e) => {
                tab.table.load(Vec::new());
                tab.detail.clear();
                let error = format!("Failed to load {}: {}", tab.config.name, e);
                self.show_error(error, "");
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let table = &mut self.tabs[self.active].table;
        let before = table.cursor();
        table.cursor_move(delta);
        if table.cursor() != before {
            self.show_current(self.active);
        }
    }

    /// Point the detail pane at the cursor row, fetching it if needed.
    fn show_current(&mut self, index: usize) {
        let tab = &mut self.tabs[index];
        match tab.table.request_detail(0) {
            DetailRequest::Ready(detail) => tab.detail.set_issue(Some(detail)),
            DetailRequest::Pending {
                key,
                row,
                generation,
            } => {
                tab.detail.set_issue(None);
                tasks::fetch_detail(
                    Arc::clone(&self.service),
                    self.tx.clone(),
                    index,
                    row,
                    key,
                    generation,
                    self.config.ui.issue.comment_limit,
                );
            }
            DetailRequest::Empty => tab.detail.clear(),
        }
    }

    /// Re-point the detail pane only if the cursor now sits on another issue.
    fn sync_detail(&mut self, index: usize) {
        let tab = &self.tabs[index];
        let current = tab.table.current_issue().map(|i| i.key.as_str());
        let shown = tab.detail.issue().map(|d| d.key());
        if current.is_none() || current != shown || tab.detail.is_loading() {
            self.show_current(index);
        }
    }

    /// Forget the cached copy of `key` and show fresh data if it is on screen.
    fn refresh_issue(&mut self, index: usize, key: &str) {
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        tab.table.invalidate(key);
        if tab.table.current_issue().is_some_and(|i| i.key == key) {
            self.show_current(index);
        }
    }

    fn current_key(&self) -> Option<String> {
        self.active_tab()
            .table
            .current_issue()
            .map(|i| i.key.clone())
    }

    fn current_url(&self) -> Option<String> {
        self.current_key().map(|key| self.config.browse_url(&key))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn toggle_backlog(&mut self) {
        let Some(key) = self.current_key() else {
            return;
        };
        let tab = &self.tabs[self.active];
        match plan_toggle(tab.config.board_id, tab.table.board(), &key) {
            Ok(toggle) => {
                tracing::info!(
                    "Moving {} to {}",
                    toggle.key,
                    if toggle.to_backlog { "backlog" } else { "board" }
                );
                tasks::toggle_backlog(
                    Arc::clone(&self.service),
                    self.tx.clone(),
                    self.active,
                    toggle.board_id,
                    toggle.key,
                    toggle.to_backlog,
                );
            }
            Err(e) => self.show_error(e.to_string(), ""),
        }
    }

    fn open_user_selector(&mut self) {
        let Some(key) = self.current_key() else {
            return;
        };
        let target = PickTarget {
            tab: self.active,
            key: key.clone(),
        };
        if self.users.is_some() {
            self.show_user_selector(target);
            return;
        }
        self.awaiting_users = Some(target);
        if !self.users_requested {
            self.users_requested = true;
            tasks::fetch_users(Arc::clone(&self.service), self.tx.clone(), key);
        }
    }

    fn show_user_selector(&mut self, target: PickTarget) {
        let users = self.users.clone().unwrap_or_default();
        let (w, h) = self.size;
        self.overlay = Some(Overlay::Fuzzy(FuzzyOverlay::users(target, users, w, h)));
    }

    fn open_epic_selector(&mut self) {
        let Some(key) = self.current_key() else {
            return;
        };
        self.awaiting_epics = Some(PickTarget {
            tab: self.active,
            key,
        });
        let jql = IssueQuery::epics_for_tab(&self.config, &self.tabs[self.active].config).to_jql();
        tasks::fetch_epics(
            Arc::clone(&self.service),
            self.tx.clone(),
            self.active,
            jql,
            self.config.ui.list.page_size,
        );
    }

    fn pick(&mut self) {
        let Some(Overlay::Fuzzy(fuzzy)) = &self.overlay else {
            return;
        };
        let Some(picked) = fuzzy.pick() else {
            return;
        };
        self.close_overlay();

        match picked {
            Picked::Epic { target, epic } => {
                self.pending_exec = Some(ExecRequest::assign_epic(
                    target.tab,
                    &epic.key,
                    &target.key,
                    self.config_path.as_deref(),
                ));
            }
            Picked::User { target, user } => {
                tasks::assign_user(
                    Arc::clone(&self.service),
                    self.tx.clone(),
                    target.tab,
                    target.key,
                    user,
                );
            }
        }
    }

    fn on_subprocess_finished(
        &mut self,
        tab: usize,
        kind: ExecKind,
        key: Option<String>,
        outcome: ExecOutcome,
    ) {
        match outcome {
            ExecOutcome::Ok | ExecOutcome::Cancelled => {
                if kind.needs_full_reload() {
                    self.reload(tab);
                } else if let Some(key) = key {
                    self.refresh_issue(tab, &key);
                }
            }
            ExecOutcome::Failed { error, stderr } => self.show_error(error, stderr),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overlays
    // ─────────────────────────────────────────────────────────────────────────

    fn show_error(&mut self, error: impl Into<String>, output: impl Into<String>) {
        let error = error.into();
        tracing::error!("{}", error);
        let (w, h) = self
            .overlay
            .as_ref()
            .map(|o| o.size())
            .unwrap_or(self.size);
        self.overlay = Some(Overlay::Error(ErrorOverlay::new(error, output, w, h)));
    }

    /// Close the overlay and lay the tabs out for the size it last saw.
    fn close_overlay(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            let (w, h) = overlay.size();
            self.layout(w, h);
        }
    }
}
