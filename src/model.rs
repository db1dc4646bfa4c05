use tracing::{info, trace, warn};

use crate::domain::{Message, SortOrder, TVConfig, TVError};
use crate::inputter::{InputResult, Inputter};
use crate::session::{COLUMN_SPACING, Session};
use crate::ui::{
    FOOTER_HEIGHT, FILTER_HEIGHT, INFO_HEIGHT, SCROLLBAR_WIDTH, STATUS_HEIGHT,
    TABLE_HEADER_HEIGHT, TABS_HEIGHT, TAB_DECORATION_WIDTH,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    TABLE,
    FILTERINPUT,
    POPUP,
}

/// Screen geometry the model needs to map clicks and size the viewport.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub filter_y: usize,
    pub header_y: usize,
    pub index_width: usize,
    pub data_x: usize,
    pub table_width: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(index_width: usize, ui_width: usize, ui_height: usize) -> Self {
        let filter_y = TABS_HEIGHT + INFO_HEIGHT;
        let header_y = filter_y + FILTER_HEIGHT + STATUS_HEIGHT;
        let table_height = ui_height.saturating_sub(header_y + TABLE_HEADER_HEIGHT + FOOTER_HEIGHT);
        let data_x = index_width + COLUMN_SPACING;
        let table_width = ui_width.saturating_sub(data_x + SCROLLBAR_WIDTH);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            filter_y,
            header_y,
            index_width,
            data_x,
            table_width,
            table_height,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    sessions: Vec<Session>,
    active: usize,
    uilayout: UILayout,
    input: Inputter,
    last_input: InputResult,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &TVConfig,
        sessions: Vec<Session>,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, TVError> {
        if sessions.is_empty() {
            return Err(TVError::LoadingFailed("No sessions to show".into()));
        }
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            sessions,
            active: 0,
            uilayout: UILayout::default(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            status_message: "Press ? for help".to_string(),
        };
        model.ui_resize(ui_width, ui_height);
        Ok(model)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn session(&self) -> &Session {
        &self.sessions[self.active]
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.sessions[self.active]
    }

    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn last_input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Keys go unmapped to the inputter while the filter is edited.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FILTERINPUT
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TVError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::CloseSession => self.close_session(),
                    Message::NextSession => self.switch_session(1),
                    Message::PrevSession => self.switch_session(-1),
                    Message::MoveUp => self.session_mut().move_up(1),
                    Message::MoveDown => self.session_mut().move_down(1),
                    Message::MoveLeft => self.session_mut().move_left(),
                    Message::MoveRight => self.session_mut().move_right(),
                    Message::MovePageUp => {
                        let page = self.uilayout.table_height.max(1);
                        self.session_mut().move_up(page)
                    }
                    Message::MovePageDown => {
                        let page = self.uilayout.table_height.max(1);
                        self.session_mut().move_down(page)
                    }
                    Message::MoveBeginning => self.session_mut().move_beginning(),
                    Message::MoveEnd => self.session_mut().move_end(),
                    Message::ToggleSort => self.sort_current_column(None),
                    Message::SortDescending => self.sort_current_column(Some(SortOrder::Descending)),
                    Message::Filter => self.enter_filter_mode(),
                    Message::Help => self.show_popup(),
                    Message::Exit => self.clear_filter(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Click(x, y) => self.click(x as usize, y as usize),
                    Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.exit_popup(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::FILTERINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }

        if self.status != Status::QUITTING {
            self.update_viewport();
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn update_viewport(&mut self) {
        let index_width = self.session().index_width();
        if index_width != self.uilayout.index_width {
            self.uilayout =
                UILayout::from_values(index_width, self.uilayout.width, self.uilayout.height);
        }
        let (width, height) = (self.uilayout.table_width, self.uilayout.table_height);
        let max_column_width = self.config.max_column_width;
        self.session_mut()
            .update_viewport(width, height, max_column_width);
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(self.session().index_width(), width, height);
        self.update_viewport();
    }

    fn close_session(&mut self) {
        let closed = self.sessions.remove(self.active);
        info!("Closed {}", closed.name);
        if self.sessions.is_empty() {
            self.quit();
            return;
        }
        self.active = std::cmp::min(self.active, self.sessions.len() - 1);
        self.set_status_message(format!("Closed {}", closed.name));
    }

    fn switch_session(&mut self, step: isize) {
        let n = self.sessions.len() as isize;
        self.active = (self.active as isize + step).rem_euclid(n) as usize;
        trace!("Active session {}", self.active);
    }

    fn sort_current_column(&mut self, order: Option<SortOrder>) {
        let result = self.session_mut().sort_current_column(order);
        self.report_sort(result);
    }

    fn report_sort(&mut self, result: Result<SortOrder, TVError>) {
        match result {
            Ok(order) => {
                let session = self.session();
                let column = session.curser().1;
                let label = session.grid().column_label(column).to_string();
                self.set_status_message(format!("Sorted by \"{label}\" {order:?}"));
            }
            Err(e) => {
                warn!("Sort failed: {e}");
                self.set_status_message(format!("Sort failed: {e}"));
            }
        }
    }

    fn show_popup(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn enter_filter_mode(&mut self) {
        trace!("Entering filter mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::FILTERINPUT;
        let current = self.session().filter().pattern().to_string();
        self.input.set(&current);
        self.last_input = self.input.get();
    }

    fn clear_filter(&mut self) {
        if self.session().filter().is_active() {
            self.session_mut().set_filter("");
            self.set_status_message("Filter cleared");
        }
    }

    // The filter follows every keystroke.
    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        let pattern = self.last_input.input.clone();
        self.session_mut().set_filter(&pattern);

        if self.last_input.finished {
            trace!("Filter input done: {:?}", self.last_input);
            self.modus = self.previous_modus;
            self.previous_modus = Modus::FILTERINPUT;
            let shown = self.session().rows().len();
            if self.last_input.canceled || !self.session().filter().is_active() {
                self.set_status_message("Filter cleared");
            } else {
                self.set_status_message(format!("Filter matches {shown} rows"));
            }
        }
    }

    fn click(&mut self, x: usize, y: usize) {
        let layout = self.uilayout.clone();
        if y < TABS_HEIGHT {
            if let Some(idx) = self.tab_at(x) {
                self.active = idx;
            }
        } else if y >= layout.filter_y && y < layout.filter_y + FILTER_HEIGHT {
            self.enter_filter_mode();
        } else if y == layout.header_y && x >= layout.data_x {
            if let Some(column) = self.session().column_at(x - layout.data_x) {
                self.session_mut().select_column(column);
                let result = self.session_mut().toggle_sort(column);
                self.report_sort(result);
            }
        } else if y > layout.header_y && x >= layout.data_x {
            let page_row = y - layout.header_y - TABLE_HEADER_HEIGHT;
            if page_row >= layout.table_height {
                return;
            }
            let row = self.session().offset_row() + page_row;
            if let Some(column) = self.session().column_at(x - layout.data_x) {
                self.session_mut().select_column(column);
            }
            if row < self.session().rows().len() {
                let (current, _) = self.session().curser();
                if row >= current {
                    self.session_mut().move_down(row - current);
                } else {
                    self.session_mut().move_up(current - row);
                }
            }
        }
    }

    /// Tab under a horizontal position of the tab bar.
    fn tab_at(&self, x: usize) -> Option<usize> {
        let mut start = 0;
        for (idx, session) in self.sessions.iter().enumerate() {
            let end = start + session.title().chars().count() + TAB_DECORATION_WIDTH;
            if x < end {
                return Some(idx);
            }
            start = end;
        }
        None
    }
}
