use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, Tabs, Wrap,
    },
};

use crate::domain::{HELP_TEXT, SortOrder};
use crate::model::{Model, Modus};
use crate::session::{COLUMN_SPACING, Session};

pub const TABS_HEIGHT: usize = 1;
pub const INFO_HEIGHT: usize = 1;
pub const FILTER_HEIGHT: usize = 3;
pub const STATUS_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const FOOTER_HEIGHT: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
/// Padding on both sides of a tab title plus the divider.
pub const TAB_DECORATION_WIDTH: usize = 3;

const FILTER_PLACEHOLDER: &str = "Type to filter rows (RegEx supported)...";
const ALTERNATE_ROW_BG: Color = Color::Indexed(236);

pub fn draw(model: &Model, frame: &mut Frame) {
    let [tabs_area, info_area, filter_area, status_area, table_area, footer_area] =
        Layout::vertical([
            Constraint::Length(TABS_HEIGHT as u16),
            Constraint::Length(INFO_HEIGHT as u16),
            Constraint::Length(FILTER_HEIGHT as u16),
            Constraint::Length(STATUS_HEIGHT as u16),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT as u16),
        ])
        .areas(frame.area());

    let session = model.session();
    draw_tabs(model, frame, tabs_area);

    if !session.info.is_empty() {
        let info = Paragraph::new(format!("Info: {}", session.info)).style(
            Style::new()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        );
        frame.render_widget(info, info_area);
    }

    draw_filter(model, frame, filter_area);
    frame.render_widget(Paragraph::new(session.status_line()), status_area);
    draw_table(model, frame, table_area);
    draw_footer(model, frame, footer_area);

    if model.modus() == Modus::POPUP {
        draw_popup(frame, frame.area());
    }
}

fn draw_tabs(model: &Model, frame: &mut Frame, area: Rect) {
    let titles: Vec<String> = model.sessions().iter().map(|s| s.title()).collect();
    let tabs = Tabs::new(titles)
        .select(model.active_index())
        .style(Style::new().fg(Color::DarkGray))
        .highlight_style(
            Style::new()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_filter(model: &Model, frame: &mut Frame, area: Rect) {
    let editing = model.modus() == Modus::FILTERINPUT;
    let text = if editing {
        model.last_input().input.clone()
    } else {
        model.session().filter().pattern().to_string()
    };

    let border_style = if editing {
        Style::new().fg(Color::Yellow)
    } else {
        Style::new()
    };
    let block = Block::bordered()
        .title(" Filter ")
        .border_style(border_style);

    let content = if text.is_empty() {
        Paragraph::new(Span::styled(
            FILTER_PLACEHOLDER,
            Style::new().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(text)
    };
    frame.render_widget(content.block(block), area);

    if editing {
        let x = area.x + 1 + model.last_input().curser_pos as u16;
        let max_x = area.right().saturating_sub(2);
        frame.set_cursor_position(Position::new(std::cmp::min(x, max_x), area.y + 1));
    }
}

/// Shortens a header to fit into `width`, marking the cut with "...".
fn get_visible_name(name: &str, width: usize) -> String {
    if width < 3 {
        return String::new();
    }
    if name.chars().count() > width {
        let mut reduced: String = name.chars().take(width - 3).collect();
        reduced.push_str("...");
        reduced
    } else {
        name.to_string()
    }
}

fn header_label(session: &Session, column: usize, width: usize) -> String {
    let name = session.grid().column_label(column);
    match session.grid().sort_state() {
        Some(state) if state.column == column => {
            let arrow = match state.order {
                SortOrder::Ascending => "▲",
                SortOrder::Descending => "▼",
            };
            format!("{} {arrow}", get_visible_name(name, width.saturating_sub(2)))
        }
        _ => get_visible_name(name, width),
    }
}

fn draw_table(model: &Model, frame: &mut Frame, area: Rect) {
    let session = model.session();
    let layout = model.layout();
    let [grid_area, scrollbar_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SCROLLBAR_WIDTH as u16),
    ])
    .areas(area);

    let (curser_row, curser_column) = session.curser();
    let visible = session.visible_columns();

    let header_style = Style::new()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(visible.iter().map(|c| {
        let style = if c.idx == curser_column {
            header_style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
        } else {
            header_style
        };
        Cell::from(header_label(session, c.idx, c.width)).style(style)
    }));
    let header = Row::new(header_cells);

    let rows: Vec<Row> = session
        .page()
        .map(|(pos, row)| {
            let mut cells = vec![
                Cell::from(session.grid().row_label(row)).style(Style::new().fg(Color::DarkGray)),
            ];
            cells.extend(visible.iter().map(|c| {
                let cell = Cell::from(session.grid().cell(row, c.idx));
                if pos == curser_row && c.idx == curser_column {
                    cell.style(Style::new().add_modifier(Modifier::REVERSED))
                } else {
                    cell
                }
            }));
            let row_style = if pos % 2 == 1 {
                Style::new().bg(ALTERNATE_ROW_BG)
            } else {
                Style::new()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(layout.index_width as u16)];
    widths.extend(visible.iter().map(|c| Constraint::Length(c.width as u16)));

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(COLUMN_SPACING as u16)
        .flex(Flex::Start);
    frame.render_widget(table, grid_area);

    let total = session.rows().len();
    if total > layout.table_height {
        let mut state = ScrollbarState::new(total).position(curser_row);
        let bar_area = Rect {
            y: scrollbar_area.y + TABLE_HEADER_HEIGHT as u16,
            height: scrollbar_area.height.saturating_sub(TABLE_HEADER_HEIGHT as u16),
            ..scrollbar_area
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            bar_area,
            &mut state,
        );
    }
}

fn draw_footer(model: &Model, frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::new().fg(Color::Blue).add_modifier(Modifier::BOLD));
    let hints = match model.modus() {
        Modus::FILTERINPUT => vec![key(" Enter"), " keep ".into(), key("Esc"), " clear ".into()],
        Modus::POPUP => vec![key(" Esc"), " close ".into()],
        Modus::TABLE => vec![
            key(" /"),
            " filter ".into(),
            key("s"),
            " sort ".into(),
            key("Tab"),
            " next ".into(),
            key("q"),
            " close ".into(),
            key("?"),
            " help ".into(),
        ],
    };
    let [message_area, hints_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(hints_width(&hints))])
            .areas(area);
    frame.render_widget(
        Paragraph::new(model.status_message()).style(Style::new().fg(Color::Gray)),
        message_area,
    );
    frame.render_widget(Line::from(hints), hints_area);
}

fn hints_width(hints: &[Span]) -> u16 {
    hints.iter().map(|s| s.content.chars().count()).sum::<usize>() as u16
}

fn draw_popup(frame: &mut Frame, area: Rect) {
    let height = (HELP_TEXT.lines().count() + 2) as u16;
    let width = HELP_TEXT.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let popup = centered(area, width, height);
    let block = Block::bordered().title(" Help ");
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(HELP_TEXT).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = std::cmp::min(width, area.width);
    let height = std::cmp::min(height, area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
