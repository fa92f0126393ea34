use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::functions::dashboard::DashboardStats;

use super::components::SelectList;
use super::{body_and_footer, money, render_help};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    Appointments,
    Clients,
    Products,
    Services,
    Recipes,
    Suppliers,
    Expenses,
    Receipts,
    ChangePassword,
    Logout,
}

impl MenuEntry {
    pub const ALL: [MenuEntry; 10] = [
        MenuEntry::Appointments,
        MenuEntry::Clients,
        MenuEntry::Products,
        MenuEntry::Services,
        MenuEntry::Recipes,
        MenuEntry::Suppliers,
        MenuEntry::Expenses,
        MenuEntry::Receipts,
        MenuEntry::ChangePassword,
        MenuEntry::Logout,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Appointments => "Appointments",
            MenuEntry::Clients => "Clients",
            MenuEntry::Products => "Products & stock",
            MenuEntry::Services => "Services",
            MenuEntry::Recipes => "Service recipes",
            MenuEntry::Suppliers => "Suppliers",
            MenuEntry::Expenses => "Expenses",
            MenuEntry::Receipts => "Receipts",
            MenuEntry::ChangePassword => "Change password",
            MenuEntry::Logout => "Log out",
        }
    }
}

pub struct DashboardState {
    pub username: String,
    pub stats: Option<DashboardStats>,
    menu: SelectList<MenuEntry>,
}

pub enum DashboardAction {
    Open(MenuEntry),
    Refresh,
    Quit,
}

impl DashboardState {
    pub fn new(username: String, stats: DashboardStats) -> Self {
        Self {
            username,
            stats: Some(stats),
            menu: SelectList::new(MenuEntry::ALL.to_vec()),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<DashboardAction> {
        match key {
            KeyCode::Char('q') => return Some(DashboardAction::Quit),
            KeyCode::Char('r') => return Some(DashboardAction::Refresh),
            KeyCode::Down => self.menu.next(),
            KeyCode::Up => self.menu.previous(),
            KeyCode::Enter => {
                if let Some(entry) = self.menu.selected() {
                    return Some(DashboardAction::Open(*entry));
                }
            }
            _ => {}
        }
        None
    }
}

fn stat_line(label: &str, value: String) -> Spans<'static> {
    Spans::from(vec![
        Span::styled(format!("{label:<22}"), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

pub fn render_dashboard<B: Backend>(f: &mut Frame<B>, state: &mut DashboardState) {
    let (body, footer) = body_and_footer(f.size());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(30)].as_ref())
        .split(body);

    let items: Vec<ListItem> = state
        .menu
        .items()
        .iter()
        .map(|entry| ListItem::new(entry.label()))
        .collect();
    let menu = List::new(items)
        .block(
            Block::default()
                .title(format!("Menu ({})", state.username))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(menu, columns[0], state.menu.list_state());

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(3)].as_ref())
        .split(columns[1]);

    let mut lines = Vec::new();
    let mut upcoming = Vec::new();
    if let Some(stats) = &state.stats {
        lines.push(stat_line("Today's appointments", stats.today_appointments.to_string()));
        lines.push(stat_line("Awaiting confirmation", stats.pending_appointments.to_string()));
        lines.push(stat_line("Revenue this month", money(stats.month_revenue)));
        lines.push(stat_line("Expenses this month", money(stats.month_expenses)));
        lines.push(stat_line("Net this month", money(stats.month_net)));
        lines.push(stat_line("Low stock products", stats.low_stock_products.to_string()));
        lines.push(stat_line("Clients", stats.client_count.to_string()));

        upcoming = stats
            .upcoming
            .iter()
            .map(|a| {
                ListItem::new(format!(
                    "{} {}  {}  {}",
                    a.appointment.date.format("%d/%m"),
                    a.appointment.time,
                    a.client_name(),
                    a.service_names()
                ))
            })
            .collect();
    }

    let stats = Paragraph::new(lines).block(Block::default().title("Dashboard").borders(Borders::ALL));
    f.render_widget(stats, right[0]);

    let upcoming = List::new(upcoming)
        .block(Block::default().title("Upcoming confirmed").borders(Borders::ALL));
    f.render_widget(upcoming, right[1]);

    render_help(f, footer, "<Enter> Open | <R> Refresh | <Q> Quit");
}

pub fn handle_input(state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}
