use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::models::{AppointmentDetails, AppointmentStatus};

use super::components::SelectList;
use super::{body_and_footer, money, render_confirmation, render_help};

pub struct AppointmentsState {
    list: SelectList<AppointmentDetails>,
    /// Only this day is listed when set.
    pub day: Option<NaiveDate>,
    show_delete_confirmation: bool,
}

pub enum AppointmentAction {
    Back,
    New,
    SetStatus(i32, AppointmentStatus),
    Complete(i32),
    Delete(i32),
    ShowDay(Option<NaiveDate>),
}

fn status_color(status: AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Pending => Color::Yellow,
        AppointmentStatus::Confirmed => Color::Cyan,
        AppointmentStatus::Completed => Color::Green,
        AppointmentStatus::Cancelled => Color::DarkGray,
    }
}

impl AppointmentsState {
    pub fn new(appointments: Vec<AppointmentDetails>, day: Option<NaiveDate>) -> Self {
        Self {
            list: SelectList::new(appointments),
            day,
            show_delete_confirmation: false,
        }
    }

    pub fn set_appointments(&mut self, appointments: Vec<AppointmentDetails>) {
        self.list.set_items(appointments);
    }

    pub fn selected(&self) -> Option<&AppointmentDetails> {
        self.list.selected()
    }

    fn selected_id(&self) -> Option<i32> {
        self.selected().map(|a| a.appointment.id)
    }

    pub fn handle_key(&mut self, key: KeyCode, today: NaiveDate) -> Option<AppointmentAction> {
        if self.show_delete_confirmation {
            match key {
                KeyCode::Char('y') => {
                    self.show_delete_confirmation = false;
                    return self.selected_id().map(AppointmentAction::Delete);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.show_delete_confirmation = false,
                _ => {}
            }
            return None;
        }

        let selected_id = self.selected_id();
        let status = |status| selected_id.map(|id| AppointmentAction::SetStatus(id, status));
        match key {
            KeyCode::Esc | KeyCode::Char('q') => Some(AppointmentAction::Back),
            KeyCode::Char('n') => Some(AppointmentAction::New),
            KeyCode::Char('c') => status(AppointmentStatus::Confirmed),
            KeyCode::Char('p') => status(AppointmentStatus::Pending),
            KeyCode::Char('x') => status(AppointmentStatus::Cancelled),
            KeyCode::Enter => match self.selected() {
                Some(a) if a.appointment.status != AppointmentStatus::Completed => {
                    Some(AppointmentAction::Complete(a.appointment.id))
                }
                _ => None,
            },
            KeyCode::Char('t') => {
                let day = if self.day.is_some() { None } else { Some(today) };
                Some(AppointmentAction::ShowDay(day))
            }
            KeyCode::Left | KeyCode::Right => {
                let step = if key == KeyCode::Left { -1 } else { 1 };
                let day = self
                    .day
                    .unwrap_or(today)
                    .checked_add_signed(chrono::Duration::days(step))?;
                Some(AppointmentAction::ShowDay(Some(day)))
            }
            KeyCode::Char('d') => {
                if selected_id.is_some() {
                    self.show_delete_confirmation = true;
                }
                None
            }
            KeyCode::Down => {
                self.list.next();
                None
            }
            KeyCode::Up => {
                self.list.previous();
                None
            }
            _ => None,
        }
    }
}

pub fn render_appointments<B: Backend>(f: &mut Frame<B>, state: &mut AppointmentsState) {
    let (body, footer) = body_and_footer(f.size());

    let header = Row::new(["Date", "Time", "Client", "Services", "Total", "Status", "Message"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .list
        .items()
        .iter()
        .map(|a| {
            Row::new(vec![
                Cell::from(a.appointment.date.format("%a %d/%m").to_string()),
                Cell::from(a.appointment.time.clone()),
                Cell::from(a.client_name().to_string()),
                Cell::from(a.service_names()),
                Cell::from(money(a.total_price())),
                Cell::from(a.appointment.status.as_str())
                    .style(Style::default().fg(status_color(a.appointment.status))),
                Cell::from(a.appointment.message.clone().unwrap_or_default()),
            ])
        })
        .collect();

    let title = match state.day {
        Some(day) => format!("Appointments on {}", day.format("%A %d %B %Y")),
        None => "All appointments".to_string(),
    };

    let widths = [
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Percentage(20),
        Constraint::Percentage(30),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    let mut table_state = state.list.table_state();
    f.render_stateful_widget(table, body, &mut table_state);

    render_help(
        f,
        footer,
        "<N> New | <C> Confirm | <P> Pending | <X> Cancel | <Enter> Complete | <D> Delete | <T> Today/All | <Left/Right> Day | <Esc> Back",
    );

    if state.show_delete_confirmation {
        render_confirmation(
            f,
            "Delete this appointment?",
            "A receipt written for it is kept.",
        );
    }
}

pub fn handle_input(state: &mut AppointmentsState, today: NaiveDate) -> Result<Option<AppointmentAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code, today));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Appointment;
    use chrono::Utc;

    fn details(id: i32, status: AppointmentStatus) -> AppointmentDetails {
        AppointmentDetails {
            appointment: Appointment {
                id,
                client_id: 1,
                service_ids: vec![],
                date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
                time: "10:00".to_string(),
                status,
                notes: None,
                message: None,
                created_at: Utc::now(),
            },
            client: None,
            services: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    #[test]
    fn test_completed_appointment_cannot_be_completed_again() {
        let mut state = AppointmentsState::new(
            vec![
                details(1, AppointmentStatus::Completed),
                details(2, AppointmentStatus::Confirmed),
            ],
            None,
        );
        assert!(state.handle_key(KeyCode::Enter, today()).is_none());

        state.handle_key(KeyCode::Down, today());
        assert!(matches!(
            state.handle_key(KeyCode::Enter, today()),
            Some(AppointmentAction::Complete(2))
        ));
    }

    #[test]
    fn test_day_navigation() {
        let mut state = AppointmentsState::new(vec![], None);
        assert!(matches!(
            state.handle_key(KeyCode::Char('t'), today()),
            Some(AppointmentAction::ShowDay(Some(d))) if d == today()
        ));

        state.day = Some(today());
        assert!(matches!(
            state.handle_key(KeyCode::Right, today()),
            Some(AppointmentAction::ShowDay(Some(d))) if d == NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()
        ));
        assert!(matches!(
            state.handle_key(KeyCode::Char('t'), today()),
            Some(AppointmentAction::ShowDay(None))
        ));
    }

    #[test]
    fn test_status_shortcuts() {
        let mut state = AppointmentsState::new(vec![details(5, AppointmentStatus::Pending)], None);
        assert!(matches!(
            state.handle_key(KeyCode::Char('x'), today()),
            Some(AppointmentAction::SetStatus(5, AppointmentStatus::Cancelled))
        ));
    }
}
