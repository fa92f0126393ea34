//! The client-facing booking kiosk: pick services, a day and a time, leave contact details.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};

use crate::config::Config;
use crate::db::Database;
use crate::functions::{
    appointments::{self, TimeSlot},
    services,
};
use crate::models::{BookingRequest, Service};

use super::components::{
    render_date_input, render_form, DateInputState, FormEvent, FormField, FormState, SelectList,
};
use super::{money, render_help, render_popup, restore_terminal, setup_terminal, Popup};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BookingStep {
    Services,
    DateTime,
    Details,
    Confirm,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum DateTimeFocus {
    Date,
    Slots,
}

pub enum BookingAction {
    LoadSlots(NaiveDate),
    Submit(BookingRequest),
    Quit,
}

pub struct BookingState {
    pub step: BookingStep,
    services: SelectList<Service>,
    chosen: BTreeSet<i32>,
    pub date: DateInputState,
    focus: DateTimeFocus,
    slots: SelectList<TimeSlot>,
    details: FormState,
    pub error: Option<String>,
}

fn details_form() -> FormState {
    FormState::new(
        "Your details",
        vec![
            FormField::text("Name", "").required(),
            FormField::text("Phone", "").required(),
            FormField::text("Email", ""),
            FormField::text("Instagram", ""),
            FormField::text("Message", ""),
        ],
    )
}

impl BookingState {
    pub fn new(services: Vec<Service>, today: NaiveDate) -> Self {
        Self {
            step: BookingStep::Services,
            services: SelectList::new(services),
            chosen: BTreeSet::new(),
            date: DateInputState::new(today).not_before(today),
            focus: DateTimeFocus::Date,
            slots: SelectList::new(Vec::new()),
            details: details_form(),
            error: None,
        }
    }

    /// Back to the first step with nothing selected, ready for the next client.
    pub fn reset(&mut self, today: NaiveDate) {
        self.step = BookingStep::Services;
        self.chosen.clear();
        self.date = DateInputState::new(today).not_before(today);
        self.focus = DateTimeFocus::Date;
        self.slots.set_items(Vec::new());
        self.details = details_form();
        self.error = None;
    }

    pub fn set_slots(&mut self, slots: Vec<TimeSlot>) {
        self.slots.set_items(slots);
    }

    fn chosen_services(&self) -> impl Iterator<Item = &Service> {
        self.services
            .items()
            .iter()
            .filter(|s| self.chosen.contains(&s.id))
    }

    pub fn request(&self) -> Option<BookingRequest> {
        let slot = self.slots.selected()?;
        Some(BookingRequest {
            service_ids: self.chosen.iter().copied().collect(),
            date: self.date.date,
            time: slot.time.clone(),
            name: self.details.value("Name").to_string(),
            phone: self.details.value("Phone").to_string(),
            email: self.details.optional("Email"),
            instagram: self.details.optional("Instagram"),
            message: self.details.optional("Message"),
        })
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<BookingAction> {
        match self.step {
            BookingStep::Services => match key {
                KeyCode::Esc => return Some(BookingAction::Quit),
                KeyCode::Down => self.services.next(),
                KeyCode::Up => self.services.previous(),
                KeyCode::Char(' ') => {
                    if let Some(id) = self.services.selected().map(|s| s.id) {
                        if !self.chosen.remove(&id) {
                            self.chosen.insert(id);
                        }
                    }
                }
                KeyCode::Enter => {
                    if self.chosen.is_empty() {
                        self.error = Some("Select at least one service".to_string());
                    } else {
                        self.error = None;
                        self.step = BookingStep::DateTime;
                        return Some(BookingAction::LoadSlots(self.date.date));
                    }
                }
                _ => {}
            },
            BookingStep::DateTime => return self.handle_date_time_key(key),
            BookingStep::Details => match self.details.handle_key(key) {
                Some(FormEvent::Submit) => self.step = BookingStep::Confirm,
                Some(FormEvent::Cancel) => self.step = BookingStep::DateTime,
                None => {}
            },
            BookingStep::Confirm => match key {
                KeyCode::Esc => self.step = BookingStep::Details,
                KeyCode::Enter | KeyCode::Char('s') => return self.request().map(BookingAction::Submit),
                _ => {}
            },
        }
        None
    }

    fn handle_date_time_key(&mut self, key: KeyCode) -> Option<BookingAction> {
        if key == KeyCode::Tab {
            self.focus = match self.focus {
                DateTimeFocus::Date => DateTimeFocus::Slots,
                DateTimeFocus::Slots => DateTimeFocus::Date,
            };
            return None;
        }

        match self.focus {
            DateTimeFocus::Date => {
                let before = self.date.date;
                match key {
                    KeyCode::Esc if self.date.editing => self.date.toggle_editing(),
                    KeyCode::Esc => self.step = BookingStep::Services,
                    KeyCode::Enter if self.date.editing => self.date.toggle_editing(),
                    KeyCode::Enter => self.focus = DateTimeFocus::Slots,
                    KeyCode::Char('e') if !self.date.editing => self.date.toggle_editing(),
                    _ => self.date.handle_key(key),
                }
                if self.date.date != before {
                    return Some(BookingAction::LoadSlots(self.date.date));
                }
            }
            DateTimeFocus::Slots => match key {
                KeyCode::Esc => self.focus = DateTimeFocus::Date,
                KeyCode::Down => self.slots.next(),
                KeyCode::Up => self.slots.previous(),
                KeyCode::Enter => match self.slots.selected() {
                    Some(slot) if slot.booked => {
                        self.error = Some(format!("{} is already taken, pick another time", slot.time));
                    }
                    Some(_) => {
                        self.error = None;
                        self.step = BookingStep::Details;
                    }
                    None => self.error = Some("No times on this day".to_string()),
                },
                _ => {}
            },
        }
        None
    }
}

pub fn render_booking<B: Backend>(f: &mut Frame<B>, state: &mut BookingState, business_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new(format!("{} - Book an appointment", business_name))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    match state.step {
        BookingStep::Services => render_services(f, state, chunks[1]),
        BookingStep::DateTime => render_date_time(f, state, chunks[1]),
        BookingStep::Details => render_form(f, chunks[1], &state.details),
        BookingStep::Confirm => render_summary(f, state, chunks[1]),
    }

    let help = match (&state.error, state.step) {
        (Some(error), _) => error.as_str(),
        (None, BookingStep::Services) => "Up/Down - Move | Space - Select | Enter - Next | Esc - Quit",
        (None, BookingStep::DateTime) => {
            "Tab - Day/Times | Up/Down - Change | E - Type a date | Enter - Choose | Esc - Back"
        }
        (None, BookingStep::Details) => "Enter - Edit | Up/Down - Navigate | S - Next | Esc - Back",
        (None, BookingStep::Confirm) => "Enter - Book | Esc - Back",
    };
    render_help(f, chunks[2], help);
}

fn render_services<B: Backend>(f: &mut Frame<B>, state: &mut BookingState, area: Rect) {
    let items: Vec<ListItem> = state
        .services
        .items()
        .iter()
        .map(|s| {
            let mark = if state.chosen.contains(&s.id) { "[x]" } else { "[ ]" };
            ListItem::new(format!(
                "{} {:<30} {:>5} min {:>8}",
                mark,
                s.name,
                s.duration_minutes,
                money(s.price)
            ))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Choose your services").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, area, state.services.list_state());
}

fn render_date_time<B: Backend>(f: &mut Frame<B>, state: &mut BookingState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    let date_title = if state.focus == DateTimeFocus::Date { "Day *" } else { "Day" };
    render_date_input(f, chunks[0], date_title, &state.date);

    let items: Vec<ListItem> = state
        .slots
        .items()
        .iter()
        .map(|slot| {
            if slot.booked {
                ListItem::new(Spans::from(Span::styled(
                    format!("{}  taken", slot.time),
                    Style::default().fg(Color::DarkGray),
                )))
            } else {
                ListItem::new(slot.time.clone())
            }
        })
        .collect();

    let slots_title = if state.focus == DateTimeFocus::Slots { "Times *" } else { "Times" };
    let list = List::new(items)
        .block(Block::default().title(slots_title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, chunks[1], state.slots.list_state());
}

fn render_summary<B: Backend>(f: &mut Frame<B>, state: &BookingState, area: Rect) {
    let names: Vec<&str> = state.chosen_services().map(|s| s.name.as_str()).collect();
    let total: f64 = state.chosen_services().map(|s| s.price).sum();
    let time = state.slots.selected().map_or("", |s| s.time.as_str());

    let mut lines = vec![
        Spans::from(format!("Services: {}", names.join(", "))),
        Spans::from(format!("Total:    {}", money(total))),
        Spans::from(format!("When:     {} at {}", state.date.date.format("%A %d %B %Y"), time)),
        Spans::from(""),
        Spans::from(format!("Name:     {}", state.details.value("Name"))),
        Spans::from(format!("Phone:    {}", state.details.value("Phone"))),
    ];
    if let Some(message) = state.details.optional("Message") {
        lines.push(Spans::from(format!("Message:  {}", message)));
    }

    let summary = Paragraph::new(lines).block(Block::default().title("Confirm your booking").borders(Borders::ALL));
    f.render_widget(summary, area);
}

pub fn handle_input(state: &mut BookingState) -> Result<Option<BookingAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

/// Run the kiosk until a client presses Esc on the first step.
pub async fn run_booking(db: Database, config: &Config) -> Result<()> {
    let today = Local::now().date_naive();
    let active = services::list_active_services(db.as_ref()).await?;
    let mut state = BookingState::new(active, today);

    let mut terminal = setup_terminal()?;
    let result = booking_loop(&mut terminal, &mut state, &db, config).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn booking_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut BookingState,
    db: &Database,
    config: &Config,
) -> Result<()> {
    let mut popup: Option<Popup> = None;

    loop {
        terminal.draw(|f| {
            render_booking(f, state, &config.business_name);
            if let Some(popup) = &popup {
                render_popup(f, popup);
            }
        })?;

        if popup.is_some() {
            if let Event::Key(_) = event::read()? {
                popup = None;
            }
            continue;
        }

        match handle_input(state)? {
            Some(BookingAction::Quit) => return Ok(()),
            Some(BookingAction::LoadSlots(date)) => {
                match appointments::available_slots(db.as_ref(), config, date).await {
                    Ok(slots) => state.set_slots(slots),
                    Err(e) => popup = Some(Popup::error(e)),
                }
            }
            Some(BookingAction::Submit(request)) => {
                match appointments::create_appointment(db.as_ref(), request).await {
                    Ok(appointment) => {
                        popup = Some(Popup::info(
                            "Thank you",
                            format!(
                                "Your request for {} at {} is in. We will confirm it shortly.",
                                appointment.date.format("%d/%m/%Y"),
                                appointment.time
                            ),
                        ));
                        state.reset(Local::now().date_naive());
                    }
                    Err(e) => popup = Some(Popup::error(e)),
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceCategory;
    use chrono::Utc;

    fn service(id: i32, name: &str, price: f64) -> Service {
        Service {
            id,
            name: name.to_string(),
            category: ServiceCategory::Nails,
            price,
            duration_minutes: 30,
            description: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn slot(time: &str, booked: bool) -> TimeSlot {
        TimeSlot {
            time: time.to_string(),
            booked,
        }
    }

    fn type_text(state: &mut BookingState, text: &str) {
        state.handle_key(KeyCode::Enter);
        for c in text.chars() {
            state.handle_key(KeyCode::Char(c));
        }
        state.handle_key(KeyCode::Enter);
    }

    #[test]
    fn test_needs_a_service_before_moving_on() {
        let mut state = BookingState::new(vec![service(1, "Manicure", 20.0)], today());
        assert!(state.handle_key(KeyCode::Enter).is_none());
        assert!(state.error.is_some());

        state.handle_key(KeyCode::Char(' '));
        assert!(matches!(
            state.handle_key(KeyCode::Enter),
            Some(BookingAction::LoadSlots(d)) if d == today()
        ));
        assert_eq!(state.step, BookingStep::DateTime);
    }

    #[test]
    fn test_cannot_pick_a_past_day() {
        let mut state = BookingState::new(vec![service(1, "Manicure", 20.0)], today());
        state.step = BookingStep::DateTime;

        assert!(state.handle_key(KeyCode::Down).is_none());
        assert_eq!(state.date.date, today());
        assert!(matches!(
            state.handle_key(KeyCode::Up),
            Some(BookingAction::LoadSlots(d)) if d == NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        ));
    }

    #[test]
    fn test_taken_slot_is_refused() {
        let mut state = BookingState::new(vec![service(1, "Manicure", 20.0)], today());
        state.step = BookingStep::DateTime;
        state.set_slots(vec![slot("09:00", true), slot("09:30", false)]);

        state.handle_key(KeyCode::Tab);
        state.handle_key(KeyCode::Enter);
        assert_eq!(state.step, BookingStep::DateTime);
        assert!(state.error.is_some());

        state.handle_key(KeyCode::Down);
        state.handle_key(KeyCode::Enter);
        assert_eq!(state.step, BookingStep::Details);
    }

    #[test]
    fn test_full_booking_builds_request() {
        let mut state = BookingState::new(
            vec![service(1, "Manicure", 20.0), service(2, "Pedicure", 25.0)],
            today(),
        );
        state.handle_key(KeyCode::Down);
        state.handle_key(KeyCode::Char(' '));
        state.handle_key(KeyCode::Up);
        state.handle_key(KeyCode::Char(' '));
        state.handle_key(KeyCode::Enter);

        state.set_slots(vec![slot("10:00", false)]);
        state.handle_key(KeyCode::Tab);
        state.handle_key(KeyCode::Enter);

        type_text(&mut state, "Lina");
        state.handle_key(KeyCode::Down);
        type_text(&mut state, "0550 11 22 33");
        state.handle_key(KeyCode::Char('s'));
        assert_eq!(state.step, BookingStep::Confirm);

        match state.handle_key(KeyCode::Enter) {
            Some(BookingAction::Submit(request)) => {
                assert_eq!(request.service_ids, vec![1, 2]);
                assert_eq!(request.date, today());
                assert_eq!(request.time, "10:00");
                assert_eq!(request.name, "Lina");
                assert_eq!(request.phone, "0550 11 22 33");
                assert!(request.email.is_none());
            }
            _ => panic!("expected a booking request"),
        }

        state.reset(today());
        assert_eq!(state.step, BookingStep::Services);
        assert!(state.request().is_none());
    }
}
