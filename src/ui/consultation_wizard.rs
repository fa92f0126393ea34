//! Four steps to close out an appointment: products used, payment, follow-up, review.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{
    AppointmentDetails, CompleteAppointment, PaymentMethod, Product, ProductLine,
};

use super::components::{FormEvent, FormField, FormState, SelectList, render_form};
use super::{money, render_help};

const FOLLOW_UP_WEEKS: i64 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WizardStep {
    Products,
    Payment,
    FollowUp,
    Review,
}

impl WizardStep {
    fn number(&self) -> usize {
        match self {
            WizardStep::Products => 1,
            WizardStep::Payment => 2,
            WizardStep::FollowUp => 3,
            WizardStep::Review => 4,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            WizardStep::Products => "Products used",
            WizardStep::Payment => "Payment",
            WizardStep::FollowUp => "Next appointment",
            WizardStep::Review => "Review",
        }
    }
}

pub struct ProductUse {
    pub product: Product,
    pub quantity: i32,
}

pub enum WizardAction {
    Cancel,
    Submit(CompleteAppointment),
}

pub struct ConsultationWizardState {
    pub appointment: AppointmentDetails,
    pub step: WizardStep,
    products: SelectList<ProductUse>,
    payment: FormState,
    follow_up: FormState,
    pub error: Option<String>,
}

impl ConsultationWizardState {
    /// `suggested` pre-fills the quantities, usually from the services' recipes.
    pub fn new(
        appointment: AppointmentDetails,
        catalog: Vec<Product>,
        suggested: &[ProductLine],
        today: NaiveDate,
    ) -> Self {
        let products = catalog
            .into_iter()
            .map(|product| {
                let quantity = suggested
                    .iter()
                    .filter(|line| line.product_id == product.id)
                    .map(|line| line.quantity)
                    .sum();
                ProductUse { product, quantity }
            })
            .collect();

        let payment = FormState::new(
            "Payment",
            vec![
                FormField::text("Amount", appointment.total_price().to_string()).required(),
                FormField::choice(
                    "Payment method",
                    PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
                    PaymentMethod::Cash.as_str(),
                ),
                FormField::text("Notes", appointment.appointment.notes.clone().unwrap_or_default()),
            ],
        );

        let next_date = today + Duration::weeks(FOLLOW_UP_WEEKS);
        let follow_up = FormState::new(
            "Next appointment",
            vec![
                FormField::choice("Book follow-up", vec!["no".to_string(), "yes".to_string()], "no"),
                FormField::text("Date", next_date.format("%Y-%m-%d").to_string()),
                FormField::text("Time", appointment.appointment.time.clone()),
            ],
        );

        Self {
            appointment,
            step: WizardStep::Products,
            products: SelectList::new(products),
            payment,
            follow_up,
            error: None,
        }
    }

    fn lines(&self) -> Vec<ProductLine> {
        self.products
            .items()
            .iter()
            .filter(|p| p.quantity > 0)
            .map(|p| ProductLine {
                product_id: p.product.id,
                quantity: p.quantity,
            })
            .collect()
    }

    /// The completion request the wizard currently describes.
    pub fn to_input(&self) -> Result<CompleteAppointment, String> {
        let next_date = self.next_date()?;
        let next_time = next_date.and_then(|_| self.follow_up.optional("Time"));

        Ok(CompleteAppointment {
            appointment_id: self.appointment.appointment.id,
            products: self.lines(),
            amount: self.payment.parse("Amount")?,
            payment_method: self.payment.parse("Payment method")?,
            next_date,
            next_time,
            next_service_ids: None,
            service_ids: None,
            notes: self.payment.optional("Notes"),
        })
    }

    fn next_date(&self) -> Result<Option<NaiveDate>, String> {
        if self.follow_up.value("Book follow-up") != "yes" {
            return Ok(None);
        }
        NaiveDate::parse_from_str(self.follow_up.value("Date"), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| "Next date: use YYYY-MM-DD".to_string())
    }

    /// Checks only what the current step asks for.
    fn check_step(&self) -> Result<(), String> {
        match self.step {
            WizardStep::Payment => {
                self.payment.parse::<f64>("Amount")?;
                self.payment.parse::<PaymentMethod>("Payment method")?;
            }
            WizardStep::FollowUp => {
                self.next_date()?;
            }
            WizardStep::Products | WizardStep::Review => {}
        }
        Ok(())
    }

    fn advance(&mut self, step: WizardStep) {
        match self.check_step() {
            Ok(()) => {
                self.error = None;
                self.step = step;
            }
            Err(e) => self.error = Some(e),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<WizardAction> {
        match self.step {
            WizardStep::Products => match key {
                KeyCode::Esc => return Some(WizardAction::Cancel),
                KeyCode::Down => self.products.next(),
                KeyCode::Up => self.products.previous(),
                KeyCode::Right | KeyCode::Char('+') => {
                    if let Some(p) = self.products.selected_mut() {
                        p.quantity += 1;
                    }
                }
                KeyCode::Left | KeyCode::Char('-') => {
                    if let Some(p) = self.products.selected_mut() {
                        p.quantity = (p.quantity - 1).max(0);
                    }
                }
                KeyCode::Enter | KeyCode::Tab => self.step = WizardStep::Payment,
                _ => {}
            },
            WizardStep::Payment => match self.payment.handle_key(key) {
                Some(FormEvent::Submit) => self.advance(WizardStep::FollowUp),
                Some(FormEvent::Cancel) => self.step = WizardStep::Products,
                None => {}
            },
            WizardStep::FollowUp => match self.follow_up.handle_key(key) {
                Some(FormEvent::Submit) => self.advance(WizardStep::Review),
                Some(FormEvent::Cancel) => self.step = WizardStep::Payment,
                None => {}
            },
            WizardStep::Review => match key {
                KeyCode::Esc => self.step = WizardStep::FollowUp,
                KeyCode::Enter | KeyCode::Char('s') => match self.to_input() {
                    Ok(input) => return Some(WizardAction::Submit(input)),
                    Err(e) => self.error = Some(e),
                },
                _ => {}
            },
        }
        None
    }
}

pub fn render_consultation_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ConsultationWizardState) {
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

    let header = format!(
        "Step {}/4 - {} | {} on {} at {}",
        state.step.number(),
        state.step.title(),
        state.appointment.client_name(),
        state.appointment.appointment.date.format("%d/%m/%Y"),
        state.appointment.appointment.time,
    );
    let title = Paragraph::new(header)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    match state.step {
        WizardStep::Products => render_products(f, state, chunks[1]),
        WizardStep::Payment => render_form(f, chunks[1], &state.payment),
        WizardStep::FollowUp => render_form(f, chunks[1], &state.follow_up),
        WizardStep::Review => render_review(f, state, chunks[1]),
    }

    let help = match (&state.error, state.step) {
        (Some(error), _) => error.as_str(),
        (None, WizardStep::Products) => "Up/Down - Select | +/- - Quantity | Enter - Next | Esc - Cancel",
        (None, WizardStep::Payment | WizardStep::FollowUp) => {
            "Enter - Edit/Cycle | Up/Down - Navigate | S - Next step | Esc - Previous step"
        }
        (None, WizardStep::Review) => "Enter - Complete appointment | Esc - Previous step",
    };
    render_help(f, chunks[2], help);
}

fn render_products<B: Backend>(f: &mut Frame<B>, state: &mut ConsultationWizardState, area: Rect) {
    let items: Vec<ListItem> = state
        .products
        .items()
        .iter()
        .map(|p| {
            let used = if p.quantity > 0 {
                Span::styled(
                    format!(" x{}", p.quantity),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw("")
            };
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:<30} stock {:>4}", p.product.name, p.product.stock_quantity)),
                used,
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Products used").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_stateful_widget(list, area, state.products.list_state());
}

fn render_review<B: Backend>(f: &mut Frame<B>, state: &ConsultationWizardState, area: Rect) {
    let mut lines = vec![
        Spans::from(format!("Client:   {}", state.appointment.client_name())),
        Spans::from(format!("Services: {}", state.appointment.service_names())),
        Spans::from(""),
    ];

    for p in state.products.items().iter().filter(|p| p.quantity > 0) {
        let remaining = p.product.stock_quantity - p.quantity;
        let style = if remaining < 0 {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        lines.push(Spans::from(Span::styled(
            format!("  {} x{} (stock after: {})", p.product.name, p.quantity, remaining),
            style,
        )));
    }
    lines.push(Spans::from(""));

    match state.to_input() {
        Ok(input) => {
            lines.push(Spans::from(format!(
                "Paid:     {} by {}",
                money(input.amount),
                input.payment_method
            )));
            if let Some(notes) = &input.notes {
                lines.push(Spans::from(format!("Notes:    {}", notes)));
            }
            let next = match (input.next_date, &input.next_time) {
                (Some(date), Some(time)) => format!("{} at {}", date.format("%d/%m/%Y"), time),
                _ => "none".to_string(),
            };
            lines.push(Spans::from(format!("Next:     {}", next)));
        }
        Err(e) => lines.push(Spans::from(Span::styled(e, Style::default().fg(Color::Red)))),
    }

    let review = Paragraph::new(lines).block(Block::default().title("Review").borders(Borders::ALL));
    f.render_widget(review, area);
}

pub fn handle_input(state: &mut ConsultationWizardState) -> Result<Option<WizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, AppointmentStatus, Service, ServiceCategory};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
    }

    fn product(id: i32, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            stock_quantity: 1,
            buy_price: 2.0,
            supplier_id: None,
            created_at: Utc::now(),
        }
    }

    fn wizard() -> ConsultationWizardState {
        let appointment = AppointmentDetails {
            appointment: Appointment {
                id: 3,
                client_id: 8,
                service_ids: vec![1],
                date: today(),
                time: "11:30".to_string(),
                status: AppointmentStatus::Confirmed,
                notes: None,
                message: None,
                created_at: Utc::now(),
            },
            client: None,
            services: vec![Service {
                id: 1,
                name: "Facial".to_string(),
                category: ServiceCategory::Face,
                price: 55.0,
                duration_minutes: 45,
                description: None,
                active: true,
                created_at: Utc::now(),
            }],
        };
        ConsultationWizardState::new(
            appointment,
            vec![product(10, "Cleanser"), product(11, "Toner")],
            &[ProductLine { product_id: 11, quantity: 2 }],
            today(),
        )
    }

    #[test]
    fn test_defaults_come_from_appointment_and_recipes() {
        let state = wizard();
        let input = state.to_input().unwrap();

        assert_eq!(input.appointment_id, 3);
        assert_eq!(input.amount, 55.0);
        assert_eq!(input.payment_method, PaymentMethod::Cash);
        assert_eq!(input.products, vec![ProductLine { product_id: 11, quantity: 2 }]);
        assert!(input.next_date.is_none());
    }

    #[test]
    fn test_walk_through_all_steps() {
        let mut state = wizard();

        state.handle_key(KeyCode::Char('+'));
        state.handle_key(KeyCode::Enter);
        assert_eq!(state.step, WizardStep::Payment);

        state.handle_key(KeyCode::Down);
        state.handle_key(KeyCode::Enter);
        state.handle_key(KeyCode::Char('s'));
        assert_eq!(state.step, WizardStep::FollowUp);

        state.handle_key(KeyCode::Enter);
        state.handle_key(KeyCode::Char('s'));
        assert_eq!(state.step, WizardStep::Review);

        match state.handle_key(KeyCode::Enter) {
            Some(WizardAction::Submit(input)) => {
                assert_eq!(input.payment_method, PaymentMethod::Card);
                assert_eq!(input.products.len(), 2);
                assert_eq!(input.next_date, NaiveDate::from_ymd_opt(2024, 10, 29));
                assert_eq!(input.next_time.as_deref(), Some("11:30"));
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_bad_amount_blocks_payment_step() {
        let mut state = wizard();
        state.step = WizardStep::Payment;
        state.payment.fields[0].value = "lots".to_string();

        state.handle_key(KeyCode::Char('s'));
        assert_eq!(state.step, WizardStep::Payment);
        assert!(state.error.is_some());
    }
}
