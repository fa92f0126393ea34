use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::models::ConsultationDetails;

use super::components::SelectList;
use super::{body_and_footer, money, render_confirmation, render_help};

pub struct ReceiptsState {
    list: SelectList<ConsultationDetails>,
    show_delete_confirmation: bool,
}

pub enum ReceiptAction {
    Back,
    Generate(i32),
    Email(i32),
    Delete(i32),
}

impl ReceiptsState {
    pub fn new(consultations: Vec<ConsultationDetails>) -> Self {
        Self {
            list: SelectList::new(consultations),
            show_delete_confirmation: false,
        }
    }

    pub fn set_consultations(&mut self, consultations: Vec<ConsultationDetails>) {
        self.list.set_items(consultations);
    }

    fn selected_id(&self) -> Option<i32> {
        self.list.selected().map(|c| c.consultation.id)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<ReceiptAction> {
        if self.show_delete_confirmation {
            match key {
                KeyCode::Char('y') => {
                    self.show_delete_confirmation = false;
                    return self.selected_id().map(ReceiptAction::Delete);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.show_delete_confirmation = false,
                _ => {}
            }
            return None;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Some(ReceiptAction::Back),
            KeyCode::Down => self.list.next(),
            KeyCode::Up => self.list.previous(),
            KeyCode::Char('g') | KeyCode::Enter => return self.selected_id().map(ReceiptAction::Generate),
            KeyCode::Char('m') => return self.selected_id().map(ReceiptAction::Email),
            KeyCode::Char('d') if self.selected_id().is_some() => self.show_delete_confirmation = true,
            _ => {}
        }
        None
    }
}

pub fn render_receipts<B: Backend>(f: &mut Frame<B>, state: &mut ReceiptsState) {
    let (body, footer) = body_and_footer(f.size());

    let header = Row::new(["#", "Date", "Client", "Amount", "Method", "Products"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .list
        .items()
        .iter()
        .map(|c| {
            let client = c
                .client
                .as_ref()
                .map_or("(deleted client)", |client| client.name.as_str());
            Row::new(vec![
                Cell::from(c.consultation.id.to_string()),
                Cell::from(c.consultation.date.format("%d/%m/%Y").to_string()),
                Cell::from(client.to_string()),
                Cell::from(money(c.consultation.amount)),
                Cell::from(c.consultation.payment_method.as_str()),
                Cell::from(c.consultation.products.len().to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Percentage(35),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Receipts").borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    let mut table_state = state.list.table_state();
    f.render_stateful_widget(table, body, &mut table_state);

    render_help(f, footer, "<G> Generate file | <M> Email to client | <D> Delete | <Esc> Back");

    if state.show_delete_confirmation {
        render_confirmation(
            f,
            "Delete this receipt?",
            "Stock used by it is not given back.",
        );
    }
}

pub fn handle_input(state: &mut ReceiptsState) -> Result<Option<ReceiptAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Consultation, PaymentMethod};
    use chrono::{NaiveDate, Utc};

    fn details(id: i32) -> ConsultationDetails {
        ConsultationDetails {
            consultation: Consultation {
                id,
                appointment_id: 1,
                client_id: 1,
                products: vec![],
                amount: 40.0,
                payment_method: PaymentMethod::Card,
                date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
                notes: None,
                created_at: Utc::now(),
            },
            client: None,
            appointment: None,
        }
    }

    #[test]
    fn test_actions_target_selected_receipt() {
        let mut state = ReceiptsState::new(vec![details(3), details(8)]);
        state.handle_key(KeyCode::Down);

        assert!(matches!(state.handle_key(KeyCode::Char('g')), Some(ReceiptAction::Generate(8))));
        assert!(matches!(state.handle_key(KeyCode::Char('m')), Some(ReceiptAction::Email(8))));

        assert!(state.handle_key(KeyCode::Char('d')).is_none());
        assert!(matches!(state.handle_key(KeyCode::Char('y')), Some(ReceiptAction::Delete(8))));
    }

    #[test]
    fn test_empty_list_has_nothing_to_act_on() {
        let mut state = ReceiptsState::new(vec![]);
        assert!(state.handle_key(KeyCode::Char('g')).is_none());
        assert!(state.handle_key(KeyCode::Char('d')).is_none());
        assert!(matches!(state.handle_key(KeyCode::Esc), Some(ReceiptAction::Back)));
    }
}
