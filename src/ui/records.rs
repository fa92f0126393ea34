//! The shared list screen behind clients, products, services, suppliers, recipes and
//! expenses.

use std::collections::HashMap;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row as TableRow, Table},
    Frame,
};

use crate::models::{
    BusinessExpense, Client, Product, ProductDetails, Service, ServiceRecipe, Supplier,
};

use super::components::SelectList;
use super::{body_and_footer, money, render_confirmation, render_help};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RecordKind {
    Clients,
    Products,
    Services,
    Recipes,
    Suppliers,
    Expenses,
}

impl RecordKind {
    fn title(&self) -> &'static str {
        match self {
            RecordKind::Clients => "Clients",
            RecordKind::Products => "Products",
            RecordKind::Services => "Services",
            RecordKind::Recipes => "Service recipes",
            RecordKind::Suppliers => "Suppliers",
            RecordKind::Expenses => "Expenses",
        }
    }

    fn headers(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Clients => &["Name", "Phone", "Email", "Instagram"],
            RecordKind::Products => &["Name", "Stock", "Buy price", "Supplier"],
            RecordKind::Services => &["Name", "Category", "Price", "Minutes", "Active"],
            RecordKind::Recipes => &["Service", "Product", "Quantity"],
            RecordKind::Suppliers => &["Name", "Phone", "Email"],
            RecordKind::Expenses => &["Date", "Category", "Amount", "Description"],
        }
    }

    fn help(&self) -> &'static str {
        match self {
            RecordKind::Clients => {
                "<N> New | <E> Edit | <D> Delete | <Enter> History | </> Search | <Esc> Back"
            }
            RecordKind::Products => "<N> New | <E> Edit | <D> Delete | <L> Low stock only | <Esc> Back",
            RecordKind::Services => "<N> New | <E> Edit | <D> Delete | <A> Toggle active | <Esc> Back",
            RecordKind::Recipes => "<N> New line | <D> Delete line | <Esc> Back",
            RecordKind::Suppliers | RecordKind::Expenses => "<N> New | <E> Edit | <D> Delete | <Esc> Back",
        }
    }

    fn editable(&self) -> bool {
        *self != RecordKind::Recipes
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub id: i32,
    pub cells: Vec<String>,
    pub highlight: bool,
}

impl Row {
    fn new(id: i32, cells: Vec<String>) -> Self {
        Self {
            id,
            cells,
            highlight: false,
        }
    }
}

pub fn client_rows(clients: &[Client]) -> Vec<Row> {
    clients
        .iter()
        .map(|c| {
            Row::new(
                c.id,
                vec![
                    c.name.clone(),
                    c.phone.clone(),
                    c.email.clone().unwrap_or_default(),
                    c.instagram.clone().unwrap_or_default(),
                ],
            )
        })
        .collect()
}

/// Products at or below `low_stock_threshold` are drawn in red.
pub fn product_rows(products: &[ProductDetails], low_stock_threshold: i32) -> Vec<Row> {
    products
        .iter()
        .map(|p| Row {
            highlight: p.product.stock_quantity <= low_stock_threshold,
            ..Row::new(
                p.product.id,
                vec![
                    p.product.name.clone(),
                    p.product.stock_quantity.to_string(),
                    money(p.product.buy_price),
                    p.supplier_name.clone().unwrap_or_default(),
                ],
            )
        })
        .collect()
}

pub fn service_rows(services: &[Service]) -> Vec<Row> {
    services
        .iter()
        .map(|s| Row {
            highlight: !s.active,
            ..Row::new(
                s.id,
                vec![
                    s.name.clone(),
                    s.category.to_string(),
                    money(s.price),
                    s.duration_minutes.to_string(),
                    if s.active { "yes" } else { "no" }.to_string(),
                ],
            )
        })
        .collect()
}

pub fn recipe_rows(recipes: &[ServiceRecipe], services: &[Service], products: &[Product]) -> Vec<Row> {
    let service_names: HashMap<i32, &str> = services.iter().map(|s| (s.id, s.name.as_str())).collect();
    let product_names: HashMap<i32, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();

    recipes
        .iter()
        .map(|r| {
            let service = service_names
                .get(&r.service_id)
                .map_or_else(|| format!("#{}", r.service_id), |name| name.to_string());
            let product = product_names
                .get(&r.product_id)
                .map_or_else(|| format!("#{}", r.product_id), |name| name.to_string());
            Row::new(r.id, vec![service, product, r.quantity.to_string()])
        })
        .collect()
}

pub fn supplier_rows(suppliers: &[Supplier]) -> Vec<Row> {
    suppliers
        .iter()
        .map(|s| {
            Row::new(
                s.id,
                vec![
                    s.name.clone(),
                    s.phone.clone().unwrap_or_default(),
                    s.email.clone().unwrap_or_default(),
                ],
            )
        })
        .collect()
}

pub fn expense_rows(expenses: &[BusinessExpense]) -> Vec<Row> {
    expenses
        .iter()
        .map(|e| {
            Row::new(
                e.id,
                vec![
                    e.date.format("%Y-%m-%d").to_string(),
                    e.category.to_string(),
                    money(e.amount),
                    e.description.clone(),
                ],
            )
        })
        .collect()
}

pub enum RecordAction {
    Back,
    New,
    Edit(i32),
    Delete(i32),
    Open(i32),
    ToggleActive(i32),
    ToggleLowStock,
    Search(String),
}

pub struct RecordsState {
    pub kind: RecordKind,
    rows: SelectList<Row>,
    show_delete_confirmation: bool,
    searching: bool,
    pub query: String,
    pub low_stock_only: bool,
}

impl RecordsState {
    pub fn new(kind: RecordKind, rows: Vec<Row>) -> Self {
        Self {
            kind,
            rows: SelectList::new(rows),
            show_delete_confirmation: false,
            searching: false,
            query: String::new(),
            low_stock_only: false,
        }
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows.set_items(rows);
    }

    pub fn selected_id(&self) -> Option<i32> {
        self.rows.selected().map(|r| r.id)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<RecordAction> {
        if self.searching {
            match key {
                KeyCode::Enter => {
                    self.searching = false;
                    return Some(RecordAction::Search(self.query.clone()));
                }
                KeyCode::Esc => {
                    self.searching = false;
                    self.query.clear();
                    return Some(RecordAction::Search(String::new()));
                }
                KeyCode::Char(c) => self.query.push(c),
                KeyCode::Backspace => {
                    self.query.pop();
                }
                _ => {}
            }
            return None;
        }

        if self.show_delete_confirmation {
            match key {
                KeyCode::Char('y') => {
                    self.show_delete_confirmation = false;
                    return self.selected_id().map(RecordAction::Delete);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.show_delete_confirmation = false,
                _ => {}
            }
            return None;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Some(RecordAction::Back),
            KeyCode::Down => self.rows.next(),
            KeyCode::Up => self.rows.previous(),
            KeyCode::Char('n') => return Some(RecordAction::New),
            KeyCode::Char('e') if self.kind.editable() => {
                return self.selected_id().map(RecordAction::Edit);
            }
            KeyCode::Char('d') if self.selected_id().is_some() => {
                self.show_delete_confirmation = true;
            }
            KeyCode::Enter if self.kind == RecordKind::Clients => {
                return self.selected_id().map(RecordAction::Open);
            }
            KeyCode::Char('/') if self.kind == RecordKind::Clients => self.searching = true,
            KeyCode::Char('a') if self.kind == RecordKind::Services => {
                return self.selected_id().map(RecordAction::ToggleActive);
            }
            KeyCode::Char('l') if self.kind == RecordKind::Products => {
                self.low_stock_only = !self.low_stock_only;
                return Some(RecordAction::ToggleLowStock);
            }
            _ => {}
        }
        None
    }
}

pub fn render_records<B: Backend>(f: &mut Frame<B>, state: &mut RecordsState) {
    let (body, footer) = body_and_footer(f.size());
    let headers = state.kind.headers();

    let header = TableRow::new(headers.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows: Vec<TableRow> = state
        .rows
        .items()
        .iter()
        .map(|row| {
            let style = if row.highlight {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            TableRow::new(row.cells.iter().map(|c| Cell::from(c.as_str()))).style(style)
        })
        .collect();

    let share = 100 / headers.len() as u16;
    let widths: Vec<Constraint> = headers.iter().map(|_| Constraint::Percentage(share)).collect();

    let mut title = state.kind.title().to_string();
    if state.searching || !state.query.is_empty() {
        title.push_str(&format!(" - search: {}{}", state.query, if state.searching { "|" } else { "" }));
    }
    if state.low_stock_only {
        title.push_str(" - low stock");
    }

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

    let mut table_state = state.rows.table_state();
    f.render_stateful_widget(table, body, &mut table_state);

    render_help(f, footer, state.kind.help());

    if state.show_delete_confirmation {
        render_confirmation(
            f,
            &format!("Delete this {} record?", state.kind.title().to_lowercase()),
            "Records that point to it are kept as they are.",
        );
    }
}

pub fn handle_input(state: &mut RecordsState) -> Result<Option<RecordAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new(4, vec!["Amel".to_string()]),
            Row::new(9, vec!["Dounia".to_string()]),
        ]
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut state = RecordsState::new(RecordKind::Suppliers, rows());
        state.handle_key(KeyCode::Down);

        assert!(state.handle_key(KeyCode::Char('d')).is_none());
        assert!(matches!(state.handle_key(KeyCode::Char('y')), Some(RecordAction::Delete(9))));

        state.handle_key(KeyCode::Char('d'));
        assert!(state.handle_key(KeyCode::Char('n')).is_none());
        assert!(matches!(state.handle_key(KeyCode::Esc), Some(RecordAction::Back)));
    }

    #[test]
    fn test_client_search_collects_query() {
        let mut state = RecordsState::new(RecordKind::Clients, rows());
        state.handle_key(KeyCode::Char('/'));
        for c in "dou".chars() {
            assert!(state.handle_key(KeyCode::Char(c)).is_none());
        }
        match state.handle_key(KeyCode::Enter) {
            Some(RecordAction::Search(query)) => assert_eq!(query, "dou"),
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_recipes_cannot_be_edited() {
        let mut state = RecordsState::new(RecordKind::Recipes, rows());
        assert!(state.handle_key(KeyCode::Char('e')).is_none());
    }
}
