use std::str::FromStr;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    /// Cycled with Enter or Left/Right; never typed into.
    Choice(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    pub fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Text,
            required: false,
        }
    }

    /// `value` is used when it is one of `options`, otherwise the first option is picked.
    pub fn choice(label: &'static str, options: Vec<String>, value: &str) -> Self {
        let value = if options.iter().any(|o| o == value) {
            value.to_string()
        } else {
            options.first().cloned().unwrap_or_default()
        };
        Self {
            label,
            value,
            kind: FieldKind::Choice(options),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(options) = &self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let current = options.iter().position(|o| *o == self.value).unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        self.value = options[next].clone();
    }
}

pub enum FormEvent {
    Submit,
    Cancel,
}

/// Vertical list of labelled fields, navigated with Up/Down and edited in place.
pub struct FormState {
    pub title: String,
    pub fields: Vec<FormField>,
    pub current: usize,
    pub editing: bool,
    pub error: Option<String>,
}

impl FormState {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            fields,
            current: 0,
            editing: false,
            error: None,
        }
    }

    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map_or("", |f| f.value.trim())
    }

    /// The field's text, or `None` when it is blank.
    pub fn optional(&self, label: &str) -> Option<String> {
        let value = self.value(label);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn parse<T: FromStr>(&self, label: &str) -> Result<T, String> {
        let value = self.value(label);
        value
            .parse()
            .map_err(|_| format!("{label}: '{value}' is not valid"))
    }

    fn missing_required(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|f| f.required && f.value.trim().is_empty())
            .map(|f| f.label)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.current = (self.current + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.current = (self.current + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<FormEvent> {
        if self.editing {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                KeyCode::Char(c) => {
                    if let Some(field) = self.fields.get_mut(self.current) {
                        field.value.push(c);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(field) = self.fields.get_mut(self.current) {
                        field.value.pop();
                    }
                }
                _ => {}
            }
            return None;
        }

        match key {
            KeyCode::Esc => return Some(FormEvent::Cancel),
            KeyCode::Up => self.previous_field(),
            KeyCode::Down | KeyCode::Tab => self.next_field(),
            KeyCode::Left | KeyCode::Right | KeyCode::Enter => {
                let forward = key != KeyCode::Left;
                if let Some(field) = self.fields.get_mut(self.current) {
                    match field.kind {
                        FieldKind::Choice(_) => field.cycle(forward),
                        FieldKind::Text if key == KeyCode::Enter => {
                            self.editing = true;
                            self.error = None;
                        }
                        FieldKind::Text => {}
                    }
                }
            }
            KeyCode::Char('s') => match self.missing_required() {
                Some(label) => self.error = Some(format!("{label} is required")),
                None => {
                    self.error = None;
                    return Some(FormEvent::Submit);
                }
            },
            _ => {}
        }
        None
    }
}

pub fn render_form<B: Backend>(f: &mut Frame<B>, area: Rect, form: &FormState) {
    let items: Vec<ListItem> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == form.current;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let marker = if field.required { "*" } else { "" };

            let value = match (&field.kind, selected && form.editing) {
                (_, true) => Span::styled(
                    format!("{}|", field.value),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                (FieldKind::Choice(_), false) => Span::styled(
                    format!("< {} >", field.value),
                    Style::default().fg(Color::Cyan),
                ),
                (FieldKind::Text, false) => Span::raw(field.value.as_str()),
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}{}: ", field.label, marker), label_style),
                value,
            ]))
        })
        .collect();

    let title = match &form.error {
        Some(error) => format!("{} - {}", form.title, error),
        None => form.title.clone(),
    };
    let border_style = if form.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormState {
        FormState::new(
            "Client",
            vec![
                FormField::text("Name", "").required(),
                FormField::choice(
                    "Method",
                    vec!["cash".to_string(), "card".to_string()],
                    "card",
                ),
                FormField::text("Notes", ""),
            ],
        )
    }

    fn type_text(form: &mut FormState, text: &str) {
        form.handle_key(KeyCode::Enter);
        for c in text.chars() {
            form.handle_key(KeyCode::Char(c));
        }
        form.handle_key(KeyCode::Enter);
    }

    #[test]
    fn test_submit_requires_required_fields() {
        let mut form = form();
        assert!(form.handle_key(KeyCode::Char('s')).is_none());
        assert_eq!(form.error.as_deref(), Some("Name is required"));

        type_text(&mut form, "Imane");
        assert!(matches!(form.handle_key(KeyCode::Char('s')), Some(FormEvent::Submit)));
        assert_eq!(form.value("Name"), "Imane");
        assert_eq!(form.optional("Notes"), None);
    }

    #[test]
    fn test_choice_cycles_instead_of_editing() {
        let mut form = form();
        form.handle_key(KeyCode::Down);
        assert_eq!(form.value("Method"), "card");

        form.handle_key(KeyCode::Enter);
        assert!(!form.editing);
        assert_eq!(form.value("Method"), "cash");

        form.handle_key(KeyCode::Left);
        assert_eq!(form.value("Method"), "card");
    }

    #[test]
    fn test_typing_s_while_editing_is_text() {
        let mut form = form();
        type_text(&mut form, "ss");
        assert_eq!(form.value("Name"), "ss");
        assert!(matches!(form.handle_key(KeyCode::Esc), Some(FormEvent::Cancel)));
    }

    #[test]
    fn test_parse_reports_label() {
        let mut form = FormState::new("Product", vec![FormField::text("Stock", "12x")]);
        assert_eq!(
            form.parse::<i32>("Stock").unwrap_err(),
            "Stock: '12x' is not valid"
        );
        form.fields[0].value = " 12 ".to_string();
        assert_eq!(form.parse::<i32>("Stock").unwrap(), 12);
    }
}
