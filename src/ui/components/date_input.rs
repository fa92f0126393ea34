use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// A date picker: Up/Down move a day at a time, digits overwrite the focused part.
pub struct DateInputState {
    pub date: NaiveDate,
    /// Dates before this are refused.
    pub earliest: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    typed: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            earliest: None,
            editing: false,
            date_part: DatePart::Year,
            typed: String::new(),
        }
    }

    pub fn not_before(mut self, earliest: NaiveDate) -> Self {
        self.earliest = Some(earliest);
        if self.date < earliest {
            self.date = earliest;
        }
        self
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
        }
        self.typed.clear();
    }

    fn set(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            if self.earliest.map_or(true, |earliest| date >= earliest) {
                self.date = date;
            }
        }
    }

    pub fn shift_days(&mut self, days: i64) {
        self.set(self.date.checked_add_signed(Duration::days(days)));
    }

    fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.typed.clear();
    }

    fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.typed.clear();
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.shift_days(1),
            KeyCode::Down => self.shift_days(-1),
            KeyCode::Right if self.editing => self.next_date_part(),
            KeyCode::Left if self.editing => self.previous_date_part(),
            KeyCode::Backspace if self.editing => {
                self.typed.pop();
            }
            KeyCode::Char(c) if self.editing && c.is_ascii_digit() => self.push_digit(c),
            _ => {}
        }
    }

    fn push_digit(&mut self, c: char) {
        self.typed.push(c);
        let width = if self.date_part == DatePart::Year { 4 } else { 2 };
        if self.typed.len() < width {
            return;
        }

        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        let candidate = match (self.date_part, self.typed.parse::<u32>()) {
            (DatePart::Year, Ok(y)) => i32::try_from(y)
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, month, day)),
            (DatePart::Month, Ok(m)) => NaiveDate::from_ymd_opt(year, m, day),
            (DatePart::Day, Ok(d)) => NaiveDate::from_ymd_opt(year, month, d),
            (_, Err(_)) => None,
        };
        self.set(candidate);
        self.typed.clear();
        if self.date_part != DatePart::Day {
            self.next_date_part();
        }
    }

    pub fn display(&self) -> String {
        let (year, month, day) = (
            format!("{:04}", self.date.year()),
            format!("{:02}", self.date.month()),
            format!("{:02}", self.date.day()),
        );
        if !self.editing {
            return format!("{year}-{month}-{day} ({})", self.date.format("%A"));
        }

        let cursor = if self.typed.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.typed)
        };
        match self.date_part {
            DatePart::Year => format!("{cursor}-{month}-{day}"),
            DatePart::Month => format!("{year}-{cursor}-{day}"),
            DatePart::Day => format!("{year}-{month}-{cursor}"),
        }
    }
}

pub fn render_date_input<B: Backend>(f: &mut Frame<B>, area: Rect, title: &str, state: &DateInputState) {
    let style = if state.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let widget = Paragraph::new(state.display())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_arrows_respect_earliest_date() {
        let mut input = DateInputState::new(date(2024, 1, 31)).not_before(date(2024, 1, 31));
        input.handle_key(KeyCode::Down);
        assert_eq!(input.date, date(2024, 1, 31));

        input.handle_key(KeyCode::Up);
        assert_eq!(input.date, date(2024, 2, 1));
    }

    #[test]
    fn test_typing_each_part() {
        let mut input = DateInputState::new(date(2024, 1, 15));
        input.toggle_editing();
        for c in "2025".chars().chain("03".chars()).chain("09".chars()) {
            input.handle_key(KeyCode::Char(c));
        }
        assert_eq!(input.date, date(2025, 3, 9));
    }

    #[test]
    fn test_invalid_day_is_ignored() {
        let mut input = DateInputState::new(date(2023, 2, 10));
        input.toggle_editing();
        input.date_part = DatePart::Day;
        input.handle_key(KeyCode::Char('3'));
        input.handle_key(KeyCode::Char('0'));
        assert_eq!(input.date, date(2023, 2, 10));
        assert_eq!(input.display(), "2023-02-[DD]");
    }
}
