use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::centered_rect;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LoginField {
    Username,
    Password,
}

pub struct LoginState {
    pub username: String,
    pub password: String,
    pub field: LoginField,
    pub error: Option<String>,
}

pub enum LoginAction {
    Submit { username: String, password: String },
    Quit,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            field: LoginField::Username,
            error: None,
        }
    }

    /// Clears the password and shows why the last attempt failed.
    pub fn rejected(&mut self, reason: &str) {
        self.password.clear();
        self.field = LoginField::Password;
        self.error = Some(reason.to_string());
    }

    fn current_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<LoginAction> {
        match key {
            KeyCode::Esc => return Some(LoginAction::Quit),
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                self.field = match self.field {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            KeyCode::Enter => {
                if self.field == LoginField::Username {
                    self.field = LoginField::Password;
                } else {
                    return Some(LoginAction::Submit {
                        username: self.username.clone(),
                        password: self.password.clone(),
                    });
                }
            }
            KeyCode::Char(c) => {
                self.error = None;
                self.current_mut().push(c);
            }
            KeyCode::Backspace => {
                self.current_mut().pop();
            }
            _ => {}
        }
        None
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_login<B: Backend>(f: &mut Frame<B>, state: &LoginState) {
    let area = centered_rect(50, 50, f.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new("Salon Manager - Admin")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let field_style = |field: LoginField| {
        if state.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let username = Paragraph::new(state.username.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Username")
            .border_style(field_style(LoginField::Username)),
    );
    f.render_widget(username, chunks[1]);

    let masked = "*".repeat(state.password.chars().count());
    let password = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Password")
            .border_style(field_style(LoginField::Password)),
    );
    f.render_widget(password, chunks[2]);

    let mut lines = vec![Spans::from("Enter - Next / Log in | Tab - Switch field | Esc - Quit")];
    if let Some(error) = &state.error {
        lines.push(Spans::from(""));
        lines.push(Spans::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }
    f.render_widget(Paragraph::new(lines), chunks[3]);
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_moves_to_password_then_submits() {
        let mut state = LoginState::new();
        for c in "admin".chars() {
            state.handle_key(KeyCode::Char(c));
        }
        assert!(state.handle_key(KeyCode::Enter).is_none());
        state.handle_key(KeyCode::Char('x'));

        match state.handle_key(KeyCode::Enter) {
            Some(LoginAction::Submit { username, password }) => {
                assert_eq!(username, "admin");
                assert_eq!(password, "x");
            }
            _ => panic!("expected submit"),
        }

        state.rejected("Invalid username or password");
        assert!(state.password.is_empty());
        assert_eq!(state.username, "admin");
    }
}
