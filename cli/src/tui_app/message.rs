use std::time::Duration;

use anyhow::{Context as _, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tui_app::{Choice, Menu, MenuAction, State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Message {
    OpenMenu(Menu),
    DecrementItem,
    IncrementItem,
    Choose(MenuAction),
    Picked(Choice),
    /// Answer to a yes/no question
    Confirm(bool),
    /// Leave the current view for its parent menu
    Back,
    CommitForm,
    /// Insert a character at cursor position
    InsertChar(char),
    /// Delete character before cursor
    Backspace,
    /// Delete character at cursor
    Delete,
    CursorLeft,
    CursorRight,
    NextField,
    PrevField,
    Quit,
}

impl Message {
    pub(crate) fn from_event(state: &State) -> Result<Option<Message>> {
        // some states automatically transition
        if let Some(message) = Self::automatic_state_transitions(state) {
            return Ok(Some(message));
        }

        // otherwise, wait a bit for a key event
        if !event::poll(Duration::from_millis(100)).context("polling for event")? {
            return Ok(None);
        }
        let Event::Key(key_event) = event::read().context("reading event")? else {
            return Ok(None);
        };

        Ok(Self::from_key(state, key_event))
    }

    /// Map a key press to a message according to the current state
    pub(crate) fn from_key(state: &State, key_event: KeyEvent) -> Option<Message> {
        if key_event.kind != KeyEventKind::Press {
            return None;
        }

        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            return Some(Message::Quit);
        }

        if let Some(message) = Self::stateful_keys(state, key_event) {
            return Some(message);
        }

        matches!(key_event.code, KeyCode::Esc | KeyCode::Char('q')).then_some(Message::Quit)
    }

    /// Automatically advance the state given a previous state
    fn automatic_state_transitions(state: &State) -> Option<Message> {
        match state {
            State::Initial => Some(Message::OpenMenu(Menu::Main)),
            _ => None,
        }
    }

    /// Match key inputs according to the current state
    fn stateful_keys(state: &State, key_event: KeyEvent) -> Option<Message> {
        match state {
            State::Menu { menu, list_state } => match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => Some(Self::DecrementItem),
                KeyCode::Down | KeyCode::Char('j') => Some(Self::IncrementItem),
                KeyCode::Enter => {
                    let idx = list_state.selected()?;
                    let (_, action) = menu.entries().get(idx)?.to_owned();
                    Some(Self::Choose(action))
                }
                // entries are numbered from 1; the tenth is 0
                KeyCode::Char(digit @ '0'..='9') => {
                    let idx = match digit.to_digit(10)? {
                        0 => 9,
                        n => n as usize - 1,
                    };
                    let (_, action) = menu.entries().get(idx)?.to_owned();
                    Some(Self::Choose(action))
                }
                KeyCode::Esc => Some(Self::Back),
                _ => None,
            },
            State::Pick {
                choices,
                list_state,
                ..
            } => match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => Some(Self::DecrementItem),
                KeyCode::Down | KeyCode::Char('j') => Some(Self::IncrementItem),
                KeyCode::Enter => {
                    let idx = list_state.selected()?;
                    let choice = choices.get(idx)?.to_owned();
                    Some(Self::Picked(choice))
                }
                KeyCode::Esc => Some(Self::Back),
                _ => None,
            },
            State::Form(_) => {
                match key_event.code {
                    KeyCode::Esc => Some(Self::Back),
                    KeyCode::Enter => Some(Self::CommitForm),
                    KeyCode::Tab | KeyCode::Down => Some(Self::NextField),
                    KeyCode::BackTab | KeyCode::Up => Some(Self::PrevField),
                    KeyCode::Backspace => Some(Self::Backspace),
                    KeyCode::Delete => Some(Self::Delete),
                    KeyCode::Left => Some(Self::CursorLeft),
                    KeyCode::Right => Some(Self::CursorRight),
                    KeyCode::Char(c) => {
                        // Don't insert control characters
                        if key_event.modifiers.contains(KeyModifiers::CONTROL) {
                            None
                        } else {
                            Some(Self::InsertChar(c))
                        }
                    }
                    _ => None,
                }
            }
            State::Confirm { .. } => match key_event.code {
                KeyCode::Char('y' | 'Y') => Some(Self::Confirm(true)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Self::Confirm(false)),
                _ => None,
            },
            State::Report { .. } => match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => Some(Self::DecrementItem),
                KeyCode::Down | KeyCode::Char('j') => Some(Self::IncrementItem),
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => Some(Self::Back),
                _ => None,
            },
            State::Initial | State::Error(_) | State::Exit => None,
        }
    }
}
