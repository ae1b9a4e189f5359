//! Implementations to update the app state according to incoming messages.

use anyhow::anyhow;

use crate::tui_app::{App, Form, Message, State};

impl App {
    /// Process an incoming message, updating the app state appropriately.
    pub(crate) fn update(&mut self, msg: Message) -> Option<Message> {
        /// if this is an error, produce the error state and return
        macro_rules! or_err_state {
            ($e:expr) => {{
                match $e {
                    Ok(ok) => ok,
                    Err(err) => {
                        self.state = State::Error(err);
                        return None;
                    }
                }
            }};
        }

        /// apply an edit to the open form, or fail if no form is open
        macro_rules! edit_form {
            ($msg:literal, $edit:expr) => {{
                let State::Form(form) = &mut self.state else {
                    self.state = State::Error(anyhow!(
                        concat!("unexpected Message::", $msg, " in {:?}"),
                        self.state
                    ));
                    return None;
                };
                let edit: fn(&mut Form) = $edit;
                edit(form);
            }};
        }

        match msg {
            Message::Quit => {
                self.state = State::Exit;
            }
            Message::OpenMenu(menu) => {
                self.state = State::menu(menu);
            }
            Message::DecrementItem => match &mut self.state {
                State::Menu { list_state, .. } | State::Pick { list_state, .. } => {
                    list_state.select_previous();
                }
                State::Report { table_state, .. } => table_state.select_previous(),
                state => {
                    self.state = State::Error(anyhow!(
                        "unexpected Message::DecrementItem in state: {state:?}"
                    ))
                }
            },
            Message::IncrementItem => match &mut self.state {
                State::Menu { list_state, .. } | State::Pick { list_state, .. } => {
                    list_state.select_next();
                }
                State::Report { table_state, .. } => table_state.select_next(),
                state => {
                    self.state = State::Error(anyhow!(
                        "unexpected Message::IncrementItem in state: {state:?}"
                    ))
                }
            },
            Message::Choose(action) => {
                self.notice = None;
                or_err_state!(self.choose(action));
            }
            Message::Picked(choice) => {
                or_err_state!(self.picked(choice));
            }
            Message::Confirm(yes) => {
                or_err_state!(self.confirm(yes));
            }
            Message::CommitForm => {
                or_err_state!(self.commit_form());
            }
            Message::Back => {
                let back = match &self.state {
                    State::Menu { menu, .. } => menu.back(),
                    State::Pick { purpose, .. } => Some(purpose.back()),
                    State::Form(form) => Some(form.kind.back()),
                    State::Report { back, .. } => Some(*back),
                    State::Confirm { .. } => return Some(Message::Confirm(false)),
                    state => {
                        self.state =
                            State::Error(anyhow!("unexpected Message::Back in state: {state:?}"));
                        return None;
                    }
                };
                return Some(back.map_or(Message::Quit, Message::OpenMenu));
            }
            Message::InsertChar(c) => {
                let State::Form(form) = &mut self.state else {
                    self.state = State::Error(anyhow!(
                        "unexpected Message::InsertChar in {:?}",
                        self.state
                    ));
                    return None;
                };
                form.insert_char(c);
            }
            Message::Backspace => edit_form!("Backspace", Form::backspace),
            Message::Delete => edit_form!("Delete", Form::delete),
            Message::CursorLeft => edit_form!("CursorLeft", Form::cursor_left),
            Message::CursorRight => edit_form!("CursorRight", Form::cursor_right),
            Message::NextField => edit_form!("NextField", Form::next_field),
            Message::PrevField => edit_form!("PrevField", Form::prev_field),
        }
        None
    }
}
