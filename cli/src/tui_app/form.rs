//! Multi-field text entry.

use airline_data::{DestinationId, FlightId, PilotId};

use crate::tui_app::{FilterKind, Menu};

/// What a form is for, and where its values go when committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormKind {
    /// A new flight, optionally already bound to a destination
    NewFlight { dest_id: Option<DestinationId> },
    UpdateFlight(FlightId),
    Filter(FilterKind),
    NewDestination,
    EditDestination(DestinationId),
    NewPilot,
    EditPilot(PilotId),
}

impl FormKind {
    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::NewFlight { .. } => "Add a New Flight",
            Self::UpdateFlight(_) => "Update Flight Information",
            Self::Filter(FilterKind::City) => "Filter by Destination City",
            Self::Filter(FilterKind::Status) => "Filter by Status",
            Self::Filter(FilterKind::Date) => "Filter by Departure Date",
            Self::Filter(FilterKind::All) => "All Flights",
            Self::NewDestination => "Add New Destination",
            Self::EditDestination(_) => "Update Destination Information",
            Self::NewPilot => "Add New Pilot",
            Self::EditPilot(_) => "Update Pilot Information",
        }
    }

    /// Which menu to return to when the form is cancelled
    pub(crate) fn back(self) -> Menu {
        match self {
            Self::NewFlight { dest_id: None } | Self::UpdateFlight(_) => Menu::Main,
            Self::Filter(_) => Menu::FlightFilter,
            Self::NewFlight { dest_id: Some(_) }
            | Self::NewDestination
            | Self::EditDestination(_) => Menu::Destinations,
            Self::NewPilot | Self::EditPilot(_) => Menu::Pilots,
        }
    }
}

/// A single labelled line of input.
///
/// The cursor counts chars, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Field {
    pub(crate) label: &'static str,
    pub(crate) buffer: String,
    pub(crate) cursor: usize,
}

impl Field {
    pub(crate) fn new(label: &'static str) -> Self {
        Self::with_value(label, String::new())
    }

    /// A field prefilled with `value`, cursor at the end
    pub(crate) fn with_value(label: &'static str, value: impl Into<String>) -> Self {
        let buffer = value.into();
        let cursor = buffer.chars().count();
        Self {
            label,
            buffer,
            cursor,
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(idx, _)| idx)
    }

    fn insert(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.buffer.insert(idx, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index(self.cursor);
            self.buffer.remove(idx);
        }
    }

    fn delete(&mut self) {
        // the cursor may sit one past the last char, which deletes nothing
        if self.cursor < self.buffer.chars().count() {
            let idx = self.byte_index(self.cursor);
            self.buffer.remove(idx);
        }
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            self.cursor += 1;
        }
    }

    /// Split the buffer around the cursor: text before, the char under the cursor, text after
    pub(crate) fn split_at_cursor(&self) -> (&str, &str, &str) {
        let at = self.byte_index(self.cursor);
        let (before, rest) = self.buffer.split_at(at);
        let under_len = rest.chars().next().map_or(0, char::len_utf8);
        let (under, after) = rest.split_at(under_len);
        (before, under, after)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Form {
    pub(crate) kind: FormKind,
    pub(crate) fields: Vec<Field>,
    /// Index of the field receiving input
    pub(crate) focus: usize,
    /// Extra guidance shown above the fields
    pub(crate) hint: Option<String>,
    /// Why the last commit was rejected
    pub(crate) error: Option<String>,
}

impl Form {
    pub(crate) fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        debug_assert!(!fields.is_empty(), "a form needs at least one field");
        Self {
            kind,
            fields,
            focus: 0,
            hint: None,
            error: None,
        }
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Owned copies of every field's text, in field order
    pub(crate) fn values(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| field.buffer.clone())
            .collect()
    }

    fn focused(&mut self) -> &mut Field {
        &mut self.fields[self.focus]
    }

    pub(crate) fn insert_char(&mut self, c: char) {
        self.focused().insert(c);
    }

    pub(crate) fn backspace(&mut self) {
        self.focused().backspace();
    }

    pub(crate) fn delete(&mut self) {
        self.focused().delete();
    }

    pub(crate) fn cursor_left(&mut self) {
        self.focused().left();
    }

    pub(crate) fn cursor_right(&mut self) {
        self.focused().right();
    }

    pub(crate) fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub(crate) fn prev_field(&mut self) {
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(self.fields.len() - 1);
    }

    /// Keep the form open with the offending field focused, so the user can correct it
    pub(crate) fn reject(&mut self, field: usize, message: String) {
        self.focus = field.min(self.fields.len() - 1);
        self.error = Some(message);
    }
}

/// A commit refused because one field holds bad input
#[derive(Debug, derive_more::Display)]
#[display("{message}")]
pub(crate) struct Rejection {
    pub(crate) field: usize,
    pub(crate) message: String,
}

impl std::error::Error for Rejection {}

impl Rejection {
    pub(crate) fn new(field: usize, message: impl ToString) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }

    /// Convert a parse failure on `field` into a rejection
    pub(crate) fn check<T, E>(field: usize, result: Result<T, E>) -> Result<T, Self>
    where
        E: ToString,
    {
        result.map_err(|err| Self::new(field, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Form {
        Form::new(
            FormKind::NewPilot,
            vec![Field::new("Name"), Field::with_value("License", "LIC")],
        )
    }

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.insert_char(c);
        }
    }

    #[test]
    fn typing_and_cursor_movement() {
        let mut form = form();
        type_text(&mut form, "Ada");
        form.cursor_left();
        form.cursor_left();
        form.insert_char('n');
        assert_eq!(form.fields[0].buffer, "Anda");

        form.backspace();
        form.delete();
        assert_eq!(form.fields[0].buffer, "Aa");
        assert_eq!(form.fields[0].cursor, 1);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut form = form();
        form.cursor_left();
        form.backspace();
        assert_eq!(form.fields[0].cursor, 0);

        form.next_field();
        form.cursor_right();
        form.delete();
        assert_eq!(form.fields[1].buffer, "LIC");
        assert_eq!(form.fields[1].cursor, 3);
    }

    #[test]
    fn multibyte_input() {
        let mut form = form();
        type_text(&mut form, "Zürich");
        for _ in 0..5 {
            form.cursor_left();
        }
        assert_eq!(form.fields[0].split_at_cursor(), ("Z", "ü", "rich"));

        form.delete();
        assert_eq!(form.fields[0].buffer, "Zrich");
        form.insert_char('ü');
        form.backspace();
        form.backspace();
        assert_eq!(form.fields[0].buffer, "rich");
    }

    #[test]
    fn split_at_end_has_nothing_under_cursor() {
        let field = Field::with_value("City", "Oslo");
        assert_eq!(field.split_at_cursor(), ("Oslo", "", ""));
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = form();
        form.prev_field();
        assert_eq!(form.focus, 1);
        form.next_field();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn reject_focuses_the_bad_field_and_keeps_input() {
        let mut form = form();
        type_text(&mut form, "Ada");
        form.reject(1, "license number must not be empty".into());
        assert_eq!(form.focus, 1);
        assert_eq!(form.fields[0].buffer, "Ada");
        assert_eq!(
            form.error.as_deref(),
            Some("license number must not be empty")
        );
    }
}
