//! Rendering of each app state.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize as _},
    symbols::border,
    text::{Line, Span},
    widgets::{
        Block, Clear, HighlightSpacing, List, ListDirection, Paragraph, Row, Table, TableState,
        Wrap,
    },
};
use tui_logger::TuiLoggerWidget;

use crate::tui_app::{App, Field, Form, Report, State};

impl App {
    /// Render the TUI according to the current state
    pub(crate) fn view(&mut self, frame: &mut Frame) {
        let log_height = if self.logging_enabled {
            Constraint::Percentage(30)
        } else {
            Constraint::Length(0)
        };
        let [main_area, notice_area, log_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1), log_height])
                .areas(frame.area());

        match &mut self.state {
            State::Initial => {
                frame.render_widget("spinning up (<q> or <esc> to quit)", main_area)
            }
            State::Menu { menu, list_state } => {
                let block = Self::make_block(
                    menu.title(),
                    [
                        ("Navigate", "↑↓"),
                        ("Select", "enter/digit"),
                        ("Back", "esc"),
                        ("Quit", "q"),
                    ],
                );

                let items = menu
                    .entries()
                    .into_iter()
                    .enumerate()
                    .map(|(idx, (label, _))| {
                        let key = (idx + 1) % 10;
                        Line::from(format!("{key}. {label}"))
                    })
                    .collect::<Vec<_>>();

                let list = List::new(items)
                    .block(block)
                    .highlight_spacing(HighlightSpacing::Always)
                    .highlight_symbol("> ")
                    .direction(ListDirection::TopToBottom);

                frame.render_stateful_widget(list, main_area, list_state);
            }
            State::Pick {
                purpose,
                labels,
                list_state,
                ..
            } => {
                let block = Self::make_block(
                    purpose.title(),
                    [("Navigate", "↑↓"), ("Select", "enter"), ("Cancel", "esc")],
                );

                let items = labels
                    .iter()
                    .map(|label| Line::from(label.as_str()))
                    .collect::<Vec<_>>();

                let list = List::new(items)
                    .block(block)
                    .highlight_spacing(HighlightSpacing::Always)
                    .highlight_symbol("> ")
                    .direction(ListDirection::TopToBottom);

                frame.render_stateful_widget(list, main_area, list_state);
            }
            State::Form(form) => Self::view_form(frame, main_area, form),
            State::Confirm { prompt, .. } => {
                let modal_area = Self::centered_rect(60, 20, main_area);
                let block = Self::make_block("Confirm", [("Yes", "y"), ("No", "n/esc")])
                    .border_set(border::ROUNDED);
                let paragraph = Paragraph::new(vec![
                    Line::from(prompt.as_str()),
                    Line::from(""),
                    Line::from("(y/n)").italic(),
                ])
                .block(block)
                .wrap(Wrap { trim: false });

                frame.render_widget(Clear, modal_area);
                frame.render_widget(paragraph, modal_area);
            }
            State::Report {
                report,
                table_state,
                ..
            } => Self::view_report(frame, main_area, report, table_state),
            State::Error(_) | State::Exit => {
                unreachable!("app should always exit prior to rendering this")
            }
        }

        if let Some(notice) = &self.notice {
            let style = if notice.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(notice.text.as_str(), style)),
                notice_area,
            );
        }

        if self.logging_enabled {
            let logs = TuiLoggerWidget::default()
                .block(Block::bordered().title(" Log "))
                .style_error(Style::default().fg(Color::Red))
                .style_warn(Style::default().fg(Color::Yellow))
                .style_debug(Style::default().fg(Color::DarkGray));
            frame.render_widget(logs, log_area);
        }
    }

    fn view_form(frame: &mut Frame, area: Rect, form: &Form) {
        let modal_area = Self::centered_rect(70, 60, area);
        let block = Self::make_block(
            form.kind.title(),
            [
                ("Next field", "tab"),
                ("Confirm", "enter"),
                ("Cancel", "esc"),
            ],
        )
        .border_set(border::ROUNDED);

        let mut lines = Vec::new();
        if let Some(hint) = &form.hint {
            lines.push(Line::from(hint.as_str()).italic().fg(Color::DarkGray));
            lines.push(Line::from(""));
        }
        for (idx, field) in form.fields.iter().enumerate() {
            lines.push(Self::field_line(field, idx == form.focus));
        }
        if let Some(error) = &form.error {
            lines.push(Line::from(""));
            lines.push(Line::from(format!("[Error] {error}")).fg(Color::Red));
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(Clear, modal_area);
        frame.render_widget(paragraph, modal_area);
    }

    /// One labelled input line, with a block cursor when focused
    fn field_line(field: &Field, focused: bool) -> Line<'_> {
        let label = Span::raw(format!("{}: ", field.label)).bold();
        if !focused {
            return Line::from(vec![label, Span::raw(field.buffer.as_str())]);
        }

        let (before, under, after) = field.split_at_cursor();
        let under = if under.is_empty() { " " } else { under };
        Line::from(vec![
            label,
            Span::raw(before),
            Span::styled(under, Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(after),
        ])
    }

    /// Every section flattened into one table, so a single selection scrolls the whole report
    fn view_report(frame: &mut Frame, area: Rect, report: &Report, table_state: &mut TableState) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let columns = report
            .sections
            .iter()
            .map(|section| section.header.len())
            .max()
            .unwrap_or(1);

        // a lone section keeps its header pinned above the scrolling rows
        let pinned_header = match report.sections.as_slice() {
            [section] if section.heading.is_none() && !section.rows.is_empty() => {
                Some(Row::new(section.header.iter().copied()).style(bold))
            }
            _ => None,
        };

        let mut rows = Vec::new();
        for (idx, section) in report.sections.iter().enumerate() {
            if idx > 0 {
                rows.push(Row::default());
            }
            if let Some(heading) = &section.heading {
                rows.push(Row::new([heading.as_str()]).style(bold));
            }
            if section.rows.is_empty() {
                rows.push(Row::new([Line::from(section.empty).italic()]));
                continue;
            }
            if pinned_header.is_none() {
                rows.push(Row::new(section.header.iter().copied()).style(bold));
            }
            rows.extend(
                section
                    .rows
                    .iter()
                    .map(|row| Row::new(row.iter().map(String::as_str))),
            );
        }

        let block = Self::make_block(
            report.title.as_str(),
            [("Scroll", "↑↓"), ("Back", "esc/enter")],
        );
        let mut table = Table::new(rows, vec![Constraint::Fill(1); columns])
            .block(block)
            .highlight_spacing(HighlightSpacing::Always)
            .highlight_symbol("> ");
        if let Some(header) = pinned_header {
            table = table.header(header);
        }
        frame.render_stateful_widget(table, area, table_state);
    }

    /// Helper function to create a centered rectangle
    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::vertical([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

        Layout::horizontal([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
    }

    /// Helper function to create a text block
    fn make_block<'a>(
        title: &'a str,
        help: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Block<'a> {
        let title = Line::from(format!(" {title} ").bold());
        let help = Line::from(
            help.into_iter()
                .flat_map(|(action, key)| [format!(" {action} ").into(), format!("<{key}>").blue()])
                .collect::<Vec<_>>(),
        );
        Block::bordered()
            .border_set(border::PLAIN)
            .title(title)
            .title_bottom(help.centered())
    }
}
