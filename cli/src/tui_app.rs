mod app;
mod form;
mod message;
mod state;

pub(crate) use app::App;
pub(crate) use form::{Field, Form, FormKind, Rejection};
pub(crate) use message::Message;
pub(crate) use state::{
    Choice, ConfirmAction, FilterKind, Menu, MenuAction, Notice, PickPurpose, Report,
    ReportSection, State,
};
