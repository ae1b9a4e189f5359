use airline_data::{DestinationId, FlightId, NewFlight, PilotId};
use ratatui::widgets::{ListState, TableState};

use crate::tui_app::Form;

/// Application state
#[derive(Debug, Default)]
pub(crate) enum State {
    #[default]
    Initial,
    Menu {
        menu: Menu,
        list_state: ListState,
    },
    Pick {
        purpose: PickPurpose,
        choices: Vec<Choice>,
        labels: Vec<String>,
        list_state: ListState,
    },
    Form(Form),
    Confirm {
        prompt: String,
        action: ConfirmAction,
    },
    Report {
        report: Report,
        back: Menu,
        /// Selected row across all sections, which keeps long reports scrollable
        table_state: TableState,
    },
    Error(anyhow::Error),
    Exit,
}

impl State {
    /// `true` when no further processing should occur if this state is reached
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, Self::Exit | Self::Error(_))
    }

    /// A fresh menu state with the first entry selected
    pub(crate) fn menu(menu: Menu) -> Self {
        Self::Menu {
            menu,
            list_state: ListState::default().with_selected(Some(0)),
        }
    }
}

/// The menus of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Menu {
    Main,
    FlightFilter,
    Destinations,
    Pilots,
    /// Offered after a destination is created
    DestinationFlight(DestinationId),
}

impl Menu {
    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Main => "Airline Flight Management",
            Self::FlightFilter => "Filter Flights By",
            Self::Destinations => "Destination Management",
            Self::Pilots => "Pilot Management",
            Self::DestinationFlight(_) => "Assign a Flight to the New Destination",
        }
    }

    pub(crate) fn entries(self) -> Vec<(&'static str, MenuAction)> {
        match self {
            Self::Main => vec![
                ("Add a New Flight", MenuAction::AddFlight),
                (
                    "View Flights by Criteria",
                    MenuAction::Open(Self::FlightFilter),
                ),
                ("Update Flight Information", MenuAction::UpdateFlight),
                ("Assign Pilot to Flight", MenuAction::AssignPilot),
                ("View Pilot Schedule", MenuAction::PilotSchedule),
                (
                    "View/Update Destination Information",
                    MenuAction::Open(Self::Destinations),
                ),
                ("Manage Pilots", MenuAction::Open(Self::Pilots)),
                ("Delete a Flight", MenuAction::DeleteFlight),
                ("View Summarised Reports", MenuAction::Summaries),
                ("Exit", MenuAction::Exit),
            ],
            Self::FlightFilter => vec![
                ("Destination City", MenuAction::Filter(FilterKind::City)),
                ("Flight Status", MenuAction::Filter(FilterKind::Status)),
                ("Departure Date", MenuAction::Filter(FilterKind::Date)),
                ("View All Flights", MenuAction::Filter(FilterKind::All)),
                ("Back to Main Menu", MenuAction::Open(Self::Main)),
            ],
            Self::Destinations => vec![
                ("View All Destinations", MenuAction::ListDestinations),
                ("Add New Destination", MenuAction::AddDestination),
                (
                    "Update Destination Information",
                    MenuAction::UpdateDestination,
                ),
                ("Delete a Destination", MenuAction::DeleteDestination),
                ("Back to Main Menu", MenuAction::Open(Self::Main)),
            ],
            Self::Pilots => vec![
                ("View All Pilots", MenuAction::ListPilots),
                ("Add New Pilot", MenuAction::AddPilot),
                ("Update Pilot Information", MenuAction::UpdatePilot),
                ("Delete a Pilot", MenuAction::DeletePilot),
                ("Back to Main Menu", MenuAction::Open(Self::Main)),
            ],
            Self::DestinationFlight(dest_id) => vec![
                (
                    "Assign an existing flight (overrides its destination)",
                    MenuAction::AssignExistingFlight(dest_id),
                ),
                ("Create a new flight", MenuAction::CreateFlightFor(dest_id)),
                ("Skip", MenuAction::Open(Self::Destinations)),
            ],
        }
    }

    /// Where <esc> leads; `None` means leaving the application
    pub(crate) fn back(self) -> Option<Menu> {
        match self {
            Self::Main => None,
            Self::FlightFilter | Self::Destinations | Self::Pilots => Some(Self::Main),
            Self::DestinationFlight(_) => Some(Self::Destinations),
        }
    }
}

/// Criteria for the flight listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterKind {
    City,
    Status,
    Date,
    All,
}

/// What a menu entry does when chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuAction {
    Open(Menu),
    AddFlight,
    UpdateFlight,
    AssignPilot,
    PilotSchedule,
    DeleteFlight,
    Summaries,
    Exit,
    Filter(FilterKind),
    ListDestinations,
    AddDestination,
    UpdateDestination,
    DeleteDestination,
    ListPilots,
    AddPilot,
    UpdatePilot,
    DeletePilot,
    AssignExistingFlight(DestinationId),
    CreateFlightFor(DestinationId),
}

/// One row of a pick list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Choice {
    Flight(FlightId),
    Pilot(PilotId),
    Destination(DestinationId),
    /// Leave the reference empty
    Nothing,
}

/// Why the user is picking from a list, and what to do with the pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PickPurpose {
    UpdateFlight,
    AssignPilotFlight,
    AssignPilot(FlightId),
    PilotSchedule,
    DeleteFlight,
    NewFlightPilot(NewFlight),
    NewFlightDestination(NewFlight),
    UpdateDestination,
    DeleteDestination,
    DestinationFlight(DestinationId),
    DestinationPilot {
        dest_id: DestinationId,
        flight_id: FlightId,
    },
    UpdatePilot,
    DeletePilot,
}

impl PickPurpose {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::UpdateFlight => "Select a flight to update",
            Self::AssignPilotFlight => "Select a flight to assign a pilot to",
            Self::AssignPilot(_) => "Select the pilot to assign",
            Self::PilotSchedule => "Select a pilot to view their assigned flights",
            Self::DeleteFlight => "Select a flight to delete",
            Self::NewFlightPilot(_) => "Select the pilot for the new flight",
            Self::NewFlightDestination(_) => "Select the destination for the new flight",
            Self::UpdateDestination => "Select a destination to update",
            Self::DeleteDestination => "Select a destination to delete",
            Self::DestinationFlight(_) => "Select the flight to assign",
            Self::DestinationPilot { .. } => "Select the pilot for the flight",
            Self::UpdatePilot => "Select a pilot to update",
            Self::DeletePilot => "Select a pilot to delete",
        }
    }

    /// Which menu to return to when the pick is abandoned or done
    pub(crate) fn back(&self) -> Menu {
        match self {
            Self::NewFlightPilot(NewFlight {
                dest_id: Some(_), ..
            })
            | Self::UpdateDestination
            | Self::DeleteDestination
            | Self::DestinationFlight(_)
            | Self::DestinationPilot { .. } => Menu::Destinations,
            Self::UpdatePilot | Self::DeletePilot => Menu::Pilots,
            _ => Menu::Main,
        }
    }
}

/// A yes/no question awaiting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfirmAction {
    DeleteFlight(FlightId),
    DeleteDestination(DestinationId),
    DeletePilot(PilotId),
    AssignFlightTo(DestinationId),
}

impl ConfirmAction {
    pub(crate) fn back(self) -> Menu {
        match self {
            Self::DeleteFlight(_) => Menu::Main,
            Self::DeleteDestination(_) | Self::AssignFlightTo(_) => Menu::Destinations,
            Self::DeletePilot(_) => Menu::Pilots,
        }
    }
}

/// Tabular output
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Report {
    pub(crate) title: String,
    pub(crate) sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportSection {
    pub(crate) heading: Option<String>,
    pub(crate) header: Vec<&'static str>,
    pub(crate) rows: Vec<Vec<String>>,
    /// Shown instead of the table when there are no rows
    pub(crate) empty: &'static str,
}

/// A one-line outcome shown under the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) text: String,
    pub(crate) is_error: bool,
}

impl Notice {
    pub(crate) fn success(text: impl Into<String>) -> Self {
        Self {
            text: format!("[Success] {}", text.into()),
            is_error: false,
        }
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self {
            text: format!("[Error] {}", text.into()),
            is_error: true,
        }
    }

    pub(crate) fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }
}
