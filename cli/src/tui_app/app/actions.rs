//! What each menu entry, pick, confirmation and form commit does to the database.

use airline_data::{
    AirportCode, Destination, DestinationId, Flight, FlightId, FlightNumber, FlightStatus,
    NewFlight, Pilot, PilotId,
    report::{self, FlightFilter},
    is_foreign_key_violation, is_unique_violation, license_number, non_empty,
    parse_departure_date,
};
use anyhow::{Context as _, Result, anyhow, bail};
use log::{debug, warn};
use ratatui::widgets::{ListState, TableState};

use crate::tui_app::{
    App, Choice, ConfirmAction, Field, FilterKind, Form, FormKind, Menu, MenuAction, Notice,
    PickPurpose, Rejection, Report, ReportSection, State,
};

const NONE_LABEL: &str = "(none)";

impl App {
    fn open_menu(&mut self, menu: Menu) {
        self.state = State::menu(menu);
    }

    /// Show `notice` on top of `menu`
    fn finish(&mut self, menu: Menu, notice: Notice) {
        self.notice = Some(notice);
        self.open_menu(menu);
    }

    /// Turn a write the database refused on a constraint into a notice; pass anything else through
    fn refused(&mut self, err: anyhow::Error, menu: Menu, what: &str) -> Result<()> {
        if is_unique_violation(&err) || is_foreign_key_violation(&err) {
            warn!(err:display; "write refused by constraint");
            self.finish(menu, Notice::error(format!("{what}: {err:#}")));
            Ok(())
        } else {
            Err(err)
        }
    }

    fn pick(&mut self, purpose: PickPurpose, choices: Vec<(Choice, String)>) {
        if choices.is_empty() {
            let menu = purpose.back();
            self.finish(menu, Notice::error("Nothing to choose from."));
            return;
        }
        let (choices, labels) = choices.into_iter().unzip();
        self.state = State::Pick {
            purpose,
            choices,
            labels,
            list_state: ListState::default().with_selected(Some(0)),
        };
    }

    fn pick_flight(&mut self, purpose: PickPurpose) -> Result<()> {
        let show_pilot = matches!(purpose, PickPurpose::DestinationFlight(_));
        let flights = Flight::list_all(&self.connection).context("listing flights")?;
        let choices = flights
            .iter()
            .map(|flight| {
                let mut label = format!(
                    "ID: {} | Flight: {} | Date: {} | Status: {}",
                    flight.id(),
                    flight.flight_num(),
                    flight.departure_date(),
                    flight.status(),
                );
                if show_pilot {
                    let pilot = flight
                        .pilot_id()
                        .map_or_else(|| NONE_LABEL.to_owned(), |id| id.to_string());
                    label.push_str(&format!(" | Pilot ID: {pilot}"));
                }
                (Choice::Flight(flight.id()), label)
            })
            .collect();
        self.pick(purpose, choices);
        Ok(())
    }

    fn pick_pilot(&mut self, purpose: PickPurpose, allow_none: bool) -> Result<()> {
        let pilots = Pilot::list_all(&self.connection).context("listing pilots")?;
        let none = allow_none.then(|| (Choice::Nothing, NONE_LABEL.to_owned()));
        let choices = none
            .into_iter()
            .chain(pilots.iter().map(|pilot| {
                (
                    Choice::Pilot(pilot.id()),
                    format!(
                        "ID: {} | Name: {} | License: {}",
                        pilot.id(),
                        pilot.name(),
                        pilot.license_num()
                    ),
                )
            }))
            .collect();
        self.pick(purpose, choices);
        Ok(())
    }

    fn pick_destination(&mut self, purpose: PickPurpose, allow_none: bool) -> Result<()> {
        let destinations =
            Destination::list_all(&self.connection).context("listing destinations")?;
        let none = allow_none.then(|| (Choice::Nothing, NONE_LABEL.to_owned()));
        let choices = none
            .into_iter()
            .chain(destinations.iter().map(|destination| {
                (
                    Choice::Destination(destination.id()),
                    format!(
                        "ID: {} | Code: {} | City: {}",
                        destination.id(),
                        destination.airport_code(),
                        destination.city()
                    ),
                )
            }))
            .collect();
        self.pick(purpose, choices);
        Ok(())
    }

    fn show_report(&mut self, report: Report, back: Menu) {
        self.state = State::Report {
            report,
            back,
            table_state: TableState::default().with_selected(Some(0)),
        };
    }

    /// Carry out a menu entry
    pub(super) fn choose(&mut self, action: MenuAction) -> Result<()> {
        debug!(action:debug; "menu entry chosen");
        match action {
            MenuAction::Open(menu) => self.open_menu(menu),
            MenuAction::Exit => self.state = State::Exit,
            MenuAction::AddFlight => self.state = State::Form(new_flight_form(None)),
            MenuAction::CreateFlightFor(dest_id) => {
                self.state = State::Form(new_flight_form(Some(dest_id)))
            }
            MenuAction::UpdateFlight => self.pick_flight(PickPurpose::UpdateFlight)?,
            MenuAction::AssignPilot => self.pick_flight(PickPurpose::AssignPilotFlight)?,
            MenuAction::DeleteFlight => self.pick_flight(PickPurpose::DeleteFlight)?,
            MenuAction::AssignExistingFlight(dest_id) => {
                self.pick_flight(PickPurpose::DestinationFlight(dest_id))?
            }
            MenuAction::PilotSchedule => self.pick_pilot(PickPurpose::PilotSchedule, false)?,
            MenuAction::UpdatePilot => self.pick_pilot(PickPurpose::UpdatePilot, false)?,
            MenuAction::DeletePilot => self.pick_pilot(PickPurpose::DeletePilot, false)?,
            MenuAction::UpdateDestination => {
                self.pick_destination(PickPurpose::UpdateDestination, false)?
            }
            MenuAction::DeleteDestination => {
                self.pick_destination(PickPurpose::DeleteDestination, false)?
            }
            MenuAction::Filter(kind) => {
                let (label, available) = match kind {
                    FilterKind::City => (
                        "Destination City",
                        report::destination_cities(&self.connection),
                    ),
                    FilterKind::Status => ("Status", report::flight_statuses(&self.connection)),
                    FilterKind::Date => (
                        "Departure Date (YYYY-MM-DD)",
                        report::departure_dates(&self.connection),
                    ),
                    FilterKind::All => {
                        let report = self.flight_report(&FlightFilter::All)?;
                        self.show_report(report, Menu::FlightFilter);
                        return Ok(());
                    }
                };
                let available = available.context("listing filter values")?;
                let form = Form::new(FormKind::Filter(kind), vec![Field::new(label)])
                    .with_hint(format!("Available: {}", available.join(", ")));
                self.state = State::Form(form);
            }
            MenuAction::ListDestinations => {
                let report = self.destinations_report()?;
                self.show_report(report, Menu::Destinations);
            }
            MenuAction::AddDestination => {
                self.state = State::Form(Form::new(
                    FormKind::NewDestination,
                    vec![Field::new("City"), Field::new("Airport Code")],
                ));
            }
            MenuAction::ListPilots => {
                let report = self.pilots_report()?;
                self.show_report(report, Menu::Pilots);
            }
            MenuAction::AddPilot => {
                self.state = State::Form(Form::new(
                    FormKind::NewPilot,
                    vec![Field::new("Name"), Field::new("License Number")],
                ));
            }
            MenuAction::Summaries => {
                let report = self.summary_report()?;
                self.show_report(report, Menu::Main);
            }
        }
        Ok(())
    }

    /// Carry out the pending pick
    pub(super) fn picked(&mut self, choice: Choice) -> Result<()> {
        let State::Pick { purpose, .. } = &self.state else {
            bail!("unexpected Message::Picked in {:?}", self.state);
        };
        let purpose = purpose.clone();

        match (purpose, choice) {
            (PickPurpose::UpdateFlight, Choice::Flight(flight_id)) => {
                let flight = Flight::load(&self.connection, flight_id)?;
                let form = Form::new(
                    FormKind::UpdateFlight(flight_id),
                    vec![
                        Field::with_value("Status", flight.status().as_str()),
                        Field::with_value(
                            "Departure Date (blank keeps current)",
                            flight.departure_date().to_string(),
                        ),
                    ],
                )
                .with_hint(format!(
                    "Flight {}. Known statuses: {}",
                    flight.flight_num(),
                    known_statuses()
                ));
                self.state = State::Form(form);
            }
            (PickPurpose::AssignPilotFlight, Choice::Flight(flight_id)) => {
                self.pick_pilot(PickPurpose::AssignPilot(flight_id), false)?;
            }
            (PickPurpose::AssignPilot(flight_id), Choice::Pilot(pilot_id)) => {
                self.assign(flight_id, pilot_id, None)?;
            }
            (PickPurpose::PilotSchedule, Choice::Pilot(pilot_id)) => {
                let report = self.schedule_report(pilot_id)?;
                self.show_report(report, Menu::Main);
            }
            (PickPurpose::DeleteFlight, Choice::Flight(flight_id)) => {
                let flight = Flight::load(&self.connection, flight_id)?;
                self.state = State::Confirm {
                    prompt: format!("Delete flight {}?", flight.flight_num()),
                    action: ConfirmAction::DeleteFlight(flight_id),
                };
            }
            (PickPurpose::NewFlightPilot(mut draft), Choice::Pilot(_) | Choice::Nothing) => {
                draft.pilot_id = pilot_of(choice);
                if draft.dest_id.is_some() {
                    self.insert_flight(draft, Menu::Destinations)?;
                } else {
                    self.pick_destination(PickPurpose::NewFlightDestination(draft), true)?;
                }
            }
            (
                PickPurpose::NewFlightDestination(mut draft),
                Choice::Destination(_) | Choice::Nothing,
            ) => {
                draft.dest_id = destination_of(choice);
                self.insert_flight(draft, Menu::Main)?;
            }
            (PickPurpose::UpdateDestination, Choice::Destination(dest_id)) => {
                let destination = Destination::load(&self.connection, dest_id)?;
                self.state = State::Form(Form::new(
                    FormKind::EditDestination(dest_id),
                    vec![
                        Field::with_value("City", destination.city().as_str()),
                        Field::with_value("Airport Code", destination.airport_code().as_str()),
                    ],
                ));
            }
            (PickPurpose::DeleteDestination, Choice::Destination(dest_id)) => {
                let flights = Destination::flight_count(&self.connection, dest_id)?;
                if flights > 0 {
                    self.state = State::Confirm {
                        prompt: format!(
                            "[Warning] This destination has {flights} flight(s) assigned. Delete anyway?"
                        ),
                        action: ConfirmAction::DeleteDestination(dest_id),
                    };
                } else {
                    self.confirm_action(ConfirmAction::DeleteDestination(dest_id), true)?;
                }
            }
            (PickPurpose::DestinationFlight(dest_id), Choice::Flight(flight_id)) => {
                self.pick_pilot(PickPurpose::DestinationPilot { dest_id, flight_id }, false)?;
            }
            (PickPurpose::DestinationPilot { dest_id, flight_id }, Choice::Pilot(pilot_id)) => {
                self.assign(flight_id, pilot_id, Some(dest_id))?;
            }
            (PickPurpose::UpdatePilot, Choice::Pilot(pilot_id)) => {
                let pilot = Pilot::load(&self.connection, pilot_id)?;
                self.state = State::Form(Form::new(
                    FormKind::EditPilot(pilot_id),
                    vec![
                        Field::with_value("Name", pilot.name().as_str()),
                        Field::with_value("License Number", pilot.license_num().as_str()),
                    ],
                ));
            }
            (PickPurpose::DeletePilot, Choice::Pilot(pilot_id)) => {
                let flights = Pilot::flight_count(&self.connection, pilot_id)?;
                if flights > 0 {
                    self.state = State::Confirm {
                        prompt: format!(
                            "[Warning] This pilot is assigned to {flights} flight(s). Delete anyway?"
                        ),
                        action: ConfirmAction::DeletePilot(pilot_id),
                    };
                } else {
                    self.confirm_action(ConfirmAction::DeletePilot(pilot_id), true)?;
                }
            }
            (purpose, choice) => {
                bail!("unexpected choice {choice:?} while picking for {purpose:?}")
            }
        }
        Ok(())
    }

    /// Assign a pilot to a flight, and optionally move the flight to a destination
    fn assign(
        &mut self,
        flight_id: FlightId,
        pilot_id: PilotId,
        dest_id: Option<DestinationId>,
    ) -> Result<()> {
        let menu = if dest_id.is_some() {
            Menu::Destinations
        } else {
            Menu::Main
        };

        let mut flight = Flight::load(&self.connection, flight_id)?;
        flight.set_pilot_id(Some(pilot_id));
        if let Some(dest_id) = dest_id {
            flight.set_dest_id(Some(dest_id));
        }
        if let Err(err) = flight.save(&self.connection).context("assigning flight") {
            return self.refused(err, menu, "Could not assign pilot");
        }

        let pilot = Pilot::load(&self.connection, pilot_id)?;
        let notice = match dest_id {
            Some(dest_id) => {
                let destination = Destination::load(&self.connection, dest_id)?;
                Notice::success(format!(
                    "Flight {} assigned to {} with Pilot {}",
                    flight.flight_num(),
                    destination.city(),
                    pilot.name()
                ))
            }
            None => Notice::success(format!(
                "Pilot {} assigned to flight {}!",
                pilot.name(),
                flight.flight_num()
            )),
        };
        self.finish(menu, notice);
        Ok(())
    }

    fn insert_flight(&mut self, draft: NewFlight, menu: Menu) -> Result<()> {
        let flight_num = draft.flight_num.clone();
        match Flight::new(&self.connection, draft).context("inserting flight") {
            Ok(flight) => {
                let notice = match flight.dest_id() {
                    Some(dest_id) => {
                        let destination = Destination::load(&self.connection, dest_id)?;
                        Notice::success(format!(
                            "New flight {flight_num} created and assigned to {}",
                            destination.city()
                        ))
                    }
                    None => Notice::success(format!("New flight {flight_num} added.")),
                };
                self.finish(menu, notice);
                Ok(())
            }
            Err(err) => self.refused(err, menu, &format!("Could not add flight {flight_num}")),
        }
    }

    /// Answer the pending yes/no question
    pub(super) fn confirm(&mut self, yes: bool) -> Result<()> {
        let State::Confirm { action, .. } = &self.state else {
            bail!("unexpected Message::Confirm in {:?}", self.state);
        };
        let action = *action;
        self.confirm_action(action, yes)
    }

    fn confirm_action(&mut self, action: ConfirmAction, yes: bool) -> Result<()> {
        let menu = action.back();
        match action {
            ConfirmAction::AssignFlightTo(dest_id) => {
                if yes {
                    self.open_menu(Menu::DestinationFlight(dest_id));
                } else {
                    self.open_menu(menu);
                }
                return Ok(());
            }
            _ if !yes => {
                self.finish(menu, Notice::info("Deletion cancelled."));
                return Ok(());
            }
            ConfirmAction::DeleteFlight(flight_id) => {
                let deleted = Flight::delete(&self.connection, flight_id)?;
                self.finish_delete(menu, deleted, "Flight");
            }
            ConfirmAction::DeleteDestination(dest_id) => {
                let deleted = Destination::delete(&self.connection, dest_id)?;
                self.finish_delete(menu, deleted, "Destination");
            }
            ConfirmAction::DeletePilot(pilot_id) => {
                let deleted = Pilot::delete(&self.connection, pilot_id)?;
                self.finish_delete(menu, deleted, "Pilot");
            }
        }
        Ok(())
    }

    fn finish_delete(&mut self, menu: Menu, deleted: bool, what: &str) {
        let notice = if deleted {
            Notice::success(format!("{what} deleted."))
        } else {
            Notice::error(format!("{what} no longer exists; nothing was deleted."))
        };
        self.finish(menu, notice);
    }

    /// Validate and apply the open form
    ///
    /// Invalid input leaves the form open with the reason shown.
    pub(super) fn commit_form(&mut self) -> Result<()> {
        let State::Form(form) = &self.state else {
            bail!("unexpected Message::CommitForm in {:?}", self.state);
        };
        let kind = form.kind;
        let values = form.values();

        let result = match kind {
            FormKind::NewFlight { dest_id } => self.submit_new_flight(&values, dest_id),
            FormKind::UpdateFlight(flight_id) => self.submit_flight_update(&values, flight_id),
            FormKind::Filter(kind) => self.submit_filter(&values, kind),
            FormKind::NewDestination => self.submit_destination(&values, None),
            FormKind::EditDestination(dest_id) => self.submit_destination(&values, Some(dest_id)),
            FormKind::NewPilot => self.submit_pilot(&values, None),
            FormKind::EditPilot(pilot_id) => self.submit_pilot(&values, Some(pilot_id)),
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                let rejection = err.downcast::<Rejection>()?;
                debug!("field" = rejection.field, "reason" = rejection.message.as_str(); "form input rejected");
                let State::Form(form) = &mut self.state else {
                    return Err(anyhow!("form closed while rejecting its input"));
                };
                form.reject(rejection.field, rejection.message);
                Ok(())
            }
        }
    }

    fn submit_new_flight(
        &mut self,
        values: &[String],
        dest_id: Option<DestinationId>,
    ) -> Result<()> {
        let flight_num = Rejection::check(0, values[0].parse::<FlightNumber>())?;
        if Flight::number_taken(&self.connection, &flight_num)? {
            let message = format!("flight number {flight_num} already exists");
            return Err(Rejection::new(0, message).into());
        }
        let departure_date = Rejection::check(1, parse_departure_date(&values[1]))?;
        let status = Rejection::check(2, values[2].parse::<FlightStatus>())?;

        let draft = NewFlight {
            flight_num,
            departure_date,
            status,
            pilot_id: None,
            dest_id,
        };
        self.pick_pilot(PickPurpose::NewFlightPilot(draft), true)
    }

    fn submit_flight_update(&mut self, values: &[String], flight_id: FlightId) -> Result<()> {
        let status = Rejection::check(0, values[0].parse::<FlightStatus>())?;
        let departure_date = match values[1].trim() {
            "" => None,
            date => Some(Rejection::check(1, parse_departure_date(date))?),
        };

        let mut flight = Flight::load(&self.connection, flight_id)?;
        flight.set_status(status);
        if let Some(departure_date) = departure_date {
            flight.set_departure_date(departure_date);
        }
        flight.save(&self.connection).context("saving flight")?;

        self.finish(
            Menu::Main,
            Notice::success(format!(
                "Flight {} updated! New Status: {} | New Date: {}",
                flight.flight_num(),
                flight.status(),
                flight.departure_date()
            )),
        );
        Ok(())
    }

    fn submit_filter(&mut self, values: &[String], kind: FilterKind) -> Result<()> {
        let needle = values[0].trim().to_owned();
        let filter = match kind {
            FilterKind::City => FlightFilter::DestinationCity(needle),
            FilterKind::Status => FlightFilter::Status(needle),
            FilterKind::Date => {
                if !needle.chars().all(|c| c.is_ascii_digit() || c == '-') {
                    return Err(Rejection::new(
                        0,
                        format!("departure date {needle:?} may only contain digits and '-'"),
                    )
                    .into());
                }
                FlightFilter::DepartureDate(needle)
            }
            FilterKind::All => FlightFilter::All,
        };
        let report = self.flight_report(&filter)?;
        self.show_report(report, Menu::FlightFilter);
        Ok(())
    }

    fn submit_destination(
        &mut self,
        values: &[String],
        dest_id: Option<DestinationId>,
    ) -> Result<()> {
        let city = Rejection::check(0, non_empty("city", &values[0]))?;
        let airport_code = Rejection::check(1, values[1].parse::<AirportCode>())?;
        if Destination::code_taken(&self.connection, &airport_code, dest_id)? {
            let message = format!("airport code {airport_code} is already used");
            return Err(Rejection::new(1, message).into());
        }

        match dest_id {
            None => {
                let result = Destination::new(&self.connection, city, airport_code)
                    .context("inserting destination");
                let destination = match result {
                    Ok(destination) => destination,
                    Err(err) => {
                        return self.refused(err, Menu::Destinations, "Could not add destination");
                    }
                };
                self.notice = Some(Notice::success(format!(
                    "New destination '{}' ({}) created with ID: {}",
                    destination.city(),
                    destination.airport_code(),
                    destination.id()
                )));
                self.state = State::Confirm {
                    prompt: "Would you like to assign a flight to this destination?".into(),
                    action: ConfirmAction::AssignFlightTo(destination.id()),
                };
            }
            Some(dest_id) => {
                let mut destination = Destination::load(&self.connection, dest_id)?;
                destination.set_city(city);
                destination.set_airport_code(airport_code);
                if let Err(err) = destination.save(&self.connection).context("saving destination") {
                    return self.refused(err, Menu::Destinations, "Could not update destination");
                }
                self.finish(
                    Menu::Destinations,
                    Notice::success(format!(
                        "Destination updated to: {} ({})",
                        destination.city(),
                        destination.airport_code()
                    )),
                );
            }
        }
        Ok(())
    }

    fn submit_pilot(&mut self, values: &[String], pilot_id: Option<PilotId>) -> Result<()> {
        let name = Rejection::check(0, non_empty("name", &values[0]))?;
        let license_num = Rejection::check(1, license_number(&values[1]))?;
        if Pilot::license_taken(&self.connection, &license_num, pilot_id)? {
            let message = format!("license number {license_num} is already held");
            return Err(Rejection::new(1, message).into());
        }

        let result = match pilot_id {
            None => Pilot::new(&self.connection, name, license_num).context("inserting pilot"),
            Some(pilot_id) => Pilot::load(&self.connection, pilot_id).and_then(|mut pilot| {
                pilot.set_name(name);
                pilot.set_license_num(license_num);
                pilot.save(&self.connection).context("saving pilot")?;
                Ok(pilot)
            }),
        };
        let pilot = match result {
            Ok(pilot) => pilot,
            Err(err) => return self.refused(err, Menu::Pilots, "Could not save pilot"),
        };

        let verb = if pilot_id.is_some() { "updated" } else { "added" };
        self.finish(
            Menu::Pilots,
            Notice::success(format!(
                "Pilot {} ({}) {verb}.",
                pilot.name(),
                pilot.license_num()
            )),
        );
        Ok(())
    }

    fn flight_report(&self, filter: &FlightFilter) -> Result<Report> {
        let rows = report::flights_matching(&self.connection, filter).context("filtering flights")?;
        Ok(Report {
            title: format!("RESULTS: {} flight(s) found", rows.len()),
            sections: vec![ReportSection {
                heading: None,
                header: vec!["Flight", "Destination", "Status", "Date"],
                rows: rows
                    .into_iter()
                    .map(|row| {
                        vec![
                            row.flight_num.to_string(),
                            row.city.unwrap_or_else(|| NONE_LABEL.to_owned()),
                            row.status.to_string(),
                            row.departure_date.to_string(),
                        ]
                    })
                    .collect(),
                empty: "No flights match your criteria.",
            }],
        })
    }

    fn destinations_report(&self) -> Result<Report> {
        let destinations = Destination::list_with_flight_counts(&self.connection)
            .context("listing destinations")?;
        Ok(Report {
            title: "All Destinations".into(),
            sections: vec![ReportSection {
                heading: None,
                header: vec!["ID", "Code", "City", "Flights"],
                rows: destinations
                    .into_iter()
                    .map(|(destination, flights)| {
                        vec![
                            destination.id().to_string(),
                            destination.airport_code().to_string(),
                            destination.city().clone(),
                            flights.to_string(),
                        ]
                    })
                    .collect(),
                empty: "No destinations yet.",
            }],
        })
    }

    fn pilots_report(&self) -> Result<Report> {
        let pilots = Pilot::list_with_flight_counts(&self.connection).context("listing pilots")?;
        Ok(Report {
            title: "All Pilots".into(),
            sections: vec![ReportSection {
                heading: None,
                header: vec!["ID", "Name", "License", "Flights"],
                rows: pilots
                    .into_iter()
                    .map(|(pilot, flights)| {
                        vec![
                            pilot.id().to_string(),
                            pilot.name().clone(),
                            pilot.license_num().clone(),
                            flights.to_string(),
                        ]
                    })
                    .collect(),
                empty: "No pilots yet.",
            }],
        })
    }

    fn schedule_report(&self, pilot_id: PilotId) -> Result<Report> {
        let pilot = Pilot::load(&self.connection, pilot_id)?;
        let schedule = Pilot::schedule(&self.connection, pilot_id).context("loading schedule")?;
        Ok(Report {
            title: format!("Schedule for {} (Pilot ID {})", pilot.name(), pilot.id()),
            sections: vec![ReportSection {
                heading: None,
                header: vec!["Flight", "Date", "Destination"],
                rows: schedule
                    .into_iter()
                    .map(|scheduled| {
                        vec![
                            scheduled.flight_num.to_string(),
                            scheduled.departure_date.to_string(),
                            scheduled.city.unwrap_or_else(|| NONE_LABEL.to_owned()),
                        ]
                    })
                    .collect(),
                empty: "No flights assigned to this pilot.",
            }],
        })
    }

    fn summary_report(&self) -> Result<Report> {
        let per_destination =
            report::flights_per_destination(&self.connection).context("summarising destinations")?;
        let per_pilot = report::flights_per_pilot(&self.connection).context("summarising pilots")?;
        let rows = |counts: Vec<(String, u32)>| {
            counts
                .into_iter()
                .map(|(label, flights)| vec![label, format!("{flights} flight(s)")])
                .collect()
        };
        Ok(Report {
            title: "Summarised Reports".into(),
            sections: vec![
                ReportSection {
                    heading: Some("Flights per Destination".into()),
                    header: vec!["Destination", "Flights"],
                    rows: rows(per_destination),
                    empty: "No destinations yet.",
                },
                ReportSection {
                    heading: Some("Flights per Pilot".into()),
                    header: vec!["Pilot", "Flights"],
                    rows: rows(per_pilot),
                    empty: "No pilots yet.",
                },
            ],
        })
    }
}

fn new_flight_form(dest_id: Option<DestinationId>) -> Form {
    Form::new(
        FormKind::NewFlight { dest_id },
        vec![
            Field::new("Flight Number (e.g. BA123)"),
            Field::new("Departure Date (YYYY-MM-DD)"),
            Field::with_value("Status", FlightStatus::Scheduled.as_str()),
        ],
    )
    .with_hint(format!("Known statuses: {}", known_statuses()))
}

fn known_statuses() -> String {
    FlightStatus::KNOWN
        .iter()
        .map(FlightStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn pilot_of(choice: Choice) -> Option<PilotId> {
    match choice {
        Choice::Pilot(pilot_id) => Some(pilot_id),
        _ => None,
    }
}

fn destination_of(choice: Choice) -> Option<DestinationId> {
    match choice {
        Choice::Destination(dest_id) => Some(dest_id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui_app::Message;

    fn seeded_app() -> App {
        let connection = airline_data::open_in_memory().unwrap();
        airline_data::apply_schema(&connection).unwrap();
        airline_data::seed_sample_data(&connection).unwrap();
        let mut app = App::with_connection(connection, false);
        send(&mut app, Message::OpenMenu(Menu::Main));
        app
    }

    /// Deliver `msg` and every follow-up message it produces
    fn send(app: &mut App, msg: Message) {
        let mut next = Some(msg);
        while let Some(msg) = next {
            next = app.update(msg);
        }
        if let State::Error(err) = &app.state {
            panic!("app entered the error state: {err:#}");
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            send(app, Message::InsertChar(c));
        }
    }

    /// Empty the focused field, whose cursor sits at its end
    fn clear_field(app: &mut App) {
        for _ in 0..64 {
            send(app, Message::Backspace);
        }
    }

    fn notice(app: &App) -> &str {
        app.notice.as_ref().map_or("", |notice| notice.text.as_str())
    }

    fn form(app: &App) -> &Form {
        match &app.state {
            State::Form(form) => form,
            state => panic!("expected a form, found {state:?}"),
        }
    }

    fn report(app: &App) -> &Report {
        match &app.state {
            State::Report { report, .. } => report,
            state => panic!("expected a report, found {state:?}"),
        }
    }

    fn assert_menu(app: &App, expect: Menu) {
        match &app.state {
            State::Menu { menu, .. } => assert_eq!(*menu, expect),
            state => panic!("expected {expect:?}, found {state:?}"),
        }
    }

    #[test]
    fn add_flight_with_pilot_and_no_destination() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::AddFlight));
        type_text(&mut app, "ba123");
        send(&mut app, Message::NextField);
        type_text(&mut app, "2026-06-01");
        send(&mut app, Message::NextField);
        clear_field(&mut app);
        type_text(&mut app, "delayed");
        send(&mut app, Message::CommitForm);

        assert!(matches!(
            app.state,
            State::Pick {
                purpose: PickPurpose::NewFlightPilot(_),
                ..
            }
        ));
        send(&mut app, Message::Picked(Choice::Pilot(1.into())));
        assert!(matches!(
            app.state,
            State::Pick {
                purpose: PickPurpose::NewFlightDestination(_),
                ..
            }
        ));
        send(&mut app, Message::Picked(Choice::Nothing));

        assert_menu(&app, Menu::Main);
        assert_eq!(notice(&app), "[Success] New flight BA123 added.");
        let flights = Flight::list_all(&app.connection).unwrap();
        let flight = flights
            .iter()
            .find(|flight| flight.flight_num().as_str() == "BA123")
            .unwrap();
        assert_eq!(flight.pilot_id(), Some(1.into()));
        assert_eq!(flight.dest_id(), None);
        assert_eq!(*flight.status(), FlightStatus::Delayed);
        assert_eq!(flight.departure_date().to_string(), "2026-06-01");
    }

    #[test]
    fn bad_flight_input_keeps_the_form_open() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::AddFlight));
        type_text(&mut app, "123");
        send(&mut app, Message::CommitForm);
        assert_eq!(form(&app).focus, 0);
        assert!(form(&app).error.is_some());

        clear_field(&mut app);
        type_text(&mut app, "fl-101");
        send(&mut app, Message::CommitForm);
        assert!(form(&app).error.as_deref().unwrap().contains("already exists"));

        clear_field(&mut app);
        type_text(&mut app, "FL-900");
        send(&mut app, Message::NextField);
        type_text(&mut app, "2026-13-01");
        send(&mut app, Message::CommitForm);
        assert_eq!(form(&app).focus, 1);
        assert_eq!(form(&app).fields[0].buffer, "FL-900");
        assert_eq!(Flight::list_all(&app.connection).unwrap().len(), 10);
    }

    #[test]
    fn update_flight_keeps_date_when_blank() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::UpdateFlight));
        send(&mut app, Message::Picked(Choice::Flight(101.into())));
        assert_eq!(form(&app).values(), vec!["Scheduled", "2026-05-10"]);

        clear_field(&mut app);
        type_text(&mut app, "Boarding");
        send(&mut app, Message::NextField);
        clear_field(&mut app);
        send(&mut app, Message::CommitForm);

        assert_menu(&app, Menu::Main);
        assert_eq!(
            notice(&app),
            "[Success] Flight FL-101 updated! New Status: Boarding | New Date: 2026-05-10"
        );
        let flight = Flight::load(&app.connection, 101.into()).unwrap();
        assert_eq!(flight.status().as_str(), "Boarding");
    }

    #[test]
    fn assign_pilot_to_flight() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::AssignPilot));
        send(&mut app, Message::Picked(Choice::Flight(101.into())));
        send(&mut app, Message::Picked(Choice::Pilot(2.into())));

        assert_eq!(
            notice(&app),
            "[Success] Pilot Jenny Smith assigned to flight FL-101!"
        );
        let flight = Flight::load(&app.connection, 101.into()).unwrap();
        assert_eq!(flight.pilot_id(), Some(2.into()));
    }

    #[test]
    fn delete_flight_asks_first() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::DeleteFlight));
        send(&mut app, Message::Picked(Choice::Flight(101.into())));
        assert!(matches!(app.state, State::Confirm { .. }));
        send(&mut app, Message::Confirm(false));
        assert_eq!(notice(&app), "Deletion cancelled.");
        assert_eq!(Flight::list_all(&app.connection).unwrap().len(), 10);

        send(&mut app, Message::Choose(MenuAction::DeleteFlight));
        send(&mut app, Message::Picked(Choice::Flight(101.into())));
        send(&mut app, Message::Confirm(true));
        assert_eq!(notice(&app), "[Success] Flight deleted.");
        assert!(Flight::load(&app.connection, 101.into()).is_err());
    }

    #[test]
    fn deleting_a_vanished_flight_reports_an_error() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::DeleteFlight));
        send(&mut app, Message::Picked(Choice::Flight(101.into())));
        assert!(Flight::delete(&app.connection, 101.into()).unwrap());

        send(&mut app, Message::Confirm(true));
        assert_menu(&app, Menu::Main);
        assert!(app.notice.as_ref().unwrap().is_error);
        assert_eq!(
            notice(&app),
            "[Error] Flight no longer exists; nothing was deleted."
        );
    }

    #[test]
    fn report_rows_can_be_stepped_through() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::FlightFilter));
        send(&mut app, Message::Choose(MenuAction::Filter(FilterKind::All)));
        send(&mut app, Message::IncrementItem);
        send(&mut app, Message::IncrementItem);
        send(&mut app, Message::DecrementItem);
        let State::Report { table_state, .. } = &app.state else {
            panic!("expected a report, found {:?}", app.state);
        };
        assert_eq!(table_state.selected(), Some(1));
    }

    #[test]
    fn deleting_a_used_destination_warns_and_detaches_flights() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Destinations));
        send(&mut app, Message::Choose(MenuAction::DeleteDestination));
        send(&mut app, Message::Picked(Choice::Destination(1.into())));
        let State::Confirm { prompt, .. } = &app.state else {
            panic!("expected a confirmation, found {:?}", app.state);
        };
        assert!(prompt.contains("1 flight(s)"));

        send(&mut app, Message::Confirm(true));
        assert_menu(&app, Menu::Destinations);
        let flight = Flight::load(&app.connection, 101.into()).unwrap();
        assert_eq!(flight.dest_id(), None);
    }

    #[test]
    fn deleting_an_unused_pilot_needs_no_confirmation() {
        let mut app = seeded_app();
        Flight::delete(&app.connection, 101.into()).unwrap();
        send(&mut app, Message::OpenMenu(Menu::Pilots));
        send(&mut app, Message::Choose(MenuAction::DeletePilot));
        send(&mut app, Message::Picked(Choice::Pilot(1.into())));

        assert_menu(&app, Menu::Pilots);
        assert_eq!(notice(&app), "[Success] Pilot deleted.");
        assert_eq!(Pilot::list_all(&app.connection).unwrap().len(), 9);
    }

    #[test]
    fn new_destination_then_assign_an_existing_flight() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Destinations));
        send(&mut app, Message::Choose(MenuAction::AddDestination));
        type_text(&mut app, "Lisbon");
        send(&mut app, Message::NextField);
        type_text(&mut app, "lis");
        send(&mut app, Message::CommitForm);

        let lisbon = Destination::list_all(&app.connection)
            .unwrap()
            .into_iter()
            .find(|destination| destination.city() == "Lisbon")
            .unwrap();
        assert_eq!(lisbon.airport_code().as_str(), "LIS");
        assert!(notice(&app).starts_with("[Success] New destination 'Lisbon' (LIS)"));

        send(&mut app, Message::Confirm(true));
        assert_menu(&app, Menu::DestinationFlight(lisbon.id()));
        send(
            &mut app,
            Message::Choose(MenuAction::AssignExistingFlight(lisbon.id())),
        );
        send(&mut app, Message::Picked(Choice::Flight(102.into())));
        send(&mut app, Message::Picked(Choice::Pilot(3.into())));

        assert_menu(&app, Menu::Destinations);
        assert_eq!(
            notice(&app),
            "[Success] Flight FL-102 assigned to Lisbon with Pilot David Chen"
        );
        let flight = Flight::load(&app.connection, 102.into()).unwrap();
        assert_eq!(flight.dest_id(), Some(lisbon.id()));
        assert_eq!(flight.pilot_id(), Some(3.into()));
    }

    #[test]
    fn new_destination_then_create_a_flight_for_it() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Destinations));
        send(&mut app, Message::Choose(MenuAction::AddDestination));
        type_text(&mut app, "Oslo");
        send(&mut app, Message::NextField);
        type_text(&mut app, "OSL");
        send(&mut app, Message::CommitForm);
        let State::Confirm {
            action: ConfirmAction::AssignFlightTo(oslo),
            ..
        } = app.state
        else {
            panic!("expected the assign-flight question, found {:?}", app.state);
        };

        send(&mut app, Message::Confirm(true));
        send(&mut app, Message::Choose(MenuAction::CreateFlightFor(oslo)));
        type_text(&mut app, "NO42");
        send(&mut app, Message::NextField);
        type_text(&mut app, "2026-07-04");
        send(&mut app, Message::CommitForm);
        // the destination is already known, so only the pilot is asked for
        send(&mut app, Message::Picked(Choice::Nothing));

        assert_menu(&app, Menu::Destinations);
        assert_eq!(
            notice(&app),
            "[Success] New flight NO42 created and assigned to Oslo"
        );
        assert_eq!(Destination::flight_count(&app.connection, oslo).unwrap(), 1);
    }

    #[test]
    fn declining_to_assign_a_flight_returns_to_destinations() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Destinations));
        send(&mut app, Message::Choose(MenuAction::AddDestination));
        type_text(&mut app, "Oslo");
        send(&mut app, Message::NextField);
        type_text(&mut app, "OSL");
        send(&mut app, Message::CommitForm);
        send(&mut app, Message::Back);
        assert_menu(&app, Menu::Destinations);
    }

    #[test]
    fn duplicate_airport_code_is_rejected() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Destinations));
        send(&mut app, Message::Choose(MenuAction::AddDestination));
        type_text(&mut app, "Heathrow");
        send(&mut app, Message::NextField);
        type_text(&mut app, "lhr");
        send(&mut app, Message::CommitForm);

        assert_eq!(form(&app).focus, 1);
        assert!(form(&app).error.as_deref().unwrap().contains("LHR"));
        assert_eq!(Destination::list_all(&app.connection).unwrap().len(), 10);
    }

    #[test]
    fn edit_destination_may_keep_its_own_code() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Destinations));
        send(&mut app, Message::Choose(MenuAction::UpdateDestination));
        send(&mut app, Message::Picked(Choice::Destination(1.into())));
        clear_field(&mut app);
        type_text(&mut app, "London Heathrow");
        send(&mut app, Message::CommitForm);

        assert_eq!(
            notice(&app),
            "[Success] Destination updated to: London Heathrow (LHR)"
        );
    }

    #[test]
    fn pilots_are_added_with_unique_licenses() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Pilots));
        send(&mut app, Message::Choose(MenuAction::AddPilot));
        type_text(&mut app, "Ada Lovelace");
        send(&mut app, Message::NextField);
        type_text(&mut app, "lic-1001");
        send(&mut app, Message::CommitForm);
        assert!(form(&app).error.as_deref().unwrap().contains("LIC-1001"));

        clear_field(&mut app);
        type_text(&mut app, "lic-2000");
        send(&mut app, Message::CommitForm);
        assert_menu(&app, Menu::Pilots);
        assert_eq!(notice(&app), "[Success] Pilot Ada Lovelace (LIC-2000) added.");
    }

    #[test]
    fn edit_pilot_without_changes() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::Pilots));
        send(&mut app, Message::Choose(MenuAction::UpdatePilot));
        send(&mut app, Message::Picked(Choice::Pilot(1.into())));
        send(&mut app, Message::CommitForm);
        assert_eq!(notice(&app), "[Success] Pilot Mark Jones (LIC-1001) updated.");
    }

    #[test]
    fn filter_by_city() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::FlightFilter));
        send(&mut app, Message::Choose(MenuAction::Filter(FilterKind::City)));
        assert!(form(&app).hint.as_deref().unwrap().contains("London"));
        type_text(&mut app, "lon");
        send(&mut app, Message::CommitForm);

        let report = report(&app);
        assert_eq!(report.title, "RESULTS: 1 flight(s) found");
        assert_eq!(report.sections[0].rows[0][0], "FL-101");

        send(&mut app, Message::Back);
        assert_menu(&app, Menu::FlightFilter);
    }

    #[test]
    fn filter_by_partial_date() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::FlightFilter));
        send(&mut app, Message::Choose(MenuAction::Filter(FilterKind::Date)));
        type_text(&mut app, "05-1o");
        send(&mut app, Message::CommitForm);
        assert!(form(&app).error.is_some());

        send(&mut app, Message::Backspace);
        type_text(&mut app, "0");
        send(&mut app, Message::CommitForm);
        assert_eq!(report(&app).title, "RESULTS: 2 flight(s) found");
    }

    #[test]
    fn view_all_flights() {
        let mut app = seeded_app();
        send(&mut app, Message::OpenMenu(Menu::FlightFilter));
        send(&mut app, Message::Choose(MenuAction::Filter(FilterKind::All)));
        assert_eq!(report(&app).sections[0].rows.len(), 10);
    }

    #[test]
    fn pilot_schedule_without_flights() {
        let mut app = seeded_app();
        Flight::delete(&app.connection, 101.into()).unwrap();
        send(&mut app, Message::Choose(MenuAction::PilotSchedule));
        send(&mut app, Message::Picked(Choice::Pilot(1.into())));

        let section = &report(&app).sections[0];
        assert!(section.rows.is_empty());
        assert_eq!(section.empty, "No flights assigned to this pilot.");
    }

    #[test]
    fn summaries_cover_destinations_and_pilots() {
        let mut app = seeded_app();
        send(&mut app, Message::Choose(MenuAction::Summaries));
        let report = report(&app);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].rows.len(), 10);
        assert_eq!(report.sections[1].rows.len(), 10);
    }

    #[test]
    fn empty_pick_list_reports_an_error() {
        let connection = airline_data::open_in_memory().unwrap();
        airline_data::apply_schema(&connection).unwrap();
        let mut app = App::with_connection(connection, false);
        send(&mut app, Message::OpenMenu(Menu::Main));
        send(&mut app, Message::Choose(MenuAction::UpdateFlight));

        assert_menu(&app, Menu::Main);
        assert!(app.notice.as_ref().unwrap().is_error);
    }

    #[test]
    fn leaving_the_main_menu_exits() {
        let mut app = seeded_app();
        send(&mut app, Message::Back);
        assert!(matches!(app.state, State::Exit));
    }
}
