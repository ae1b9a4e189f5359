mod actions;
mod update;
mod view;

use std::path::Path;

use anyhow::{Context as _, Result, anyhow};
use glob::glob;
use log::info;
use rusqlite::Connection;

use crate::tui_app::{Notice, State};

#[derive(Debug)]
pub(crate) struct App {
    pub(crate) connection: Connection,
    pub(crate) state: State,
    /// Outcome of the last operation, shown until the next one starts
    pub(crate) notice: Option<Notice>,
    pub(crate) logging_enabled: bool,
}

impl App {
    /// Open the database at `db_path`.
    ///
    /// A database which does not exist yet is created with the schema applied and,
    /// if `seed` is set, the sample data loaded.
    pub(crate) fn new(
        db_path: impl AsRef<Path>,
        logging_enabled: bool,
        seed: bool,
    ) -> Result<Self> {
        let db_path = std::path::absolute(db_path).context("absolutizing path")?;

        let db_exists = std::fs::exists(&db_path).context("checking for db path existence")?;

        // ensure parent path exists
        let parent = db_path
            .parent()
            .ok_or(anyhow!("cannot use `/` as the db"))?;
        std::fs::create_dir_all(parent).context("creating db parent dir")?;

        let db_path = db_path
            .to_str()
            .context("db_path could not be represented as unicode")?;
        let connection = airline_data::open(db_path).context("connecting to database")?;

        if !db_exists {
            Self::initialize(&connection, seed)
                .context("initializing new database file")
                .inspect_err(|_err| {
                    // best effort
                    // first the db itself
                    let _ = std::fs::remove_file(db_path);
                    // then ancillary files by glob if necessary
                    if let Ok(paths) = glob(&format!("{db_path}*")) {
                        for path in paths.flatten() {
                            let _ = std::fs::remove_file(path);
                        }
                    }
                })?;
            info!("db_path" = db_path, seed; "created new database");
        }

        Ok(Self::with_connection(connection, logging_enabled))
    }

    /// Wrap an already-initialized connection
    pub(crate) fn with_connection(connection: Connection, logging_enabled: bool) -> Self {
        Self {
            connection,
            state: State::Initial,
            notice: None,
            logging_enabled,
        }
    }

    fn initialize(connection: &Connection, seed: bool) -> Result<()> {
        airline_data::apply_schema(connection).context("applying schema")?;
        if seed {
            airline_data::seed_sample_data(connection).context("seeding sample data")?;
        }
        Ok(())
    }
}
