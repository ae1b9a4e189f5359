use std::{path::PathBuf, sync::LazyLock};

static DEFAULT_DB_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    // fall back to the working directory on systems without a local data dir
    let mut path = dirs::data_local_dir().unwrap_or_default();
    path.push("airline");
    path.push("airline_data.db");
    path
});

#[derive(Debug, Clone, Copy, derive_more::Display, clap::ValueEnum)]
#[display(rename_all = "snake_case")]
pub(crate) enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for log::LevelFilter {
    fn from(value: Level) -> Self {
        match value {
            Level::Trace => log::LevelFilter::Trace,
            Level::Debug => log::LevelFilter::Debug,
            Level::Info => log::LevelFilter::Info,
            Level::Warn => log::LevelFilter::Warn,
            Level::Error => log::LevelFilter::Error,
        }
    }
}

/// Manage airline flights, pilots and destinations.
#[derive(Debug, clap::Parser)]
pub(crate) struct Args {
    /// Path to the database
    ///
    /// A missing file is created with the schema applied.
    #[arg(short='p', long, default_value = DEFAULT_DB_PATH.clone().into_os_string())]
    pub(crate) db_path: PathBuf,

    /// Enable logging
    ///
    /// If this flag is set without an explicit level argument, defaults to "info".
    #[arg(short, long, value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info")]
    pub(crate) log: Option<Level>,

    /// Do not load the sample pilots, destinations and flights into a new database
    #[arg(long)]
    pub(crate) no_seed: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["airline"]).unwrap();
        assert!(args.db_path.ends_with("airline/airline_data.db"));
        assert!(args.log.is_none());
        assert!(!args.no_seed);
    }

    #[test]
    fn bare_log_flag_means_info() {
        let args = Args::try_parse_from(["airline", "-l", "-p", "/tmp/x.db", "--no-seed"]).unwrap();
        assert!(matches!(args.log, Some(Level::Info)));
        assert_eq!(args.db_path, PathBuf::from("/tmp/x.db"));
        assert!(args.no_seed);
    }

    #[test]
    fn explicit_log_level() {
        let args = Args::try_parse_from(["airline", "--log", "debug"]).unwrap();
        assert_eq!(
            log::LevelFilter::from(args.log.unwrap()),
            log::LevelFilter::Debug
        );
    }
}
