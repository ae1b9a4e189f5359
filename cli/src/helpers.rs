use anyhow::{Context as _, Result};
use ratatui::DefaultTerminal;

/// Enter the alternate screen in raw mode.
///
/// This also installs a panic hook which restores the terminal before the panic message prints.
pub(crate) fn init_terminal() -> Result<DefaultTerminal> {
    ratatui::try_init().context("entering raw mode")
}

pub(crate) fn restore_terminal() -> Result<()> {
    ratatui::try_restore().context("leaving raw mode")
}
