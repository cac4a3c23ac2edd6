use std::{path::PathBuf, sync::Arc};

use dialoguer::theme::ColorfulTheme;

use cuotas_config::{Config, ConfigManager};
use cuotas_core::Clock;
use cuotas_storage_json::JsonRosterStorage;

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// State shared by every command of one shell session.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub home: PathBuf,
    pub storage: JsonRosterStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub last_command: Option<String>,
    pub running: bool,
}
