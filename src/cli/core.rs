//! Dispatch, error reporting and argument helpers shared by the commands.

use std::{io, path::PathBuf};

use strsim::levenshtein;

use cuotas_config::{app_home, Config, ConfigError, ConfigManager};
use cuotas_core::{authorize, CoreError};
use cuotas_domain::{Action, DebtSource};
use cuotas_storage_json::{JsonRosterStorage, StoragePaths};

pub use crate::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{set_preferences, OutputPreferences};
use super::registry::CommandEntry;
use super::system_clock::clock_for;
pub use crate::cli::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, app_home())
    }

    /// Opens configuration and roster under `home`.
    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        apply_output_preferences(&config);
        let storage = open_storage(&config, &home)?;
        let clock = clock_for(&config);
        tracing::debug!(home = %home.display(), mode = ?mode, "shell context ready");

        Ok(Self {
            mode,
            registry: commands::registry(),
            theme: dialoguer::theme::ColorfulTheme::default(),
            home,
            storage,
            config_manager,
            config,
            clock,
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn prompt(&self) -> String {
        format!("cuotas [{}]> ", self.config.role)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn debt_source(&self) -> DebtSource {
        self.config.debt_source
    }

    /// Fails with `PermissionDenied` unless the configured role allows `action`.
    pub(crate) fn require(&self, action: Action) -> Result<(), CommandError> {
        authorize(self.config.role, action).map_err(CommandError::from)
    }

    /// Asks before destructive work in interactive sessions; scripts proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    /// Persists `config` and refreshes everything derived from it.
    pub(crate) fn apply_config(&mut self, config: Config) -> Result<(), CommandError> {
        self.config_manager.save(&config)?;
        if config.resolve_data_root(&self.home) != self.config.resolve_data_root(&self.home) {
            self.storage = open_storage(&config, &self.home)?;
        }
        apply_output_preferences(&config);
        self.clock = clock_for(&config);
        self.config = config;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(first) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&first.to_lowercase(), first, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        tracing::debug!(
            command = self.last_command.as_deref().unwrap_or_default(),
            error = %err,
            "command failed"
        );
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(err @ CoreError::PermissionDenied { .. }) => {
                cli_io::print_error(err);
                cli_io::print_hint("The active role is set with `config set role <role>`.");
            }
            other => cli_io::print_error(other),
        }
        Ok(())
    }
}

fn apply_output_preferences(config: &Config) {
    set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled,
    });
}

fn open_storage(config: &Config, home: &std::path::Path) -> Result<JsonRosterStorage, CoreError> {
    JsonRosterStorage::open(StoragePaths::under(config.resolve_data_root(home)))
}

pub(crate) fn parse_id(input: &str, label: &str) -> Result<i64, CommandError> {
    input
        .trim()
        .trim_start_matches('#')
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid {} `{}`", label, input)))
}

/// First argument or a usage error naming what was missing.
pub(crate) fn required_arg<'a>(
    args: &[&'a str],
    idx: usize,
    label: &str,
) -> Result<&'a str, CommandError> {
    args.get(idx)
        .copied()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CommandError::InvalidArguments(format!("missing {}", label)))
}

/// Remaining words joined with spaces, `None` when empty.
pub(crate) fn trailing_text(args: &[&str], from: usize) -> Option<String> {
    let text = args.get(from..)?.join(" ");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Config(inner) => CommandError::Config(inner),
            CliError::Input(message) | CliError::Command(message) => {
                CommandError::InvalidArguments(message)
            }
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Config(inner) => CliError::Config(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    home: PathBuf,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, home)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_parsing_accepts_hash_prefix() {
        assert_eq!(parse_id("#12", "member id").unwrap(), 12);
        assert!(parse_id("0", "member id").is_err());
        assert!(parse_id("doce", "member id").is_err());
    }

    #[test]
    fn trailing_text_joins_words() {
        assert_eq!(
            trailing_text(&["backup", "fin", "de", "año"], 1),
            Some("fin de año".into())
        );
        assert_eq!(trailing_text(&["backup"], 1), None);
        assert_eq!(trailing_text(&[], 3), None);
    }
}
