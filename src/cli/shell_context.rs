use std::path::{Path, PathBuf};

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use tracing::warn;

use crate::{
    config::{Config, ConfigManager},
    core::{clock::SystemClock, BudgetTracker},
    notify::{ConsoleSink, NotificationSink, OutboxEmailSink},
    storage::{JsonFileBackend, ScopedStore},
    utils::paths,
};

use super::commands;
use super::core::{CliError, CommandError, LoopControl};
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

pub type FileTracker = BudgetTracker<ScopedStore<JsonFileBackend>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub tracker: FileTracker,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub base_dir: PathBuf,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, &paths::app_data_dir())
    }

    pub fn with_base_dir(mode: CliMode, base: &Path) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base);
        let config = config_manager.load()?;
        let store = ScopedStore::new(JsonFileBackend::new(base)?);
        let mut tracker = BudgetTracker::new(
            store,
            SystemClock,
            config.user_scope(),
            config.alert_policy,
        )
        .with_currency(config.currency_code());
        tracker.set_sinks(build_sinks(&config, base));
        if let Err(err) = tracker.store().register_user(tracker.user()) {
            warn!(error = %err, "could not record the active user");
        }

        Ok(Self {
            mode,
            registry,
            tracker,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            base_dir: base.to_path_buf(),
            last_command: None,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        format!("budget-buddy [{}]> ", self.tracker.user())
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    /// The e-mail outbox for the current settings, used to read alert history.
    pub fn outbox(&self) -> OutboxEmailSink {
        outbox_sink(&self.config, &self.base_dir)
    }

    /// Re-applies the loaded config to the tracker after `config set`.
    pub fn apply_config(&mut self) {
        self.tracker.set_policy(self.config.alert_policy);
        self.tracker.set_currency(self.config.currency_code());
        self.tracker
            .set_sinks(build_sinks(&self.config, &self.base_dir));
    }

    /// Asks before a destructive action. Script mode needs `--yes` instead.
    pub fn confirm(&self, prompt: &str, args: &[&str]) -> Result<bool, CommandError> {
        if args.iter().any(|arg| matches!(*arg, "--yes" | "-y")) {
            return Ok(true);
        }
        match self.mode {
            CliMode::Interactive => cli_io::confirm_action(&self.theme, prompt, false),
            CliMode::Script => Err(CommandError::InvalidArguments(
                "pass --yes to confirm in script mode".into(),
            )),
        }
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

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{best}`?"));
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
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other);
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

fn outbox_sink(config: &Config, base: &Path) -> OutboxEmailSink {
    OutboxEmailSink::new(
        paths::outbox_dir_in(base),
        config.notifications.email.clone(),
        config.notifications.email_enabled,
    )
}

fn build_sinks(config: &Config, base: &Path) -> Vec<Box<dyn NotificationSink>> {
    vec![Box::new(ConsoleSink), Box::new(outbox_sink(config, base))]
}
