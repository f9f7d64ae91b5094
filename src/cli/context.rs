//! Runtime state shared by every command handler.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use thiserror::Error;
use tracing::debug;
use trio_config::{Config, ConfigError, ConfigManager};
use trio_core::{BudgetSession, Clock, CoreError, DocumentStore, SystemClock};
use trio_domain::RecordId;
use trio_storage_json::JsonDocumentStore;

use crate::{errors::BudgetError, utils::paths::AppPaths, CliError};

use super::{
    commands,
    output::{self, OutputPreferences},
    registry::{CommandEntry, CommandRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(BudgetError::from(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(BudgetError::from(err))
    }
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: BudgetSession,
    pub store: Arc<JsonDocumentStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
    pub config_manager: ConfigManager,
    pub paths: AppPaths,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Builds the context from `$TRIO_HOME` (or the default home) and the system clock.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, Config::resolve_home(), Arc::new(SystemClock))
    }

    pub fn with_home(mode: CliMode, home: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        crate::init_with_filter(config.log_filter.as_deref());
        output::set_preferences(OutputPreferences {
            color: config.ui_color_enabled && mode == CliMode::Interactive,
        });

        let paths = AppPaths::with_home(home, &config);
        let store = Arc::new(JsonDocumentStore::with_retention(
            paths.data_dir.clone(),
            config.effective_backup_retention(),
        )?);
        let session = open_session(&store, &clock, &config)?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        debug!(home = %paths.home.display(), data = %paths.data_dir.display(), "shell context ready");
        Ok(Self {
            mode,
            registry,
            session,
            store,
            clock,
            config,
            config_manager,
            paths,
            last_command: None,
            running: true,
        })
    }

    /// Reloads every document from disk, e.g. after a backup restore.
    pub(crate) fn reopen_session(&mut self) -> CommandResult {
        let active = self.session.active_month();
        let mut session = open_session(&self.store, &self.clock, &self.config)?;
        session.select_month(active)?;
        self.session = session;
        Ok(())
    }

    pub(crate) fn prompt(&self) -> String {
        format!("trio [{}]> ", self.session.active_month())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
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
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.closest(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        print!("Exit shell? [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(err) if err.is_persistence() => {
                output::error(&err);
                output::hint("The change is kept in memory. Run `save` to retry writing it.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }

    /// Finds a goal by id or, failing that, by case-insensitive name.
    pub(crate) fn resolve_goal(&self, arg: &str) -> Result<RecordId, CommandError> {
        let goals = self.session.goals();
        if let Ok(id) = arg.parse::<RecordId>() {
            if goals.iter().any(|goal| goal.id == id) {
                return Ok(id);
            }
        }
        let needle = arg.trim().to_lowercase();
        goals
            .iter()
            .find(|goal| goal.name.to_lowercase() == needle)
            .map(|goal| goal.id)
            .ok_or_else(|| CommandError::InvalidArguments(format!("No goal matches `{arg}`.")))
    }
}

fn open_session(
    store: &Arc<JsonDocumentStore>,
    clock: &Arc<dyn Clock>,
    config: &Config,
) -> Result<BudgetSession, CoreError> {
    let store: Arc<dyn DocumentStore> = store.clone();
    BudgetSession::open(store, Arc::clone(clock), config.effective_default_allocation())
}
