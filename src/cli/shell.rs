//! The read-eval loop: rustyline at a terminal, plain stdin lines in script mode.

use std::{
    borrow::Cow,
    io::{self, BufRead},
    path::PathBuf,
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use tracing::debug;

use crate::CliError;

use super::context::{CliMode, CommandError, LoopControl, ShellContext};
use super::output;

/// Environment variable switching the shell to line-by-line stdin mode.
pub const SCRIPT_ENV: &str = "TRIO_CLI_SCRIPT";
const HISTORY_FILE: &str = "history.txt";

/// Second words offered by tab completion.
const SUBCOMMANDS: &[(&str, &[&str])] = &[
    ("month", &["next", "prev"]),
    ("entry", &["add", "remove", "list"]),
    ("allocation", &["show", "set", "cut", "reset"]),
    ("goal", &["list", "show", "create", "edit", "delete", "add", "remove"]),
    ("backup", &["list", "restore"]),
    ("config", &["show", "set"]),
];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    let history = history_path(context);
    if editor.load_history(&history).is_err() {
        debug!(path = %history.display(), "no shell history yet");
    }

    output::section(format!("Trio Budget {}", env!("CARGO_PKG_VERSION")));
    output::hint("Type `help` to list commands.");

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.trim()).ok();
                match handle_line(context, &line) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Err(err) = editor.save_history(&history) {
        debug!(error = %err, "could not save shell history");
    }
    Ok(())
}

/// Runs every line of `input`; a failing line is reported with its number
/// and the script carries on.
fn run_script(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    for (index, line) in input.lines().enumerate() {
        if !context.running {
            break;
        }
        match handle_line(context, &line?) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => {
                debug!(line = index + 1, "script command failed");
                context.report_error(err)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let tokens = match shell_words::split(trimmed) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse `{trimmed}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(trimmed.to_string());
    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

fn history_path(context: &ShellContext) -> PathBuf {
    context.paths.home.join(HISTORY_FILE)
}

struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    /// Candidates for the word being typed, given the words before it.
    fn candidates(&self, previous: &[&str], needle: &str) -> Vec<&'static str> {
        let pool: &[&'static str] = match previous {
            [] => &self.commands,
            [command] => SUBCOMMANDS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(command))
                .map(|(_, words)| *words)
                .unwrap_or_default(),
            _ => &[],
        };
        let needle = needle.to_ascii_lowercase();
        pool.iter()
            .copied()
            .filter(|word| word.starts_with(&needle))
            .collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let previous: Vec<&str> = prefix[..start].split_whitespace().collect();
        let candidates = self
            .candidates(&previous, &prefix[start..])
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
