use std::collections::HashMap;
use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::cli::registry::CommandRegistry;
use crate::config::Config;
use crate::core::services::AlertPolicy;
use crate::domain::CategoryRegistry;

/// Set to read commands from stdin instead of an interactive prompt.
pub const SCRIPT_ENV: &str = "BUDGET_BUDDY_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = match std::env::var_os(SCRIPT_ENV) {
        Some(_) => CliMode::Script,
        None => CliMode::Interactive,
    };
    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::new(&context.registry)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output_info("Budget Buddy shell. Type `help` for commands.");

    while context.running {
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line).ok();
        if run_line(context, line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one command per line; blank lines and `#` comments are skipped.
fn run_script(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if run_line(context, line)? == LoopControl::Exit || !context.running {
            break;
        }
    }
    Ok(())
}

/// Executes a line, printing command errors instead of ending the session.
fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match execute(context, line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            context.print_warning(&format!("Could not read `{line}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((name, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.last_command = Some(line.to_string());

    let control = context.dispatch(&name.to_lowercase(), name, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Words offered by tab completion, keyed by what precedes the cursor.
struct CompletionTable {
    commands: Vec<&'static str>,
    subcommands: HashMap<&'static str, &'static [&'static str]>,
}

impl CompletionTable {
    fn from_registry(registry: &CommandRegistry) -> Self {
        let mut commands: Vec<&'static str> = registry.names().collect();
        commands.sort_unstable();
        let subcommands = registry
            .list()
            .into_iter()
            .filter(|entry| !entry.subcommands.is_empty())
            .map(|entry| (entry.name, entry.subcommands))
            .collect();
        Self {
            commands,
            subcommands,
        }
    }

    /// Candidates for the word after `previous`, or `None` when that slot
    /// holds a file path.
    fn words_after(&self, previous: &[String]) -> Option<Vec<String>> {
        let previous: Vec<&str> = previous.iter().map(String::as_str).collect();
        let words = match previous.as_slice() {
            [] | ["help"] => owned(&self.commands),
            [command] => self
                .subcommands
                .get(*command)
                .map(|subs| owned(subs))
                .unwrap_or_default(),
            ["expense", "add", _] | ["budget", "set"] => category_ids(),
            ["config", "set"] => owned(&Config::KEYS),
            ["config", "set", "alert_policy" | "policy"] => {
                owned(&[AlertPolicy::Banded.as_str(), AlertPolicy::EveryCrossed.as_str()])
            }
            ["config", "set", "email_enabled"] => owned(&["true", "false"]),
            ["data", "export" | "import"] => return None,
            _ => Vec::new(),
        };
        Some(words)
    }

    fn candidates(&self, previous: &[String], needle: &str) -> Option<Vec<String>> {
        let needle = needle.to_lowercase();
        self.words_after(previous).map(|words| {
            words
                .into_iter()
                .filter(|word| word.starts_with(&needle))
                .collect()
        })
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

fn category_ids() -> Vec<String> {
    CategoryRegistry::all()
        .iter()
        .map(|category| category.id.to_string())
        .collect()
}

struct ShellHelper {
    table: CompletionTable,
    files: FilenameCompleter,
}

impl ShellHelper {
    fn new(registry: &CommandRegistry) -> Self {
        Self {
            table: CompletionTable::from_registry(registry),
            files: FilenameCompleter::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before
            .rfind(|c: char| c.is_ascii_whitespace())
            .map_or(0, |index| index + 1);
        let previous: Vec<String> = before[..start]
            .split_ascii_whitespace()
            .map(str::to_lowercase)
            .collect();

        match self.table.candidates(&previous, &before[start..]) {
            Some(words) => {
                let pairs = words
                    .into_iter()
                    .map(|word| Pair {
                        display: word.clone(),
                        replacement: word,
                    })
                    .collect();
                Ok((start, pairs))
            }
            None => self.files.complete(line, pos, ctx),
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}
