use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::{COMMANDS, CommandSpec};

/// Rustyline helper for the slash commands.
///
/// Completes command names, hints the rest of a command name or its
/// argument placeholders, and colours command lines.
#[derive(Clone, Copy, Default)]
pub struct CliHelper;

impl CliHelper {
    pub fn new() -> Self {
        Self
    }

    /// Hint for a partially typed line: the remaining command name, or the
    /// argument placeholders once the name is complete.
    fn hint_for(&self, line: &str) -> Option<String> {
        if !line.starts_with('/') {
            return None;
        }

        if let Some(spec) = typed_command(line) {
            let typed_args = line[spec.name.len()..].trim_start();
            if !typed_args.is_empty() || spec.args.is_empty() {
                return None;
            }
            let sep = if line.ends_with(' ') { "" } else { " " };
            return Some(format!("{}{}", sep, spec.args));
        }

        COMMANDS
            .iter()
            .find(|spec| spec.name.starts_with(line) && spec.name.len() > line.len())
            .map(|spec| spec.name[line.len()..].to_string())
    }

    fn candidates(&self, line: &str) -> Vec<Pair> {
        COMMANDS
            .iter()
            .filter(|spec| spec.name.starts_with(line))
            .map(|spec| Pair {
                display: format!("{} {}", spec.name, spec.args).trim_end().to_string(),
                replacement: spec.name.to_string(),
            })
            .collect()
    }
}

/// The longest command name that `line` starts with as a whole word.
fn typed_command(line: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .filter(|spec| {
            line.strip_prefix(spec.name)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
        })
        .max_by_key(|spec| spec.name.len())
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            Ok((0, self.candidates(line)))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match typed_command(line) {
            Some(spec) => Owned(format!(
                "{}{}",
                spec.name.bright_cyan(),
                &line[spec.name.len()..]
            )),
            None if line.starts_with('/') => Owned(line.yellow().to_string()),
            None => Borrowed(line),
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.hint_for(line)
    }
}

impl Validator for CliHelper {}
