//! REPL command parsing.

use querycraft_core::error::{QueryCraftError, Result};

/// A slash command as shown in help, completion and hints.
pub struct CommandSpec {
    pub name: &'static str,
    /// Argument placeholders, empty when the command takes none.
    pub args: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "/new", args: "[project]", summary: "start a conversation (optionally in a project)" },
    CommandSpec { name: "/list", args: "", summary: "list conversations" },
    CommandSpec { name: "/switch", args: "<id>", summary: "make a conversation current" },
    CommandSpec { name: "/rename", args: "<name>", summary: "rename the current conversation" },
    CommandSpec { name: "/delete", args: "[id]", summary: "delete a conversation (default: current)" },
    CommandSpec { name: "/history", args: "", summary: "show the current conversation" },
    CommandSpec { name: "/project new", args: "<name> [| desc]", summary: "create a project" },
    CommandSpec { name: "/project delete", args: "<id>", summary: "delete a project (conversations are kept)" },
    CommandSpec { name: "/projects", args: "", summary: "list projects" },
    CommandSpec { name: "/select", args: "<id>", summary: "select a project" },
    CommandSpec { name: "/link", args: "<project>", summary: "link the current conversation to a project" },
    CommandSpec { name: "/unlink", args: "", summary: "unlink the current conversation" },
    CommandSpec { name: "/file add", args: "<name> <size> <url>", summary: "attach a file to the selected project" },
    CommandSpec { name: "/file rm", args: "<id>", summary: "remove a file" },
    CommandSpec { name: "/files", args: "", summary: "list files of the selected project" },
    CommandSpec { name: "/help", args: "", summary: "show this help" },
];

/// Help text, one entry per line.
pub fn help_lines() -> Vec<String> {
    let usage = |spec: &CommandSpec| {
        if spec.args.is_empty() {
            spec.name.to_string()
        } else {
            format!("{} {}", spec.name, spec.args)
        }
    };
    let width = COMMANDS.iter().map(|spec| usage(spec).len()).max().unwrap_or(0);

    let mut lines = vec![
        "Plain text sends a message to the current conversation.".to_string(),
        String::new(),
    ];
    lines.extend(
        COMMANDS
            .iter()
            .map(|spec| format!("  {:<width$}  {}", usage(spec), spec.summary)),
    );
    lines.push(format!("  {:<width$}  leave", "quit | exit"));
    lines.push(String::new());
    lines.push("Ids may be abbreviated to any unique prefix.".to_string());
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    New { project: Option<String> },
    List,
    Switch(String),
    Rename(String),
    Delete(Option<String>),
    History,
    ProjectNew { name: String, description: String },
    ProjectDelete(String),
    Projects,
    Select(String),
    Link(String),
    Unlink,
    FileAdd { name: String, size: u64, url: String },
    FileRemove(String),
    Files,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line == "quit" || line == "exit" {
        return Ok(Some(Command::Quit));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Say(line.to_string())));
    };

    let (name, args) = split_word(rest);
    let command = match name {
        "new" => Command::New {
            project: optional(args),
        },
        "list" => Command::List,
        "switch" => Command::Switch(required(args, "/switch <id>")?),
        "rename" => Command::Rename(required(args, "/rename <name>")?),
        "delete" => Command::Delete(optional(args)),
        "history" => Command::History,
        "projects" => Command::Projects,
        "select" => Command::Select(required(args, "/select <id>")?),
        "link" => Command::Link(required(args, "/link <project>")?),
        "unlink" => Command::Unlink,
        "files" => Command::Files,
        "help" => Command::Help,
        "project" => parse_project(args)?,
        "file" => parse_file(args)?,
        other => {
            return Err(QueryCraftError::validation(format!(
                "Unknown command '/{}'. Type /help",
                other
            )));
        }
    };
    Ok(Some(command))
}

fn parse_project(args: &str) -> Result<Command> {
    let (action, rest) = split_word(args);
    match action {
        "new" => {
            let (name, description) = match rest.split_once('|') {
                Some((name, description)) => (name.trim(), description.trim()),
                None => (rest, ""),
            };
            Ok(Command::ProjectNew {
                name: required(name, "/project new <name> [| description]")?,
                description: description.to_string(),
            })
        }
        "delete" => Ok(Command::ProjectDelete(required(rest, "/project delete <id>")?)),
        _ => Err(QueryCraftError::validation(
            "Usage: /project new <name> [| description] or /project delete <id>",
        )),
    }
}

fn parse_file(args: &str) -> Result<Command> {
    const ADD_USAGE: &str = "/file add <name> <size> <url>";

    let (action, rest) = split_word(args);
    match action {
        "add" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let [name, size, url] = parts.as_slice() else {
                return Err(usage(ADD_USAGE));
            };
            let size = size
                .parse::<u64>()
                .map_err(|_| QueryCraftError::validation(format!("Invalid size '{}'", size)))?;
            Ok(Command::FileAdd {
                name: name.to_string(),
                size,
                url: url.to_string(),
            })
        }
        "rm" => Ok(Command::FileRemove(required(rest, "/file rm <id>")?)),
        _ => Err(usage("/file add <name> <size> <url> or /file rm <id>")),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn optional(args: &str) -> Option<String> {
    let args = args.trim();
    (!args.is_empty()).then(|| args.to_string())
}

fn required(args: &str, usage_text: &str) -> Result<String> {
    optional(args).ok_or_else(|| usage(usage_text))
}

fn usage(text: &str) -> QueryCraftError {
    QueryCraftError::validation(format!("Usage: {}", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command_with_placeholders() {
        let help = help_lines();
        for spec in COMMANDS {
            assert!(
                help.iter().any(|line| line.trim_start().starts_with(spec.name)),
                "{} missing from help",
                spec.name
            );
        }
        assert!(help.iter().any(|line| line.contains("/file add <name> <size> <url>")));
    }

    #[test]
    fn test_every_listed_command_parses() {
        for spec in COMMANDS {
            let line = match spec.name {
                "/file add" => "/file add a.vcf 1 file:///a.vcf".to_string(),
                name if spec.args.starts_with('<') => format!("{} x", name),
                name => name.to_string(),
            };
            assert!(parse(&line).is_ok(), "{} did not parse", line);
        }
    }

    fn parsed(line: &str) -> Command {
        parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_plain_text() {
        assert!(parse("   ").unwrap().is_none());
        assert_eq!(parsed("  hello there "), Command::Say("hello there".to_string()));
        assert_eq!(parsed("exit"), Command::Quit);
    }

    #[test]
    fn test_conversation_commands() {
        assert_eq!(parsed("/new"), Command::New { project: None });
        assert_eq!(
            parsed("/new ab12"),
            Command::New {
                project: Some("ab12".to_string())
            }
        );
        assert_eq!(parsed("/rename  PRS  notes "), Command::Rename("PRS  notes".to_string()));
        assert_eq!(parsed("/delete"), Command::Delete(None));
        assert!(parse("/switch").unwrap_err().is_validation());
    }

    #[test]
    fn test_project_new_with_description() {
        assert_eq!(
            parsed("/project new Cohort study | UK Biobank subset"),
            Command::ProjectNew {
                name: "Cohort study".to_string(),
                description: "UK Biobank subset".to_string(),
            }
        );
        assert_eq!(
            parsed("/project new Solo"),
            Command::ProjectNew {
                name: "Solo".to_string(),
                description: String::new(),
            }
        );
        assert!(parse("/project new | only desc").is_err());
    }

    #[test]
    fn test_file_commands() {
        assert_eq!(
            parsed("/file add chr1.vcf 2048 file:///data/chr1.vcf"),
            Command::FileAdd {
                name: "chr1.vcf".to_string(),
                size: 2048,
                url: "file:///data/chr1.vcf".to_string(),
            }
        );
        assert!(parse("/file add chr1.vcf big file:///x").is_err());
        assert!(parse("/file add chr1.vcf").is_err());
        assert_eq!(parsed("/file rm f1"), Command::FileRemove("f1".to_string()));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse("/frobnicate").unwrap_err();
        assert!(err.to_string().contains("/frobnicate"));
    }
}
