//! Help text and the synthetic `help` and `help-commands` commands.

use serde::Serialize;

use crate::command::Command;
use crate::completion;
use crate::context::Context;
use crate::error::Error;
use crate::option::OptionDef;
use crate::registry::visible_options;

pub const HELP_COMMAND: &str = "help";
pub const HELP_COMMANDS_COMMAND: &str = "help-commands";

/// The builtin `--help, -h` option.
pub(crate) fn help_option() -> OptionDef {
    OptionDef::bool("help, h", false).usage("Show help")
}

/// `help [command...]`: show help for the named command path.
pub(crate) fn help_command() -> Command {
    Command::new(HELP_COMMAND)
        .usage("Show help for a command")
        .action(|ctx| {
            let sub = ctx.reresolve(ctx.args())?;
            let text = render(ctx.app_name(), sub.path());
            ctx.out().write_all(text.as_bytes())?;
            Ok(())
        })
        .completion(|ctx| match ctx.reresolve(ctx.args()) {
            Ok(sub) => completion::candidates(&sub),
            Err(_) => Vec::new(),
        })
}

/// `help-commands`: list every runnable command path.
pub(crate) fn help_commands_command() -> Command {
    Command::new(HELP_COMMANDS_COMMAND)
        .usage("List all commands")
        .option(
            OptionDef::bool("json", false)
                .usage("Print the listing as JSON")
                .local(),
        )
        .action(|ctx| {
            let listing = command_listing(ctx.app().root());
            let mut out = ctx.out();
            if ctx.bool("json") {
                serde_json::to_writer_pretty(&mut *out, &listing)?;
                writeln!(out)?;
                return Ok(());
            }
            let width = listing.iter().map(|e| e.path.chars().count()).max().unwrap_or(0);
            for entry in &listing {
                if entry.usage.is_empty() {
                    writeln!(out, "{}", entry.path)?;
                } else {
                    writeln!(out, "{:width$}  {}", entry.path, entry.usage)?;
                }
            }
            Ok(())
        })
}

/// Render help for the leaf of `path` to the context's output.
pub(crate) fn show(ctx: &Context<'_>) -> Result<(), Error> {
    let text = render(ctx.app_name(), ctx.path());
    ctx.out().write_all(text.as_bytes())?;
    Ok(())
}

/// Help text for the leaf of `path`.
///
/// Synthetic commands on the path are skipped, so `help --help` describes
/// the root. Sections without rows are omitted.
pub fn render(prog: &str, path: &[&Command]) -> String {
    let path: Vec<&Command> = path.iter().copied().filter(|c| !c.is_builtin()).collect();
    let Some(&leaf) = path.last() else {
        return String::new();
    };

    let mut out = format!("Usage: {prog}");
    for cmd in path.iter().skip(1) {
        out.push(' ');
        out.push_str(cmd.name());
    }
    for arg in leaf.args().iter().filter(|a| !a.is_hidden()) {
        out.push(' ');
        out.push_str(&arg.usage_form());
    }
    out.push('\n');

    let usage = leaf.get_usage().trim();
    if !usage.is_empty() {
        out.push('\n');
        out.push_str(usage);
        out.push('\n');
    }

    let subcommands: Vec<(String, String)> = leaf
        .commands()
        .iter()
        .map(|c| (c.name().to_string(), c.get_usage().to_string()))
        .collect();
    push_section(&mut out, "Subcommands", &subcommands);

    let arguments: Vec<(String, String)> = leaf
        .args()
        .iter()
        .filter(|a| !a.is_hidden())
        .map(|a| (a.name().to_string(), a.help_usage()))
        .collect();
    push_section(&mut out, "Arguments", &arguments);

    let mut options = visible_options(&path);
    options.retain(|o| !o.is_hidden());
    options.sort_by(|a, b| a.name().cmp(b.name()));
    let options: Vec<(String, String)> = options
        .iter()
        .map(|o| (o.help_name(), o.help_usage()))
        .collect();
    push_section(&mut out, "Options", &options);

    out
}

fn push_section(out: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(title);
    out.push_str(":\n");

    let width = rows.iter().map(|(left, _)| left.chars().count()).max().unwrap_or(0);
    for (left, right) in rows {
        if right.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {right}\n"));
        }
    }
}

/// One entry of the `help-commands` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandEntry {
    pub path: String,
    pub usage: String,
}

/// Every user-defined command that has an action, sorted by path.
pub fn command_listing(root: &Command) -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    collect(root, &mut Vec::new(), &mut entries);
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

fn collect<'a>(cmd: &'a Command, prefix: &mut Vec<&'a str>, entries: &mut Vec<CommandEntry>) {
    for child in cmd.commands().iter().filter(|c| !c.is_builtin()) {
        prefix.push(child.name());
        if child.has_action() {
            entries.push(CommandEntry {
                path: prefix.join(" "),
                usage: child.get_usage().to_string(),
            });
        }
        collect(child, prefix, entries);
        prefix.pop();
    }
}
