use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::option::OptionDef;

/// Action or before hook attached to a command.
pub type ActionFn = Arc<dyn Fn(&Context<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Replaces the default completion candidates of a command.
pub type CommandCompletionFn = Arc<dyn Fn(&Context<'_>) -> Vec<String> + Send + Sync>;

/// A node in the command tree.
///
/// The root is a `Command` with an empty name.
#[derive(Clone, Default)]
pub struct Command {
    name: String,
    short_name: Option<String>,
    usage: String,
    commands: Vec<Command>,
    options: Vec<OptionDef>,
    args: Vec<OptionDef>,
    before: Option<ActionFn>,
    action: Option<ActionFn>,
    completion: Option<CommandCompletionFn>,
    builtin: bool,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn root() -> Self {
        Self::default()
    }

    /// Alternative name matched during resolution.
    pub fn short_name(mut self, alias: impl Into<String>) -> Self {
        self.short_name = Some(alias.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn subcommand(mut self, cmd: Command) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn option(mut self, opt: OptionDef) -> Self {
        self.options.push(opt);
        self
    }

    /// Positional argument, filled in declaration order.
    pub fn arg(mut self, arg: OptionDef) -> Self {
        self.args.push(arg);
        self
    }

    /// Hook run before the action of this command or any descendant.
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(f));
        self
    }

    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(f));
        self
    }

    pub fn completion<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        self.completion = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn get_usage(&self) -> &str {
        &self.usage
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn args(&self) -> &[OptionDef] {
        &self.args
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name == name || self.short_name.as_deref() == Some(name)
    }

    /// First direct child matching `name` or its short name.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.has_name(name))
    }

    pub(crate) fn before_fn(&self) -> Option<&ActionFn> {
        self.before.as_ref()
    }

    pub(crate) fn action_fn(&self) -> Option<&ActionFn> {
        self.action.as_ref()
    }

    pub(crate) fn completion_fn(&self) -> Option<&CommandCompletionFn> {
        self.completion.as_ref()
    }

    /// Synthetic commands added by the toolkit.
    pub(crate) fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub(crate) fn into_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    /// Append a synthetic child unless the name is already taken.
    pub(crate) fn append_builtin(&mut self, cmd: Command) {
        if self.find_command(cmd.name()).is_some() {
            tracing::debug!(command = cmd.name(), "keeping user-defined command");
            return;
        }
        self.commands.push(cmd.into_builtin());
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("usage", &self.usage)
            .field("commands", &self.commands)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("before", &self.before.is_some())
            .field("action", &self.action.is_some())
            .field("completion", &self.completion.is_some())
            .field("builtin", &self.builtin)
            .finish()
    }
}
