use std::cell::RefCell;
use std::io::Write;

use crate::command::Command;
use crate::completion;
use crate::context::Context;
use crate::env::{Env, ProcessEnv};
use crate::error::{Error, ValidationMode};
use crate::help;
use crate::option::OptionDef;

/// A command-line application: a command tree plus run-time switches.
#[derive(Debug, Clone)]
pub struct App {
    name: String,
    root: Command,
    shell_completion: bool,
    validation: ValidationMode,
    help_option: OptionDef,
    completion_option: OptionDef,
}

impl App {
    /// Wrap `root`, adding the `help` and `help-commands` commands to it
    /// unless it already has children with those names.
    pub fn new(name: impl Into<String>, root: Command) -> Self {
        let mut root = root;
        root.append_builtin(help::help_command());
        root.append_builtin(help::help_commands_command());
        Self {
            name: name.into(),
            root,
            shell_completion: false,
            validation: ValidationMode::default(),
            help_option: help::help_option(),
            completion_option: completion::completion_option(),
        }
    }

    /// Accept `--generate-shell-completion` and `_CLI_SHELL_COMPLETION`.
    pub fn enable_shell_completion(mut self, enabled: bool) -> Self {
        self.shell_completion = enabled;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    pub fn shell_completion_enabled(&self) -> bool {
        self.shell_completion
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation
    }

    pub(crate) fn help_option(&self) -> &OptionDef {
        &self.help_option
    }

    pub(crate) fn completion_option(&self) -> &OptionDef {
        &self.completion_option
    }

    /// Run with the process environment, writing to stdout.
    ///
    /// `args` excludes the program name.
    pub fn run(&self, args: &[String]) -> Result<(), Error> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.run_with(args, &ProcessEnv, &mut lock)
    }

    /// Run with an explicit environment and output destination.
    pub fn run_with(&self, args: &[String], env: &dyn Env, out: &mut dyn Write) -> Result<(), Error> {
        tracing::debug!(app = %self.name, ?args, "running");
        let out = RefCell::new(out);
        let result = Context::new(self, args, env, &out).and_then(|ctx| ctx.run());
        out.borrow_mut().flush()?;
        result
    }

    /// Run with the process arguments and exit.
    ///
    /// Errors are printed to stderr unless they are clean exit requests.
    pub fn run_main(&self) -> ! {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let code = match self.run(&args) {
            Ok(()) => 0,
            Err(err) => {
                let message = err.to_string();
                if !message.is_empty() {
                    eprintln!("{}: {message}", self.name);
                }
                err.exit_code()
            }
        };
        std::process::exit(code)
    }
}
