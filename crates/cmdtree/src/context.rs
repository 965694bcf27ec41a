use std::cell::{RefCell, RefMut};
use std::io::Write;

use cmdtree_flags::{OptionSet, ParseError, Value};

use crate::app::App;
use crate::command::Command;
use crate::completion::{self, COMPLETION_OPTION};
use crate::env::Env;
use crate::error::{Error, ValidationMode};
use crate::help;
use crate::option::OptionDef;
use crate::registry::Registry;
use crate::resolve::{path_string, resolve};

/// Per-invocation state handed to actions, hooks, completion and validation
/// functions.
///
/// Typed accessors return the zero value of their type when the option is
/// unknown or holds a different type.
pub struct Context<'a> {
    app: &'a App,
    path: Vec<&'a Command>,
    residual: Vec<String>,
    registry: Registry<'a>,
    parse_error: Option<ParseError>,
    completion_requested: bool,
    env: &'a dyn Env,
    out: &'a RefCell<dyn Write + 'a>,
}

impl<'a> Context<'a> {
    /// Resolve `args` against the app's tree, register the path's options
    /// and parse the residual tokens.
    ///
    /// A parse failure is recorded rather than returned so completion can
    /// still run.
    pub(crate) fn new(
        app: &'a App,
        args: &[String],
        env: &'a dyn Env,
        out: &'a RefCell<dyn Write + 'a>,
    ) -> Result<Self, Error> {
        let resolution = resolve(app.root(), args);
        let mut registry = Registry::build(app, &resolution.path, env)?;

        // The shell appends the completion flag after whatever was typed,
        // which may be an option still waiting for its value.
        let mut tokens = resolution.residual.as_slice();
        let mut completion_requested = false;
        if app.shell_completion_enabled() {
            if let Some((last, rest)) = tokens.split_last() {
                if last.strip_prefix("--") == Some(COMPLETION_OPTION) {
                    tokens = rest;
                    completion_requested = true;
                }
            }
        }

        let parse_error = registry.parse(tokens).err();
        if let Some(err) = &parse_error {
            tracing::debug!(error = %err, "argument parsing failed");
        }

        Ok(Self {
            app,
            path: resolution.path,
            residual: resolution.residual,
            registry,
            parse_error,
            completion_requested,
            env,
            out,
        })
    }

    /// Same app, environment and output, resolved from a different argument list.
    pub fn reresolve(&self, args: &[String]) -> Result<Context<'a>, Error> {
        Context::new(self.app, args, self.env, self.out)
    }

    pub fn app(&self) -> &'a App {
        self.app
    }

    pub fn app_name(&self) -> &'a str {
        self.app.name()
    }

    /// Leaf of the resolved path.
    pub fn command(&self) -> &'a Command {
        self.path[self.path.len() - 1]
    }

    /// Resolved commands, root first.
    pub fn path(&self) -> &[&'a Command] {
        &self.path
    }

    /// Tokens left after command resolution, before option parsing.
    pub fn residual(&self) -> &[String] {
        &self.residual
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        self.parse_error.as_ref()
    }

    pub fn env(&self) -> &'a dyn Env {
        self.env
    }

    /// Output destination of this invocation.
    pub fn out(&self) -> RefMut<'_, dyn Write + 'a> {
        self.out.borrow_mut()
    }

    /// Parsed options of the resolved path.
    pub fn options(&self) -> &OptionSet {
        self.registry.set()
    }

    /// Declaration that was waiting for a value when parsing stopped.
    pub fn missing_value(&self) -> Option<&'a OptionDef> {
        self.registry.missing_value()
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.registry.set().lookup(name).map(|slot| slot.value())
    }

    pub fn string(&self, name: &str) -> &str {
        match self.value(name) {
            Some(Value::String(v)) => v.as_str(),
            _ => "",
        }
    }

    pub fn int(&self, name: &str) -> i64 {
        match self.value(name) {
            Some(Value::Int(v)) => *v,
            _ => 0,
        }
    }

    pub fn float(&self, name: &str) -> f64 {
        match self.value(name) {
            Some(Value::Float(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.value(name), Some(Value::Bool(true)))
    }

    pub fn string_list(&self, name: &str) -> &[String] {
        match self.value(name) {
            Some(Value::StringList(v)) => v.as_slice(),
            _ => &[],
        }
    }

    /// Whether the option was given on the command line.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.registry
            .set()
            .lookup(name)
            .is_some_and(|slot| slot.is_explicit())
    }

    /// Leftover tokens after option parsing.
    pub fn args(&self) -> &[String] {
        self.registry.set().rest()
    }

    pub fn arg(&self, n: usize) -> Option<&str> {
        self.registry.set().arg(n)
    }

    /// Dispatch the invocation.
    ///
    /// Completion mode wins over everything, then help, then parse errors,
    /// validation, before hooks root to leaf, and finally the leaf action.
    /// A leaf without an action renders its help, or fails when tokens are
    /// left over since they can only be a mistyped subcommand.
    pub(crate) fn run(&self) -> Result<(), Error> {
        if self.completion_requested || self.bool(COMPLETION_OPTION) {
            let complete = match &self.parse_error {
                None => true,
                Some(err) => err.is_missing_value(),
            };
            if complete {
                completion::show(self)?;
            }
            return Ok(());
        }

        if self.bool("help") {
            return help::show(self);
        }

        if let Some(err) = &self.parse_error {
            return Err(err.clone().into());
        }

        self.validate()?;

        for cmd in &self.path {
            if let Some(before) = cmd.before_fn() {
                before(self).map_err(|err| Error::from_callback(err, Error::Hook))?;
            }
        }

        let leaf = self.command();
        match leaf.action_fn() {
            Some(action) => {
                tracing::debug!(command = %path_string(&self.path), "running action");
                action(self).map_err(|err| Error::from_callback(err, Error::Action))
            }
            None => match self.args().first() {
                Some(token) => {
                    let mut attempted = path_string(&self.path);
                    if !attempted.is_empty() {
                        attempted.push(' ');
                    }
                    attempted.push_str(token);
                    Err(Error::UnknownCommand(attempted))
                }
                None => help::show(self),
            },
        }
    }

    /// Run validators of explicitly given options in registration order.
    fn validate(&self) -> Result<(), Error> {
        for opt in self.registry.defs() {
            let Some(validate) = opt.validation_fn() else {
                continue;
            };
            if !self.is_explicit(opt.name()) {
                continue;
            }
            if let Err(error) = validate(self, opt) {
                match self.app.validation_mode() {
                    ValidationMode::FailFast => {
                        let option = self
                            .registry
                            .set()
                            .lookup(opt.name())
                            .map(|slot| slot.display_name())
                            .unwrap_or_else(|| opt.name().to_string());
                        return Err(Error::Validation { option, error });
                    }
                    ValidationMode::Warn => {
                        tracing::warn!(option = opt.name(), "{error:#}");
                    }
                }
            }
        }
        Ok(())
    }
}
