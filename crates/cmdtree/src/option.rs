//! Option declarations.
//!
//! An [`OptionDef`] is one of five variants (string, int, float, bool,
//! string list), selected by the type of its default [`Value`]. The same
//! declaration can be attached to a command as a named option
//! (`Command::option`) or as a positional argument (`Command::arg`).

use std::fmt;
use std::sync::Arc;

use cmdtree_flags::{Declaration, Kind, Value, prefixed};

use crate::context::Context;
use crate::env::Env;

/// Produces completion candidates for an option's value.
pub type CompletionFn = Arc<dyn Fn(&Context<'_>, &OptionDef) -> Vec<String> + Send + Sync>;

/// Rejects a syntactically valid but semantically invalid value.
pub type ValidationFn = Arc<dyn Fn(&Context<'_>, &OptionDef) -> anyhow::Result<()> + Send + Sync>;

/// A typed option declaration.
#[derive(Clone)]
pub struct OptionDef {
    names: Vec<String>,
    value: Value,
    value_list: Vec<String>,
    usage: String,
    env_var: Option<String>,
    hidden: bool,
    optional: bool,
    local: bool,
    completion: Option<CompletionFn>,
    validation: Option<ValidationFn>,
}

impl OptionDef {
    /// Declare an option. `names` is comma-separated; the first name is canonical.
    pub fn new(names: &str, value: Value) -> Self {
        Self {
            names: names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
            value,
            value_list: Vec::new(),
            usage: String::new(),
            env_var: None,
            hidden: false,
            optional: false,
            local: false,
            completion: None,
            validation: None,
        }
    }

    pub fn string(names: &str, default: impl Into<String>) -> Self {
        Self::new(names, Value::String(default.into()))
    }

    pub fn int(names: &str, default: i64) -> Self {
        Self::new(names, Value::Int(default))
    }

    pub fn float(names: &str, default: f64) -> Self {
        Self::new(names, Value::Float(default))
    }

    pub fn bool(names: &str, default: bool) -> Self {
        Self::new(names, Value::Bool(default))
    }

    pub fn string_list<I, S>(names: &str, default: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names,
            Value::StringList(default.into_iter().map(Into::into).collect()),
        )
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Environment variable consulted when the option is not given on the command line.
    pub fn env(mut self, key: impl Into<String>) -> Self {
        self.env_var = Some(key.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Positional arguments only: allow the argument to be left unfilled.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Do not inherit this option into subcommands.
    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Enumerated accepted values, used by [`value_list_completion`] and
    /// [`value_list_validation`].
    pub fn value_list<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_list = values.into_iter().map(Into::into).collect();
        self
    }

    /// Shorthand for `value_list` plus the matching completion and validation.
    pub fn one_of<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_list(values)
            .completion(value_list_completion)
            .validation(value_list_validation)
    }

    pub fn completion<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>, &OptionDef) -> Vec<String> + Send + Sync + 'static,
    {
        self.completion = Some(Arc::new(f));
        self
    }

    pub fn validation<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>, &OptionDef) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.validation = Some(Arc::new(f));
        self
    }

    /// Canonical name (empty if the declaration has no names).
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn default_value(&self) -> &Value {
        &self.value
    }

    pub fn get_value_list(&self) -> &[String] {
        &self.value_list
    }

    pub fn get_usage(&self) -> &str {
        &self.usage
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn completion_fn(&self) -> Option<&CompletionFn> {
        self.completion.as_ref()
    }

    pub fn validation_fn(&self) -> Option<&ValidationFn> {
        self.validation.as_ref()
    }

    /// Build the registry declaration, applying the environment variable if set.
    ///
    /// Values that do not parse for the option's type are ignored.
    pub(crate) fn declaration(&self, env: &dyn Env) -> Declaration {
        let mut value = self.value.clone();
        if let Some(key) = self.env_var.as_deref() {
            if let Some(raw) = env.var(key) {
                if let Value::StringList(items) = &mut value {
                    *items = vec![raw];
                } else if let Err(reason) = value.set(&raw) {
                    tracing::warn!(
                        option = %self.name(),
                        env = key,
                        %reason,
                        "ignoring environment value"
                    );
                }
            }
        }

        Declaration {
            names: self.names.clone(),
            usage: self.usage.clone(),
            value,
            optional: self.optional,
        }
    }

    /// Left column in help: `--name, -n`.
    pub fn help_name(&self) -> String {
        self.names
            .iter()
            .map(|n| prefixed(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Right column in help: usage text annotated with the default value.
    pub fn help_usage(&self) -> String {
        let mut out = if self.usage.trim().is_empty() {
            format!("default = {}", self.value.literal())
        } else {
            format!("{}; default = {}", self.usage.trim(), self.value.literal())
        };
        if let Some(key) = &self.env_var {
            out.push_str(&format!(" [${key}]"));
        }
        out
    }

    /// Form used in the `Usage:` line when declared as a positional.
    pub fn usage_form(&self) -> String {
        if self.optional {
            format!("[<{}>]", self.name())
        } else {
            format!("<{}>", self.name())
        }
    }

    /// Prefixed name forms offered to the shell.
    pub fn completion_strings(&self) -> Vec<String> {
        let mut out: Vec<String> = self.names.iter().map(|n| prefixed(n)).collect();
        if self.kind() == Kind::Bool {
            out.push(format!("--no-{}", self.name()));
        }
        out
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("names", &self.names)
            .field("value", &self.value)
            .field("value_list", &self.value_list)
            .field("usage", &self.usage)
            .field("env_var", &self.env_var)
            .field("hidden", &self.hidden)
            .field("optional", &self.optional)
            .field("local", &self.local)
            .field("completion", &self.completion.is_some())
            .field("validation", &self.validation.is_some())
            .finish()
    }
}

/// Completion function offering the option's value list.
pub fn value_list_completion(_ctx: &Context<'_>, opt: &OptionDef) -> Vec<String> {
    opt.get_value_list().to_vec()
}

/// Validation function accepting only members of the option's value list.
///
/// Defaults always pass.
pub fn value_list_validation(ctx: &Context<'_>, opt: &OptionDef) -> anyhow::Result<()> {
    if !ctx.is_explicit(opt.name()) {
        return Ok(());
    }
    let accepted = opt.get_value_list();
    let given: Vec<&str> = match opt.kind() {
        Kind::String => vec![ctx.string(opt.name())],
        Kind::StringList => ctx.string_list(opt.name()).iter().map(String::as_str).collect(),
        Kind::Int | Kind::Float | Kind::Bool => return Ok(()),
    };
    if given.iter().all(|v| accepted.iter().any(|a| a == v)) {
        return Ok(());
    }
    anyhow::bail!(
        "expected one of the following values: {}",
        accepted.join(",")
    )
}
