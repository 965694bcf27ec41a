use cmdtree_flags::{OptionSet, ParseError};

use crate::app::App;
use crate::command::Command;
use crate::env::Env;
use crate::error::Error;
use crate::option::OptionDef;

/// Options in scope for a resolved path, bound to their declarations.
///
/// `defs[i]` is the declaration behind slot `i` of `set`.
pub(crate) struct Registry<'a> {
    set: OptionSet,
    defs: Vec<&'a OptionDef>,
}

impl<'a> Registry<'a> {
    /// Register every option visible at the leaf of `path`.
    ///
    /// Named options come from each node root to leaf, skipping local options
    /// of non-leaf nodes. Positionals come from the leaf only. The builtin
    /// help option follows unless the path already uses its names, then the
    /// completion option when shell completion is enabled.
    pub(crate) fn build(app: &'a App, path: &[&'a Command], env: &dyn Env) -> Result<Self, Error> {
        let mut registry = Self {
            set: OptionSet::new(),
            defs: Vec::new(),
        };

        for (depth, cmd) in path.iter().enumerate() {
            let is_leaf = depth + 1 == path.len();
            for opt in cmd.options() {
                if opt.is_local() && !is_leaf {
                    continue;
                }
                registry.declare(cmd, opt, false, env)?;
            }
            if is_leaf {
                for arg in cmd.args() {
                    registry.declare(cmd, arg, true, env)?;
                }
            }
        }

        let leaf = path[path.len() - 1];
        let help = app.help_option();
        if help.names().iter().any(|n| registry.set.contains(n)) {
            tracing::debug!("help option shadowed by user declaration");
        } else {
            registry.declare(leaf, help, false, env)?;
        }
        if app.shell_completion_enabled() {
            registry.declare(leaf, app.completion_option(), false, env)?;
        }

        Ok(registry)
    }

    fn declare(
        &mut self,
        cmd: &Command,
        opt: &'a OptionDef,
        positional: bool,
        env: &dyn Env,
    ) -> Result<(), Error> {
        let decl = opt.declaration(env);
        let declared = if positional {
            self.set.declare_positional(decl)
        } else {
            self.set.declare(decl)
        };
        declared.map_err(|source| Error::Declaration {
            command: cmd.name().to_string(),
            source,
        })?;
        self.defs.push(opt);
        Ok(())
    }

    pub(crate) fn parse(&mut self, args: &[String]) -> Result<(), ParseError> {
        self.set.parse(args)
    }

    pub(crate) fn set(&self) -> &OptionSet {
        &self.set
    }

    /// Declarations in registration order.
    pub(crate) fn defs(&self) -> &[&'a OptionDef] {
        &self.defs
    }

    /// Declaration that was waiting for a value when parsing stopped.
    pub(crate) fn missing_value(&self) -> Option<&'a OptionDef> {
        self.set
            .missing_value()
            .and_then(|idx| self.defs.get(idx).copied())
    }
}

/// Named options visible at the leaf of `path`, in declaration order.
pub(crate) fn visible_options<'a>(path: &[&'a Command]) -> Vec<&'a OptionDef> {
    let mut out = Vec::new();
    for (depth, cmd) in path.iter().enumerate() {
        let is_leaf = depth + 1 == path.len();
        out.extend(cmd.options().iter().filter(|o| is_leaf || !o.is_local()));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cmdtree_flags::{DeclareError, Value};

    use super::*;
    use crate::resolve::resolve;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn app() -> App {
        let root = Command::root()
            .option(OptionDef::int("int", 0))
            .option(OptionDef::bool("only-here", false).local())
            .subcommand(
                Command::new("cmd")
                    .option(OptionDef::string("string", "x"))
                    .arg(OptionDef::string("file", "")),
            );
        App::new("test", root)
    }

    #[test]
    fn leaf_sees_inherited_options_and_own_positionals() {
        let app = app();
        let env = HashMap::new();
        let res = resolve(app.root(), &argv(&["cmd"]));
        let registry = Registry::build(&app, &res.path, &env).unwrap();

        let names: Vec<&str> = registry.defs().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["int", "string", "file", "help"]);
        assert!(!registry.set().contains("only-here"));
        assert!(registry.set().lookup("file").unwrap().is_positional());
    }

    #[test]
    fn local_options_stay_on_their_node() {
        let app = app();
        let env = HashMap::new();
        let registry = Registry::build(&app, &[app.root()], &env).unwrap();
        assert!(registry.set().contains("only-here"));
    }

    #[test]
    fn completion_option_follows_env() {
        let app = app().enable_shell_completion(true);
        let env: HashMap<String, String> = HashMap::from([(
            crate::completion::COMPLETION_ENV_VAR.to_string(),
            "1".to_string(),
        )]);
        let registry = Registry::build(&app, &[app.root()], &env).unwrap();
        let slot = registry
            .set()
            .lookup(crate::completion::COMPLETION_OPTION)
            .unwrap();
        assert_eq!(slot.value(), &Value::Bool(true));
    }

    #[test]
    fn user_help_option_shadows_builtin() {
        let root = Command::root().option(OptionDef::string("h", ""));
        let app = App::new("test", root);
        let env = HashMap::new();
        let registry = Registry::build(&app, &[app.root()], &env).unwrap();
        assert_eq!(registry.defs().len(), 1);
        assert!(!registry.set().contains("help"));
    }

    #[test]
    fn colliding_declarations_are_reported() {
        let root = Command::root()
            .option(OptionDef::int("n", 0))
            .subcommand(Command::new("cmd").option(OptionDef::string("n", "")));
        let app = App::new("test", root);
        let env = HashMap::new();
        let res = resolve(app.root(), &argv(&["cmd"]));
        match Registry::build(&app, &res.path, &env) {
            Err(Error::Declaration { command, source }) => {
                assert_eq!(command, "cmd");
                assert_eq!(source, DeclareError::Redeclared("n".to_string()));
            }
            Err(other) => panic!("expected Declaration, got: {other:?}"),
            Ok(_) => panic!("expected Declaration, got a registry"),
        }
    }

    #[test]
    fn visible_options_respect_locality() {
        let app = app();
        let res = resolve(app.root(), &argv(&["cmd"]));
        let names: Vec<&str> = visible_options(&res.path).iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["int", "string"]);
    }
}
