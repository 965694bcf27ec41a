//! Command trees with typed options, generated help and shell completion.
//!
//! An [`App`] wraps a root [`Command`]. Each run resolves the argument list
//! to a command path, registers the options visible along that path, parses
//! the remaining tokens and dispatches: completion, help, validation, before
//! hooks and finally the leaf's action.
//!
//! ```rust,ignore
//! use cmdtree::prelude::*;
//!
//! let root = Command::root().subcommand(
//!     Command::new("greet")
//!         .arg(OptionDef::string("name", ""))
//!         .option(OptionDef::bool("loud, l", false))
//!         .action(|ctx| {
//!             writeln!(ctx.out(), "hello {}", ctx.string("name"))?;
//!             Ok(())
//!         }),
//! );
//! App::new("demo", root).enable_shell_completion(true).run_main()
//! ```

pub mod app;
pub mod command;
pub mod completion;
pub mod context;
pub mod env;
pub mod error;
pub mod help;
pub mod option;
mod registry;
pub mod resolve;

pub use cmdtree_flags as flags;
pub use cmdtree_flags::{Kind, ParseError, Value};

pub use app::App;
pub use command::Command;
pub use completion::{COMPLETION_ENV_VAR, bash_script, std_completion};
pub use context::Context;
pub use env::{Env, ProcessEnv};
pub use error::{Error, Exit, ValidationMode};
pub use option::{OptionDef, value_list_completion, value_list_validation};

pub mod prelude {
    pub use std::io::Write as _;

    pub use crate::{App, Command, Context, Exit, OptionDef};
}
