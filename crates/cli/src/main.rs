mod math;
mod show;

use anyhow::{Context as _, anyhow};
use cmdtree::prelude::*;
use cmdtree::bash_script;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();
    app().run_main()
}

fn app() -> App {
    let root = Command::root()
        .usage("Example application for the cmdtree toolkit")
        .option(
            OptionDef::bool("verbose, v", false)
                .usage("Log every dispatched command")
                .env("CMDTREE_VERBOSE"),
        )
        .before(|ctx| {
            if ctx.bool("verbose") {
                tracing::info!(
                    command = ctx.command().name(),
                    args = ?ctx.args(),
                    "dispatching"
                );
            }
            Ok(())
        })
        .subcommand(greet())
        .subcommand(math::command())
        .subcommand(show::command())
        .subcommand(echo())
        .subcommand(exit())
        .subcommand(completion());

    App::new("cmdtree-demo", root).enable_shell_completion(true)
}

fn greet() -> Command {
    Command::new("greet")
        .short_name("g")
        .usage("Greet someone")
        .arg(OptionDef::string("name", "").usage("Who to greet"))
        .option(
            OptionDef::string("greeting", "Hello")
                .usage("Greeting word")
                .env("CMDTREE_GREETING"),
        )
        .option(OptionDef::bool("loud, l", false).usage("Shout the greeting"))
        .action(|ctx| {
            let mut line = format!("{}, {}!", ctx.string("greeting"), ctx.string("name"));
            if ctx.bool("loud") {
                line = line.to_uppercase();
            }
            writeln!(ctx.out(), "{line}")?;
            Ok(())
        })
}

fn echo() -> Command {
    Command::new("echo")
        .usage("Print the remaining arguments")
        .option(
            OptionDef::string("separator, s", " ")
                .usage("Text placed between arguments")
                .local(),
        )
        .action(|ctx| {
            let line = ctx.args().join(ctx.string("separator"));
            writeln!(ctx.out(), "{line}")?;
            Ok(())
        })
}

fn exit() -> Command {
    Command::new("exit")
        .usage("Exit with the given status code")
        .arg(OptionDef::int("code", 0).usage("Status code"))
        .option(OptionDef::string("message, m", "").usage("Error message to print"))
        .action(|ctx| {
            let code = i32::try_from(ctx.int("code"))
                .with_context(|| format!("status code {} out of range", ctx.int("code")))?;
            let message = ctx.string("message");
            let exit = if message.is_empty() {
                Exit::new(code)
            } else {
                Exit::with_error(code, anyhow!("{message}"))
            };
            Err(exit.into())
        })
}

fn completion() -> Command {
    Command::new("completion")
        .usage("Shell completion scripts")
        .subcommand(
            Command::new("bash")
                .usage("Print the bash completion script")
                .action(|ctx| {
                    write!(ctx.out(), "{}", bash_script(ctx.app_name()))?;
                    Ok(())
                }),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
