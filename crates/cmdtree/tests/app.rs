use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cmdtree::prelude::*;
use cmdtree::{COMPLETION_ENV_VAR, Error, ParseError, ValidationMode};

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

fn completion_env() -> HashMap<String, String> {
    HashMap::from([(COMPLETION_ENV_VAR.to_string(), "true".to_string())])
}

/// Run `app` and return the result with everything written to the output.
fn run(app: &App, args: &[&str], env: &HashMap<String, String>) -> (Result<(), Error>, String) {
    let mut out = Vec::new();
    let result = app.run_with(&argv(args), env, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn completion_tree() -> App {
    let root = Command::root()
        .subcommand(Command::new("cmd1").subcommand(Command::new("sub11")))
        .subcommand(Command::new("cmd2"))
        .option(OptionDef::int("int", 0))
        .option(
            OptionDef::string("string", "")
                .completion(|_, _| vec!["a".to_string(), "b".to_string()]),
        );
    App::new("testapp", root).enable_shell_completion(true)
}

fn help_tree() -> App {
    let root = Command::root()
        .usage("app usage")
        .subcommand(
            Command::new("cmd1")
                .usage("cmd1 usage")
                .subcommand(Command::new("sub1")),
        )
        .subcommand(Command::new("cmd2"))
        .option(OptionDef::int("int", 0))
        .option(OptionDef::string("string", ""));
    App::new("testapp", root)
}

#[test]
fn dispatches_nested_action_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let root = Command::root().subcommand(Command::new("testcmd").subcommand(
        Command::new("sub").action(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    ));
    let app = App::new("testapp", root);

    let (result, _) = run(&app, &["testcmd", "sub"], &no_env());
    result.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn before_hooks_run_root_to_leaf() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (o1, o2, o3) = (order.clone(), order.clone(), order.clone());
    let root = Command::root()
        .before(move |_| {
            o1.lock().unwrap().push("root");
            Ok(())
        })
        .subcommand(
            Command::new("cmd")
                .before(move |_| {
                    o2.lock().unwrap().push("cmd");
                    Ok(())
                })
                .action(move |_| {
                    o3.lock().unwrap().push("action");
                    Ok(())
                }),
        );
    let app = App::new("testapp", root);

    let (result, _) = run(&app, &["cmd"], &no_env());
    result.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["root", "cmd", "action"]);
}

#[test]
fn failing_hook_stops_dispatch() {
    let ran = Arc::new(AtomicUsize::new(0));
    let seen = ran.clone();
    let root = Command::root()
        .before(|_| anyhow::bail!("not allowed"))
        .action(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let app = App::new("testapp", root);

    let (result, _) = run(&app, &[], &no_env());
    match result {
        Err(Error::Hook(err)) => assert_eq!(err.to_string(), "not allowed"),
        other => panic!("expected Hook, got: {other:?}"),
    }
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn inherited_options_reach_the_leaf() {
    let seen = Arc::new(Mutex::new(None));
    let store = seen.clone();
    let root = Command::root()
        .option(OptionDef::int("int", 0))
        .option(OptionDef::string("str", ""))
        .option(OptionDef::bool("bool", false))
        .option(OptionDef::float("float", 0.0))
        .subcommand(Command::new("cmd").action(move |ctx| {
            *store.lock().unwrap() = Some((
                ctx.int("int"),
                ctx.string("str").to_string(),
                ctx.bool("bool"),
                ctx.float("float"),
                ctx.int("nonesuch"),
            ));
            Ok(())
        }));
    let app = App::new("testapp", root);

    let args = ["cmd", "--int", "42", "--str", "42", "--bool", "--float", "42.42"];
    let (result, _) = run(&app, &args, &no_env());
    result.unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        Some((42, "42".to_string(), true, 42.42, 0))
    );
}

#[test]
fn environment_fills_unset_options() {
    let seen = Arc::new(Mutex::new(String::new()));
    let store = seen.clone();
    let root = Command::root()
        .option(OptionDef::string("name", "nobody").env("NAME"))
        .action(move |ctx| {
            *store.lock().unwrap() = ctx.string("name").to_string();
            Ok(())
        });
    let app = App::new("testapp", root);
    let env = HashMap::from([("NAME".to_string(), "env".to_string())]);

    run(&app, &[], &env).0.unwrap();
    assert_eq!(*seen.lock().unwrap(), "env");

    run(&app, &["--name", "flag"], &env).0.unwrap();
    assert_eq!(*seen.lock().unwrap(), "flag");
}

#[test]
fn parse_errors_surface_before_actions() {
    let root = Command::root()
        .option(OptionDef::int("int", 0))
        .action(|_| Ok(()));
    let app = App::new("testapp", root);

    match run(&app, &["--nope"], &no_env()).0 {
        Err(Error::Parse(ParseError::Unknown(name))) => assert_eq!(name, "--nope"),
        other => panic!("expected Unknown, got: {other:?}"),
    }
    match run(&app, &["--int", "x"], &no_env()).0 {
        Err(Error::Parse(ParseError::InvalidValue { name, .. })) => assert_eq!(name, "--int"),
        other => panic!("expected InvalidValue, got: {other:?}"),
    }
}

#[test]
fn empty_app_completes_nothing() {
    let app = App::new("testapp", Command::root()).enable_shell_completion(true);
    let (result, out) = run(&app, &[], &completion_env());
    result.unwrap();
    assert_eq!(out, "");
}

#[test]
fn completes_commands_then_options() {
    let app = completion_tree();
    let (result, out) = run(&app, &[], &completion_env());
    result.unwrap();
    assert_eq!(out, "cmd1\ncmd2\n--int\n--string\n");
}

#[test]
fn completes_second_level() {
    let app = completion_tree();
    let (result, out) = run(&app, &["cmd1"], &completion_env());
    result.unwrap();
    assert_eq!(out, "sub11\n");
}

#[test]
fn completes_option_value() {
    let app = completion_tree();
    let (result, out) = run(&app, &["--string"], &completion_env());
    result.unwrap();
    assert_eq!(out, "a\nb\n");
}

#[test]
fn missing_value_without_completion_prints_nothing() {
    let app = completion_tree();
    let (result, out) = run(&app, &["--int"], &completion_env());
    result.unwrap();
    assert_eq!(out, "");

    let (result, out) = run(&app, &["--bogus"], &completion_env());
    result.unwrap();
    assert_eq!(out, "");
}

#[test]
fn completion_flag_works_without_env() {
    let app = completion_tree();
    let (result, out) = run(&app, &["cmd1", "--generate-shell-completion"], &no_env());
    result.unwrap();
    assert_eq!(out, "sub11\n");
}

#[test]
fn completion_flag_after_value_option_completes_the_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let root = Command::root()
        .option(
            OptionDef::string("string", "")
                .completion(|_, _| vec!["a".to_string(), "b".to_string()]),
        )
        .action(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let app = App::new("testapp", root).enable_shell_completion(true);

    let (result, out) = run(
        &app,
        &["--string", "--generate-shell-completion"],
        &no_env(),
    );
    result.unwrap();
    assert_eq!(out, "a\nb\n");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn completion_disabled_rejects_flag() {
    let app = App::new("testapp", Command::root());
    match run(&app, &["--generate-shell-completion"], &no_env()).0 {
        Err(Error::Parse(ParseError::Unknown(_))) => {}
        other => panic!("expected Unknown, got: {other:?}"),
    }
}

#[test]
fn help_command_completes_target_path() {
    let root = Command::root()
        .subcommand(Command::new("cmd1").subcommand(Command::new("sub1")))
        .subcommand(Command::new("cmd2"));
    let app = App::new("testapp", root).enable_shell_completion(true);

    let (_, out) = run(&app, &["help"], &completion_env());
    assert_eq!(out, "cmd1\ncmd2\n");
    let (_, out) = run(&app, &["help", "cmd1"], &completion_env());
    assert_eq!(out, "sub1\n");
}

#[test]
fn positional_completion_uses_option_function() {
    let root = Command::root().subcommand(
        Command::new("show")
            .arg(OptionDef::string("file", "").completion(cmdtree::std_completion))
            .action(|_| Ok(())),
    );
    let app = App::new("testapp", root).enable_shell_completion(true);
    let (_, out) = run(&app, &["show"], &completion_env());
    assert_eq!(out, "$stdcomp=-fd\n");
}

const ROOT_HELP: &str = "\
Usage: testapp

app usage

Subcommands:
  cmd1           cmd1 usage
  cmd2
  help           Show help for a command
  help-commands  List all commands

Options:
  --int     default = 0
  --string  default = \"\"
";

const CMD1_HELP: &str = "\
Usage: testapp cmd1

cmd1 usage

Subcommands:
  sub1

Options:
  --int     default = 0
  --string  default = \"\"
";

#[test]
fn help_by_command_and_option_match() {
    let app = help_tree();
    for args in [&["help"][..], &["--help"], &["-h"], &[]] {
        let (result, out) = run(&app, args, &no_env());
        result.unwrap();
        assert_eq!(out, ROOT_HELP, "args: {args:?}");
    }
    for args in [&["help", "cmd1"][..], &["cmd1", "--help"], &["cmd1"]] {
        let (result, out) = run(&app, args, &no_env());
        result.unwrap();
        assert_eq!(out, CMD1_HELP, "args: {args:?}");
    }
}

#[test]
fn help_option_wins_over_later_parse_errors() {
    let app = help_tree();
    let (result, out) = run(&app, &["--help", "--bogus"], &no_env());
    result.unwrap();
    assert_eq!(out, ROOT_HELP);
}

#[test]
fn help_commands_lists_runnable_paths() {
    let root = Command::root()
        .subcommand(
            Command::new("math")
                .subcommand(Command::new("add").usage("Add numbers").action(|_| Ok(())))
                .subcommand(Command::new("sum").action(|_| Ok(()))),
        )
        .subcommand(Command::new("echo").usage("Echo").action(|_| Ok(())));
    let app = App::new("testapp", root);

    let (result, out) = run(&app, &["help-commands"], &no_env());
    result.unwrap();
    assert_eq!(out, "echo      Echo\nmath add  Add numbers\nmath sum\n");

    let (result, out) = run(&app, &["help-commands", "--json"], &no_env());
    result.unwrap();
    let listing: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(listing[1]["path"], "math add");
    assert_eq!(listing[1]["usage"], "Add numbers");
    assert_eq!(listing.as_array().map(Vec::len), Some(3));
}

fn format_app(mode: ValidationMode, ran: Arc<AtomicUsize>) -> App {
    let root = Command::root()
        .option(OptionDef::string("format", "plain").one_of(["plain", "json"]))
        .action(move |_| {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    App::new("testapp", root).validation(mode)
}

#[test]
fn validation_rejects_values_outside_the_list() {
    let ran = Arc::new(AtomicUsize::new(0));
    let app = format_app(ValidationMode::FailFast, ran.clone());

    match run(&app, &["--format", "xml"], &no_env()).0 {
        Err(err @ Error::Validation { .. }) => assert_eq!(
            err.to_string(),
            "invalid value for --format: expected one of the following values: plain,json"
        ),
        other => panic!("expected Validation, got: {other:?}"),
    }
    assert_eq!(ran.load(Ordering::SeqCst), 0);

    run(&app, &["--format", "json"], &no_env()).0.unwrap();
    run(&app, &[], &no_env()).0.unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 2);
}

#[test]
fn custom_validation_errors_name_the_option() {
    let root = Command::root()
        .option(OptionDef::int("port, p", 8080).validation(|ctx, opt| {
            if ctx.int(opt.name()) > 65535 {
                anyhow::bail!("must be at most 65535");
            }
            Ok(())
        }))
        .action(|_| Ok(()));
    let app = App::new("testapp", root);

    let err = run(&app, &["-p", "70000"], &no_env()).0.unwrap_err();
    assert_eq!(err.to_string(), "invalid value for --port: must be at most 65535");
    run(&app, &["--port", "443"], &no_env()).0.unwrap();
}

#[test]
fn first_failing_validation_wins() {
    let checked = Arc::new(AtomicUsize::new(0));
    let seen = checked.clone();
    let root = Command::root()
        .option(OptionDef::string("a", "").validation(|_, _| anyhow::bail!("bad a")))
        .option(OptionDef::string("b", "").validation(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("bad b")
        }))
        .action(|_| Ok(()));
    let app = App::new("testapp", root);

    match run(&app, &["--b", "x", "--a", "y"], &no_env()).0 {
        Err(Error::Validation { option, .. }) => assert_eq!(option, "--a"),
        other => panic!("expected Validation, got: {other:?}"),
    }
    assert_eq!(checked.load(Ordering::SeqCst), 0);
}

#[test]
fn help_wins_over_validation() {
    let ran = Arc::new(AtomicUsize::new(0));
    let app = format_app(ValidationMode::FailFast, ran.clone());

    let (result, out) = run(&app, &["--format", "xml", "--help"], &no_env());
    result.unwrap();
    assert!(out.starts_with("Usage: testapp\n"), "{out}");
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn completion_wins_over_help() {
    let ran = Arc::new(AtomicUsize::new(0));
    let app = format_app(ValidationMode::FailFast, ran.clone()).enable_shell_completion(true);

    let (result, out) = run(&app, &["--help"], &completion_env());
    result.unwrap();
    assert_eq!(out, "--format\n");
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn leftover_tokens_at_a_group_are_unknown_commands() {
    let app = help_tree();

    match run(&app, &["nosuch"], &no_env()).0 {
        Err(Error::UnknownCommand(path)) => assert_eq!(path, "nosuch"),
        other => panic!("expected UnknownCommand, got: {other:?}"),
    }
    let err = run(&app, &["cmd1", "nosuch"], &no_env()).0.unwrap_err();
    assert_eq!(err.to_string(), "unknown command: cmd1 nosuch");
    assert_eq!(err.exit_code(), 1);

    let (result, out) = run(&app, &["cmd1"], &no_env());
    result.unwrap();
    assert!(out.starts_with("Usage: testapp cmd1\n"), "{out}");
}

#[test]
fn warn_mode_keeps_going() {
    let ran = Arc::new(AtomicUsize::new(0));
    let app = format_app(ValidationMode::Warn, ran.clone());
    run(&app, &["--format", "xml"], &no_env()).0.unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn value_list_completion_offers_choices() {
    let ran = Arc::new(AtomicUsize::new(0));
    let app = format_app(ValidationMode::FailFast, ran).enable_shell_completion(true);
    let (_, out) = run(&app, &["--format"], &completion_env());
    assert_eq!(out, "plain\njson\n");
}

#[test]
fn exit_requests_carry_codes() {
    let root = Command::root()
        .subcommand(Command::new("quiet").action(|_| Err(Exit::new(3).into())))
        .subcommand(Command::new("loud").action(|_| {
            Err(Exit::with_error(4, anyhow::anyhow!("went wrong")).into())
        }))
        .subcommand(Command::new("fail").action(|_| anyhow::bail!("plain failure")));
    let app = App::new("testapp", root);

    let err = run(&app, &["quiet"], &no_env()).0.unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.is_clean_exit());

    let err = run(&app, &["loud"], &no_env()).0.unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert_eq!(err.to_string(), "went wrong");

    let err = run(&app, &["fail"], &no_env()).0.unwrap_err();
    assert!(matches!(err, Error::Action(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn actions_write_to_injected_output() {
    let root = Command::root().subcommand(
        Command::new("echo")
            .option(OptionDef::bool("upper", false))
            .action(|ctx| {
                let text = ctx.args().join(" ");
                let text = if ctx.bool("upper") { text.to_uppercase() } else { text };
                writeln!(ctx.out(), "{text}")?;
                Ok(())
            }),
    );
    let app = App::new("testapp", root);

    let (result, out) = run(&app, &["echo", "--upper", "a", "b"], &no_env());
    result.unwrap();
    assert_eq!(out, "A B\n");

    let (result, out) = run(&app, &["echo", "--", "--upper", "x"], &no_env());
    result.unwrap();
    assert_eq!(out, "--upper x\n");
}
