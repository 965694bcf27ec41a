//! Shell completion candidates.
//!
//! Completion mode is switched on by the hidden `--generate-shell-completion`
//! option or by setting [`COMPLETION_ENV_VAR`]. Candidates are written one per
//! line; the shell side does the prefix filtering.

use crate::context::Context;
use crate::error::Error;
use crate::option::OptionDef;

/// Environment variable that turns on completion mode.
pub const COMPLETION_ENV_VAR: &str = "_CLI_SHELL_COMPLETION";

/// Hidden option that turns on completion mode.
pub const COMPLETION_OPTION: &str = "generate-shell-completion";

/// Candidate asking the shell for its own file and directory completion.
pub const STD_COMPLETION: &str = "$stdcomp=-fd";

pub(crate) fn completion_option() -> OptionDef {
    OptionDef::bool(COMPLETION_OPTION, false)
        .env(COMPLETION_ENV_VAR)
        .hidden()
}

/// Completion function that defers to the shell's file completion.
pub fn std_completion(_ctx: &Context<'_>, _opt: &OptionDef) -> Vec<String> {
    vec![STD_COMPLETION.to_string()]
}

/// Candidates for the current invocation.
///
/// An option still waiting for its value is completed by its own completion
/// function. Otherwise any parse error yields nothing, a command-level
/// override wins, and the default lists the leaf's subcommands followed by
/// its own named options.
pub fn candidates(ctx: &Context<'_>) -> Vec<String> {
    if let Some(opt) = ctx.missing_value() {
        if let Some(complete) = opt.completion_fn() {
            return complete(ctx, opt);
        }
    }
    if ctx.parse_error().is_some() {
        return Vec::new();
    }

    let leaf = ctx.command();
    if let Some(complete) = leaf.completion_fn() {
        return complete(ctx);
    }

    let mut out = Vec::new();
    for cmd in leaf.commands().iter().filter(|c| !c.is_builtin()) {
        out.push(cmd.name().to_string());
        if let Some(alias) = cmd.get_short_name() {
            out.push(alias.to_string());
        }
    }
    for opt in leaf.options().iter().filter(|o| !o.is_hidden()) {
        out.extend(opt.completion_strings());
    }
    out
}

pub(crate) fn show(ctx: &Context<'_>) -> Result<(), Error> {
    let list = candidates(ctx);
    tracing::debug!(count = list.len(), "writing completion candidates");
    let mut out = ctx.out();
    for candidate in list.iter().filter(|c| !c.is_empty()) {
        writeln!(out, "{candidate}")?;
    }
    Ok(())
}

const BASH_TEMPLATE: &str = r#"# bash completion for @PROG@
_@FUNC@_complete() {
    local cur="${COMP_WORDS[COMP_CWORD]}"
    local IFS=$'\n'
    local candidates
    candidates=($(@ENV@=1 "${COMP_WORDS[0]}" "${COMP_WORDS[@]:1:COMP_CWORD-1}" 2>/dev/null))
    if [[ ${#candidates[@]} -eq 1 && ${candidates[0]} == '$stdcomp='* ]]; then
        local flags="${candidates[0]#\$stdcomp=}"
        COMPREPLY=($(compgen ${flags} -- "${cur}"))
        return
    fi
    COMPREPLY=($(compgen -W "${candidates[*]}" -- "${cur}"))
}
complete -F _@FUNC@_complete @PROG@
"#;

/// Bash script wiring `prog` to completion mode.
pub fn bash_script(prog: &str) -> String {
    let func: String = prog
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    BASH_TEMPLATE
        .replace("@FUNC@", &func)
        .replace("@PROG@", prog)
        .replace("@ENV@", COMPLETION_ENV_VAR)
}
