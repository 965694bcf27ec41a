use anyhow::Context as _;
use cmdtree::flags::parse_int;
use cmdtree::prelude::*;

pub fn command() -> Command {
    Command::new("math")
        .usage("Arithmetic helpers")
        .subcommand(
            Command::new("add")
                .usage("Add two numbers")
                .arg(OptionDef::float("a", 0.0))
                .arg(OptionDef::float("b", 0.0))
                .action(|ctx| {
                    writeln!(ctx.out(), "{}", ctx.float("a") + ctx.float("b"))?;
                    Ok(())
                }),
        )
        .subcommand(
            Command::new("sum")
                .usage("Sum integers given with --number")
                .option(
                    OptionDef::string_list("number, n", Vec::<String>::new())
                        .usage("Integer to add; repeatable"),
                )
                .action(|ctx| {
                    let total = sum(ctx.string_list("number"))?;
                    writeln!(ctx.out(), "{total}")?;
                    Ok(())
                }),
        )
}

fn sum(numbers: &[String]) -> anyhow::Result<i64> {
    let mut total = 0i64;
    for raw in numbers {
        let n = parse_int(raw)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid number {raw:?}"))?;
        total = total
            .checked_add(n)
            .with_context(|| format!("sum overflows at {raw}"))?;
    }
    Ok(total)
}
