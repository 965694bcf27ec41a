use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use cmdtree::prelude::*;
use cmdtree::std_completion;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FileSummary {
    path: String,
    bytes: usize,
    lines: usize,
}

pub fn command() -> Command {
    Command::new("show")
        .usage("Summarise a text file")
        .arg(
            OptionDef::string("file", "")
                .usage("File to read")
                .completion(std_completion),
        )
        .option(
            OptionDef::string("format", "plain")
                .usage("Output format")
                .one_of(["plain", "json"])
                .local(),
        )
        .action(|ctx| {
            let summary = summarise(Path::new(ctx.string("file")))?;
            let mut out = ctx.out();
            if ctx.string("format") == "json" {
                serde_json::to_writer(&mut *out, &summary)?;
                writeln!(out)?;
            } else {
                writeln!(
                    out,
                    "{}: {} bytes, {} lines",
                    summary.path, summary.bytes, summary.lines
                )?;
            }
            Ok(())
        })
}

fn summarise(path: &Path) -> Result<FileSummary> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    Ok(FileSummary {
        path: path.display().to_string(),
        bytes: text.len(),
        lines: text.lines().count(),
    })
}
