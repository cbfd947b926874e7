use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::extract::extract_prompts_for;

/// Print the prompts `file` would ask for, in order.
pub fn prompts<W: Write>(file: &Path, config: &Config, out: &mut W) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let prompts = extract_prompts_for(&source, &config.extract.function);
    if prompts.is_empty() {
        writeln!(out, "No prompts found.")?;
        return Ok(());
    }
    for (i, prompt) in prompts.iter().enumerate() {
        writeln!(out, "{:>3}. {prompt:?}", i + 1)?;
    }
    Ok(())
}
