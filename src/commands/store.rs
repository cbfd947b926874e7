use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::store::SourceStore;

/// Write the persisted source to `path`.
pub fn export<W: Write>(store: &dyn SourceStore, path: &Path, out: &mut W) -> Result<()> {
    let Some(source) = store.load()? else {
        writeln!(out, "Nothing saved for this session.")?;
        return Ok(());
    };
    std::fs::write(path, &source)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writeln!(out, "Saved to {}", path.display())?;
    Ok(())
}

/// Drop the persisted source.
pub fn clear<W: Write>(store: &mut dyn SourceStore, out: &mut W) -> Result<()> {
    store.clear()?;
    writeln!(out, "Session cleared.")?;
    Ok(())
}
