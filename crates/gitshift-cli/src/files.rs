//! File writer collaborator: the core renders text, this writes it out.

use std::fs;
use std::path::Path;

use gitshift_core::prelude::ScriptSink;

pub struct FileScriptWriter;

impl ScriptSink for FileScriptWriter {
    fn write_script(&self, path: &Path, text: &str) -> std::io::Result<()> {
        fs::write(path, text)?;
        tracing::info!(path = %path.display(), bytes = text.len(), "script written");
        Ok(())
    }
}
