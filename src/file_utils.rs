use crate::error::{ImportMapsError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Writes a rendered report to `output_file`, or to stdout when `None`.
///
/// Missing parent directories of `output_file` are created. A trailing
/// newline is added when `content` lacks one.
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    ImportMapsError::io_error_with_source(
                        "create output directory",
                        parent.to_path_buf(),
                        e,
                    )
                })?;
            }
            fs::write(path, content).map_err(|e| {
                ImportMapsError::io_error_with_source("write report", path.to_path_buf(), e)
            })?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
