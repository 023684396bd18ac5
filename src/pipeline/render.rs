//! Stage B: MusicXML → PDF.
//!
//! The renderer is invoked as `<renderer> <input.musicxml> -o <output.pdf>`
//! and picks the output format from the extension, so the staging file keeps
//! a `.pdf` suffix. As with stage A, the staged file is renamed onto
//! `base_name.pdf` only after the renderer exits successfully with a
//! non-empty result.

use crate::config::ConversionConfig;
use crate::pipeline::staging_file;
use crate::pipeline::tool::{self, ToolError};
use crate::target::ConversionTarget;
use std::ffi::OsStr;
use std::process::Stdio;
use tracing::{debug, info};

/// Run the renderer for `target` and install its PDF output.
///
/// Expects `target.musicxml_path()` to exist; does not check for an existing
/// PDF.
pub async fn render_pdf(
    target: &ConversionTarget,
    config: &ConversionConfig,
) -> Result<(), ToolError> {
    let musicxml_path = target.musicxml_path();
    let pdf_path = target.pdf_path();

    let output_err = |source| ToolError::Output {
        path: pdf_path.clone(),
        source,
    };

    let staged = staging_file(target, ".pdf")
        .map_err(output_err)?
        .into_temp_path();
    debug!("Renderer output staged at {}", staged.display());

    tool::run(
        &config.renderer,
        [
            musicxml_path.as_os_str(),
            OsStr::new("-o"),
            staged.as_os_str(),
        ],
        Stdio::null(),
        Stdio::piped(),
        config.tool_timeout_secs,
    )
    .await?;

    let written = std::fs::metadata(&staged).map_err(output_err)?.len();
    if written == 0 {
        return Err(ToolError::EmptyOutput {
            program: config.renderer.program.clone(),
            path: pdf_path.clone(),
        });
    }

    staged.persist(&pdf_path).map_err(|e| output_err(e.error))?;

    info!("Wrote {} ({} bytes)", pdf_path.display(), written);
    Ok(())
}
