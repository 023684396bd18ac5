//! Stage A: chord text → MusicXML.
//!
//! The converter streams the `.crd` contents from stdin to MusicXML on
//! stdout. Stdout is pointed at a hidden temp file in the target directory,
//! and only a successful, non-empty result is renamed onto
//! `base_name.musicxml`. A failed run therefore never leaves a file that a
//! later run would mistake for finished output.

use crate::config::ConversionConfig;
use crate::pipeline::staging_file;
use crate::pipeline::tool::{self, ToolError};
use crate::target::ConversionTarget;
use std::fs::File;
use std::process::Stdio;
use tracing::{debug, info};

/// Run the converter for `target` and install its MusicXML output.
///
/// Does not check whether the output already exists; callers decide that.
pub async fn generate_musicxml(
    target: &ConversionTarget,
    config: &ConversionConfig,
) -> Result<(), ToolError> {
    let crd_path = target.crd_path();
    let musicxml_path = target.musicxml_path();

    let input = File::open(crd_path).map_err(|source| ToolError::Input {
        path: crd_path.to_path_buf(),
        source,
    })?;

    let output_err = |source| ToolError::Output {
        path: musicxml_path.clone(),
        source,
    };

    let tmp = staging_file(target, ".musicxml.part").map_err(output_err)?;
    let sink = tmp.reopen().map_err(output_err)?;
    debug!("Converter output staged at {}", tmp.path().display());

    tool::run(
        &config.converter,
        Vec::<&str>::new(),
        Stdio::from(input),
        Stdio::from(sink),
        config.tool_timeout_secs,
    )
    .await?;

    let written = tmp.as_file().metadata().map_err(output_err)?.len();
    if written == 0 {
        return Err(ToolError::EmptyOutput {
            program: config.converter.program.clone(),
            path: musicxml_path.clone(),
        });
    }

    tmp.persist(&musicxml_path)
        .map_err(|e| output_err(e.error))?;

    info!("Wrote {} ({} bytes)", musicxml_path.display(), written);
    Ok(())
}
