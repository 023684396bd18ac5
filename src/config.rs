//! Configuration types for CRD-to-score conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the plain
//! `crd2score` invocation: `txt2musicxml` and `mscore` looked up on `PATH`,
//! one worker per available CPU, no timeout.

use crate::error::Crd2ScoreError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Default text-to-MusicXML converter.
pub const DEFAULT_CONVERTER: &str = "txt2musicxml";
/// Default MusicXML-to-PDF renderer.
pub const DEFAULT_RENDERER: &str = "mscore";

/// An external program plus the leading arguments passed before the
/// stage-specific ones.
///
/// The converter gets no stage arguments (input on stdin, output on stdout);
/// the renderer gets `<input.musicxml> -o <output.pdf>` appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use crd2score::{ConversionConfig, ToolCommand};
///
/// let config = ConversionConfig::builder()
///     .renderer(ToolCommand::new("musescore4"))
///     .concurrency(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.renderer.program, "musescore4");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Reads chord text on stdin, writes MusicXML on stdout. Default: `txt2musicxml`.
    pub converter: ToolCommand,

    /// Invoked as `<renderer> <input.musicxml> -o <output.pdf>`. Default: `mscore`.
    pub renderer: ToolCommand,

    /// Number of files converted at once. Default: available parallelism.
    ///
    /// Each in-flight file holds at most one child process, so this also
    /// bounds the number of concurrent external tools.
    pub concurrency: usize,

    /// Kill an external tool that runs longer than this. Default: None.
    ///
    /// With no timeout a hung tool stalls its slot for the rest of the run.
    pub tool_timeout_secs: Option<u64>,

    /// Receives per-file and per-stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            converter: ToolCommand::new(DEFAULT_CONVERTER),
            renderer: ToolCommand::new(DEFAULT_RENDERER),
            concurrency: default_concurrency(),
            tool_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("converter", &self.converter)
            .field("renderer", &self.renderer)
            .field("concurrency", &self.concurrency)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Worker count used when none is configured.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn converter(mut self, cmd: ToolCommand) -> Self {
        self.config.converter = cmd;
        self
    }

    pub fn renderer(mut self, cmd: ToolCommand) -> Self {
        self.config.renderer = cmd;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Crd2ScoreError> {
        let c = &self.config;
        if c.converter.program.trim().is_empty() {
            return Err(Crd2ScoreError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        if c.renderer.program.trim().is_empty() {
            return Err(Crd2ScoreError::InvalidConfig(
                "Renderer program must not be empty".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(Crd2ScoreError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.tool_timeout_secs == Some(0) {
            return Err(Crd2ScoreError::InvalidConfig(
                "Tool timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
