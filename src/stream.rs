//! Streaming conversion API: emit file reports as they complete.
//!
//! Unlike the eager [`crate::convert::convert_all`], which returns only after
//! every file finishes, [`convert_stream`] yields each [`FileReport`] as soon
//! as its file is done. Files run concurrently, so reports arrive in
//! completion order, not in the order the targets were given.

use crate::config::ConversionConfig;
use crate::convert::convert_file;
use crate::output::FileReport;
use crate::target::ConversionTarget;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;

/// A boxed stream of per-file reports.
pub type FileStream = Pin<Box<dyn Stream<Item = FileReport> + Send>>;

/// Convert `targets`, streaming one report per file.
///
/// At most `config.concurrency` files are in flight; the rest wait their turn
/// inside the stream. Files share nothing but the (read-only) config, so one
/// file's failure never affects another.
///
/// Nothing runs until the stream is polled. Batch-level callback events
/// (`on_batch_start` / `on_batch_complete`) are left to the caller.
///
/// # Example
/// ```rust,no_run
/// use crd2score::{convert_stream, resolve_targets, ConversionConfig};
/// use futures::StreamExt;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let targets = resolve_targets(None, Path::new("/songs"))?;
/// let mut reports = convert_stream(targets, &ConversionConfig::default());
/// while let Some(r) = reports.next().await {
///     println!("{}: ok={}", r.target, r.is_success());
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream(targets: Vec<ConversionTarget>, config: &ConversionConfig) -> FileStream {
    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(targets.into_iter().map(move |target| {
        let cfg = config.clone();
        async move { convert_file(&target, &cfg).await }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ToolCommand;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn yields_one_report_per_target() {
        let dir = TempDir::new().unwrap();
        let targets: Vec<ConversionTarget> = ["a", "b", "c"]
            .iter()
            .map(|n| {
                let p = dir.path().join(format!("{n}.crd"));
                fs::write(&p, n).unwrap();
                ConversionTarget::new(p).unwrap()
            })
            .collect();

        let cfg = ConversionConfig::builder()
            .converter(ToolCommand::new("cat"))
            .renderer(ToolCommand::new("sh").args(["-c", "cp \"$1\" \"$3\"", "render"]))
            .concurrency(2)
            .build()
            .unwrap();

        let reports: Vec<FileReport> = convert_stream(targets, &cfg).collect().await;

        let names: BTreeSet<String> = reports.iter().map(|r| r.target.base_name()).collect();
        assert_eq!(names, BTreeSet::from(["a".into(), "b".into(), "c".into()]));
        assert!(reports.iter().all(FileReport::is_success));
    }

    #[tokio::test]
    async fn empty_input_is_an_empty_stream() {
        let reports: Vec<FileReport> =
            convert_stream(Vec::new(), &ConversionConfig::default()).collect().await;
        assert!(reports.is_empty());
    }
}
