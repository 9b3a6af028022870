use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::config::DocweaveConfig;
use crate::resources::{ResourceError, ResourceResolver};
use crate::style_mods::{self, StyleModsError};
use crate::transform::{OutputFormat, OutputFormats, SetupError, TopicTransformation};

use super::assets::copy_stylesheet;
use super::paths::topic_output_path;
use super::source::{SourceError, discover_topics, load_topic};

/// Name of the JSON build report written to the output directory.
pub const REPORT_FILE: &str = "build-report.json";

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("{0}")]
    StyleMods(#[from] StyleModsError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write build report: {0}")]
    Report(#[from] serde_json::Error),
}

/// What happened to one topic file.
#[derive(Debug, Clone, Serialize)]
pub struct TopicOutcome {
    pub topic: String,
    pub source: PathBuf,
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

impl TopicOutcome {
    fn new(source: &Path) -> Self {
        Self {
            topic: source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source: source.to_path_buf(),
            files: Vec::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Outcome for a topic whose render task panicked or was lost.
    fn task_failed(source: &Path, err: &JoinError) -> Self {
        tracing::error!(source = %source.display(), "render task failed: {err}");
        let mut outcome = Self::new(source);
        outcome.failures.push(format!("render task failed: {err}"));
        outcome
    }

    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Serialize)]
struct BuildReport<'a> {
    project: &'a str,
    formats: &'a [OutputFormat],
    cancelled: bool,
    topics: &'a [TopicOutcome],
    assets: &'a [PathBuf],
}

pub struct BuildResult {
    pub output_dir: PathBuf,
    pub report_path: PathBuf,
    pub topics: Vec<TopicOutcome>,
    pub assets: Vec<PathBuf>,
    pub cancelled: bool,
}

impl BuildResult {
    pub fn files(&self) -> usize {
        self.topics.iter().map(|t| t.files.len()).sum()
    }

    pub fn failed(&self) -> Vec<&TopicOutcome> {
        self.topics.iter().filter(|t| t.failed()).collect()
    }
}

pub struct Builder {
    config: DocweaveConfig,
    /// Base path for resolving relative paths (typically the config file's directory)
    base_path: PathBuf,
}

impl Builder {
    pub fn new(config: DocweaveConfig, base_path: PathBuf) -> Self {
        Self { config, base_path }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_path.join(&self.config.project.output)
    }

    fn topics_dir(&self) -> PathBuf {
        self.base_path.join(&self.config.project.topics)
    }

    fn resources(&self) -> ResourceResolver {
        ResourceResolver::new(self.base_path.join(&self.config.presentation.resources))
    }

    /// Build the configured transformation and close its setup phase.
    pub fn transformation(&self) -> Result<TopicTransformation, BuildError> {
        let mut transformation = TopicTransformation::new();
        transformation.set_style_sheet_path(self.config.presentation.style_sheet_path.as_str())?;
        style_mods::apply(
            &mut transformation,
            &self.config.mods,
            &self.resources(),
            &self.config.project.language,
        )?;
        transformation.complete_setup();
        Ok(transformation)
    }

    /// Build, stopping early when `cancel` completes.
    ///
    /// Topics still rendering when the build is cancelled are discarded and
    /// write nothing further. Files already written stay on disk.
    pub async fn build_until(
        &self,
        cancel: impl Future<Output = ()>,
    ) -> Result<BuildResult, BuildError> {
        // Build pipeline:
        // 1. Configure handlers (fails the build on configuration errors)
        // 2. Discover topics
        // 3. Render topics concurrently, one task per topic
        // 4. Copy the stylesheet into HTML output
        // 5. Write the build report

        let transformation = Arc::new(self.transformation()?);
        tracing::debug!(sections = ?transformation.sections().kinds(), "section order");

        let topic_paths = discover_topics(&self.topics_dir())?;
        let formats = self.config.format_set();
        let passes = formats.render_passes();
        tracing::info!(
            topics = topic_paths.len(),
            formats = %formats,
            jobs = self.config.build.jobs,
            "rendering topics"
        );

        let output_dir = self.output_dir();
        tokio::fs::create_dir_all(&output_dir).await?;

        let semaphore = Arc::new(Semaphore::new(self.config.build.jobs.max(1)));
        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        for path in topic_paths {
            let transformation = Arc::clone(&transformation);
            let semaphore = Arc::clone(&semaphore);
            let stop = Arc::clone(&stop);
            let passes = passes.clone();
            let output_dir = output_dir.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let source = path.clone();
                let rendered = tokio::task::spawn_blocking(move || {
                    render_topic_file(&transformation, &path, &passes, &output_dir, &stop)
                })
                .await;
                (source, rendered)
            });
        }

        let (outcomes, cancelled) = join_topics(tasks, cancel, &stop).await;

        let mut assets = Vec::new();
        if !cancelled
            && self.config.mods.enabled
            && let Some(file_name) = &self.config.mods.stylesheet
        {
            let stylesheet = self.resources().resolve(file_name)?;
            assets = copy_stylesheet(
                &output_dir,
                formats,
                &self.config.presentation.style_sheet_path,
                file_name,
                &stylesheet,
            )?;
        }

        let report_path = output_dir.join(REPORT_FILE);
        let report = BuildReport {
            project: &self.config.project.name,
            formats: &self.config.formats,
            cancelled,
            topics: &outcomes,
            assets: &assets,
        };
        tokio::fs::write(&report_path, serde_json::to_string_pretty(&report)?).await?;

        Ok(BuildResult {
            output_dir,
            report_path,
            topics: outcomes,
            assets,
            cancelled,
        })
    }
}

type TopicTask = (PathBuf, Result<TopicOutcome, JoinError>);

/// Collect topic outcomes until every task finished or `cancel` completes.
///
/// A panicked render task becomes a failed outcome for its topic. On
/// cancel, `stop` is raised so blocking renders write nothing further, and
/// unfinished topics are dropped.
async fn join_topics(
    mut tasks: JoinSet<TopicTask>,
    cancel: impl Future<Output = ()>,
    stop: &AtomicBool,
) -> (Vec<TopicOutcome>, bool) {
    let mut outcomes = Vec::new();
    let mut cancelled = false;
    tokio::pin!(cancel);
    loop {
        tokio::select! {
            biased;
            () = &mut cancel => {
                tracing::warn!(pending = tasks.len(), "build cancelled, discarding unfinished topics");
                stop.store(true, Ordering::SeqCst);
                tasks.abort_all();
                cancelled = true;
                break;
            }
            next = tasks.join_next() => match next {
                Some(Ok((source, rendered))) => outcomes.push(
                    rendered.unwrap_or_else(|err| TopicOutcome::task_failed(&source, &err)),
                ),
                Some(Err(err)) => outcomes.push(TopicOutcome::task_failed(Path::new(""), &err)),
                None => break,
            },
        }
    }
    outcomes.sort_by(|a, b| a.source.cmp(&b.source));
    (outcomes, cancelled)
}

/// Load, render and write one topic for every render pass.
///
/// Failures are logged and recorded on the outcome; they never stop other
/// topics. Once `stop` is raised no further files are written.
fn render_topic_file(
    transformation: &TopicTransformation,
    path: &Path,
    passes: &[OutputFormats],
    output_dir: &Path,
    stop: &AtomicBool,
) -> TopicOutcome {
    let mut outcome = TopicOutcome::new(path);

    let topic = match load_topic(path) {
        Ok(topic) => topic,
        Err(err) => {
            tracing::error!("{err}");
            outcome.failures.push(err.to_string());
            return outcome;
        }
    };
    outcome.topic = topic.id().to_owned();

    for &pass in passes {
        let rendered = match transformation.render_topic(&topic, pass) {
            Ok(rendered) => rendered,
            Err(failure) => {
                tracing::error!(topic = %failure.topic, formats = %pass, "{failure}");
                outcome.failures.push(failure.to_string());
                continue;
            }
        };

        tracing::trace!(topic = %rendered.topic_id, formats = %rendered.formats, state = ?rendered.state, "rendered");
        for diagnostic in &rendered.diagnostics {
            let warning = diagnostic.to_string();
            if !outcome.warnings.contains(&warning) {
                tracing::warn!(topic = %rendered.topic_id, "{warning}");
                outcome.warnings.push(warning);
            }
        }

        for format in pass.formats() {
            if stop.load(Ordering::SeqCst) {
                tracing::debug!(topic = %rendered.topic_id, "build cancelled, not writing");
                return outcome;
            }
            let target = topic_output_path(output_dir, format, &rendered.file_stem);
            match write_file(&target, &rendered.serialize(format)) {
                Ok(()) => outcome.files.push(target),
                Err(err) => {
                    tracing::error!(topic = %rendered.topic_id, "failed to write {}: {err}", target.display());
                    outcome
                        .failures
                        .push(format!("failed to write {}: {err}", target.display()));
                }
            }
        }
    }

    outcome
}

fn write_file(path: &Path, content: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}
