//! Crawler coordinator - run lifecycle and worker pool
//!
//! This module contains the [`Grabber`], the handle a front-end uses to start
//! and stop runs, and the driver task behind each run:
//! - Seeding the frontier
//! - Keeping at most `max_concurrent_fetches` workers in flight
//! - Feeding extracted links back into the scheduler at depth + 1
//! - Draining on stop or failure and emitting exactly one terminal event

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::parser::extract_links;
use crate::crawler::registry::VisitedRegistry;
use crate::crawler::scheduler::{CrawlTask, Scheduler};
use crate::output::{
    status_channel, CrawlStatistics, RunStatistics, StatusEvent, StatusReceiver, StatusSender,
};
use crate::state::{CrawlState, RunState};
use crate::storage::{path_extension, FileStorage, Storage, StorageError, DEFAULT_EXTENSION};
use crate::url::SiteIdentity;
use crate::GrabError;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};
use url::Url;

/// Everything a worker needs, shared by all workers of one run
struct RunContext {
    client: Client,
    storage: Arc<dyn Storage>,
    state: Arc<RunState>,
    stats: Arc<RunStatistics>,
    status: StatusSender,
}

/// Links found by a worker, to be offered one level deeper
struct Expansion {
    base_url: Url,
    depth: u32,
    links: Vec<Url>,
}

/// A fetched page that could not be persisted
struct PersistFailure {
    url: Url,
    error: StorageError,
}

/// Handles of the most recent run
struct ActiveRun {
    state: Arc<RunState>,
    stats: Arc<RunStatistics>,
    registry: Arc<VisitedRegistry>,
    driver: Option<JoinHandle<()>>,
}

impl ActiveRun {
    /// Waits for the driver task to return
    async fn join(&mut self) {
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                tracing::error!("Crawl supervisor terminated abnormally: {}", e);
                self.state.finish(CrawlState::Failed);
            }
        }
    }
}

/// Entry point for mirroring a site
///
/// At most one run is active per grabber. A finished run can be followed by
/// a new one, which starts with an empty visited registry.
///
/// # Example
///
/// ```no_run
/// use webgrab::{CrawlConfig, Grabber, StatusEvent};
///
/// # async fn example() -> Result<(), webgrab::GrabError> {
/// let config = CrawlConfig::new("https://example.com/", "mirror")?;
/// let mut grabber = Grabber::new();
/// let mut events = grabber.start(config)?;
///
/// while let Some(event) = events.recv().await {
///     println!("{}", event);
///     if event.is_terminal() {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Grabber {
    run: Option<ActiveRun>,
}

impl Grabber {
    /// Creates an idle grabber
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run that mirrors into `config.output_root`
    ///
    /// The output directory is created if it does not exist. Must be called
    /// from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(StatusReceiver)` - The run's status stream
    /// * `Err(GrabError::AlreadyRunning)` - A run is still in progress
    /// * `Err(GrabError::Io)` - The output directory could not be created
    pub fn start(&mut self, config: CrawlConfig) -> Result<StatusReceiver, GrabError> {
        self.ensure_not_running()?;
        std::fs::create_dir_all(&config.output_root)?;
        let storage = Arc::new(FileStorage::new(&config.output_root));
        self.start_with_storage(config, storage)
    }

    /// Starts a run that persists through `storage`
    ///
    /// `config.output_root` is not touched; `storage` decides where content goes.
    pub fn start_with_storage(
        &mut self,
        config: CrawlConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<StatusReceiver, GrabError> {
        self.ensure_not_running()?;
        let client = build_http_client(&config)?;

        let registry = Arc::new(VisitedRegistry::new());
        let state = Arc::new(RunState::started());
        let stats = Arc::new(RunStatistics::new());

        let mut scheduler = Scheduler::new(
            registry.clone(),
            config.max_depth,
            config.max_concurrent_fetches,
        );
        if scheduler
            .offer(&config.seed_url, &config.seed_url, 0)
            .is_ok()
        {
            state.task_added();
        }

        let (status, receiver) = status_channel();
        let context = Arc::new(RunContext {
            client,
            storage,
            state: state.clone(),
            stats: stats.clone(),
            status: status.clone(),
        });

        tracing::info!(
            "Starting grab of {} into {} (max depth {}, {} workers)",
            config.seed_url,
            config.output_root.display(),
            config.max_depth,
            scheduler.concurrency()
        );

        let driver = tokio::spawn(supervise(
            tokio::spawn(drive(context, scheduler)),
            state.clone(),
            status,
        ));

        self.run = Some(ActiveRun {
            state,
            stats,
            registry,
            driver: Some(driver),
        });

        Ok(receiver)
    }

    /// Stops the active run and waits until it has drained
    ///
    /// In-flight fetches are allowed to finish; their results are discarded.
    /// Does nothing when no run is active.
    pub async fn stop(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        if run.state.phase() == CrawlState::Running && run.state.request_stop() {
            tracing::info!(
                "Stop requested, draining {} active tasks",
                run.state.active_tasks()
            );
        }

        run.join().await;
    }

    /// Waits for the active run to end on its own
    ///
    /// Returns the final state, or `Idle` if no run was ever started.
    pub async fn wait(&mut self) -> CrawlState {
        match self.run.as_mut() {
            Some(run) => {
                run.join().await;
                run.state.phase()
            }
            None => CrawlState::Idle,
        }
    }

    /// Current state of the most recent run
    pub fn state(&self) -> CrawlState {
        self.run
            .as_ref()
            .map_or(CrawlState::Idle, |run| run.state.phase())
    }

    /// Tasks queued or in flight in the current run
    pub fn active_tasks(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.state.active_tasks())
    }

    /// Statistics of the most recent run
    pub fn statistics(&self) -> Option<CrawlStatistics> {
        self.run
            .as_ref()
            .map(|run| run.stats.snapshot(run.state.phase(), run.registry.len()))
    }

    fn ensure_not_running(&self) -> Result<(), GrabError> {
        if self.state() == CrawlState::Running {
            return Err(GrabError::AlreadyRunning);
        }
        Ok(())
    }
}

impl Drop for Grabber {
    fn drop(&mut self) {
        // The detached driver notices the flag and winds down on its own
        if let Some(run) = &self.run {
            run.state.request_stop();
        }
    }
}

/// Runs the worker pool of one crawl until the task graph is exhausted,
/// a stop is requested, or persistence fails
async fn drive(context: Arc<RunContext>, mut scheduler: Scheduler) {
    let mut workers: JoinSet<Result<Expansion, PersistFailure>> = JoinSet::new();
    let mut failure: Option<GrabError> = None;

    loop {
        if context.state.is_running() {
            while let Some(task) = scheduler.next_task(workers.len()) {
                let context = context.clone();
                workers.spawn(async move { process_task(&context, task).await });
            }
        } else {
            let discarded = scheduler.discard_pending();
            if discarded > 0 {
                tracing::debug!("Discarded {} queued tasks", discarded);
                context.state.tasks_finished(discarded);
            }
        }

        let Some(joined) = workers.join_next().await else {
            break;
        };

        match joined {
            Ok(Ok(expansion)) => {
                if context.state.is_running() {
                    for link in &expansion.links {
                        if scheduler
                            .offer(link, &expansion.base_url, expansion.depth)
                            .is_ok()
                        {
                            context.state.task_added();
                        }
                    }
                }
            }
            Ok(Err(PersistFailure { url, error })) => {
                tracing::error!("Failed to save {}: {}", url, error);
                context
                    .status
                    .progress(format!("Failed to save {}: {}", url, error));
                failure.get_or_insert(GrabError::Storage(error));
                context.state.request_stop();
            }
            Err(e) => {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        // Children are counted before their parent is released
        context.state.tasks_finished(1);
    }

    debug_assert_eq!(context.state.active_tasks(), 0);

    let (terminal, event) = match failure {
        Some(error) => (CrawlState::Failed, StatusEvent::Failed(error.to_string())),
        None if !context.state.is_running() => (CrawlState::Stopped, StatusEvent::Stopped),
        None => (CrawlState::Completed, StatusEvent::Completed),
    };

    context.stats.mark_finished();
    if context.state.finish(terminal) {
        tracing::info!("Grab {}", terminal);
        context.status.send(event);
    }
}

/// Waits for a run's driver and reports it as failed if it panicked
///
/// Holds its own sender so the status stream stays open until the driver
/// has either sent its terminal event or been reported here.
async fn supervise(driver: JoinHandle<()>, state: Arc<RunState>, status: StatusSender) {
    if let Err(e) = driver.await {
        tracing::error!("Crawl driver terminated abnormally: {}", e);
        if state.finish(CrawlState::Failed) {
            status.send(StatusEvent::Failed(format!(
                "Crawl driver terminated abnormally: {}",
                e
            )));
        }
    }
}

/// Fetches one task, persists the body and returns the links to follow
async fn process_task(
    context: &RunContext,
    task: CrawlTask,
) -> Result<Expansion, PersistFailure> {
    let mut expansion = Expansion {
        base_url: task.base_url.clone(),
        depth: task.depth + 1,
        links: Vec::new(),
    };

    if !context.state.is_running() {
        return Ok(expansion);
    }

    tracing::debug!("Fetching {} (depth {})", task.url, task.depth);
    let result = fetch_url(&context.client, task.url.as_str()).await;

    if !context.state.is_running() {
        tracing::debug!("Discarding result for {} after stop", task.url);
        return Ok(expansion);
    }

    let (content, content_type) = match result {
        FetchResult::Body {
            content,
            content_type,
        } => (content, content_type),
        FetchResult::Failed { reason } => {
            tracing::warn!("Failed to grab {}: {}", task.url, reason);
            context.stats.record_failed();
            context
                .status
                .progress(format!("Failed to grab {}: {}", task.url, reason));
            return Ok(expansion);
        }
    };

    let extension = path_extension(&task.url);
    let site = SiteIdentity::from_url(&task.base_url);

    let path = context
        .storage
        .save(&task.url, &content, &extension, site.as_ref())
        .map_err(|error| PersistFailure {
            url: task.url.clone(),
            error,
        })?;

    context.stats.record_grabbed(content.len());
    tracing::info!(
        "Grabbed {} -> {} ({} bytes, {})",
        task.url,
        path.display(),
        content.len(),
        content_type.as_deref().unwrap_or("no content type")
    );
    context.status.progress(format!("Grabbed: {}", task.url));

    if extension == DEFAULT_EXTENSION {
        let links = extract_links(&content, &task.url);
        context.stats.record_links(links.len());
        expansion.links = links.into_iter().collect();
    }

    Ok(expansion)
}
