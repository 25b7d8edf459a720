use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, Mutex};

use crate::actors::{ActorHandle, InsightsActor, RunActor, TickActor};
use crate::config::Config;
use crate::core::registry::SourceCatalog;
use crate::insights::{GeminiClient, InsightsClient};
use crate::metrics;
use crate::pipeline::{Fetcher, HttpFetcher, RunSettings, TaskRunner};
use crate::random::StdRandom;
use crate::render::RenderState;
use crate::tea::{update, Command, Message, Model};
use crate::{dlog_debug, Result};

const MAX_BG_MESSAGES: usize = 50;

/// Long-lived collaborators the commands run against.
pub struct Services {
    pub runner: Arc<Mutex<TaskRunner>>,
    pub insights: Arc<dyn InsightsClient>,
    run: Option<ActorHandle>,
    insight_request: Option<ActorHandle>,
}

impl Services {
    pub fn new(runner: TaskRunner, insights: Arc<dyn InsightsClient>) -> Self {
        Self {
            runner: Arc::new(Mutex::new(runner)),
            insights,
            run: None,
            insight_request: None,
        }
    }

    fn shutdown(&self) {
        for handle in [&self.run, &self.insight_request].into_iter().flatten() {
            handle.shutdown();
        }
    }
}

/// Build the initial model and its services from `config`.
///
/// Metrics are drawn from the same random source the runner then keeps, so
/// a configured seed pins both.
pub fn bootstrap(config: Config) -> Result<(Model, Services)> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config.request_timeout())?);
    let mut random = StdRandom::from_seed_opt(config.seed);
    let samples = metrics::generate(config.metrics_samples, &mut random);

    let runner = TaskRunner::new(
        fetcher,
        SourceCatalog::new(config.resolved_sources()),
        Box::new(random),
        RunSettings::from_config(&config),
    );
    let services = Services::new(runner, Arc::new(GeminiClient::from_config(&config)));
    Ok((Model::new(config, samples), services))
}

pub struct LogicThread;

impl LogicThread {
    pub fn run(config: Config, state_tx: Sender<RenderState>, shutdown: Arc<AtomicBool>) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        dlog_debug!(
            "LogicThread::run_async model={} sources={}",
            config.model,
            config.sources.len()
        );
        let (mut model, mut services) = bootstrap(config)?;
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        let ticker = TickActor::new(msg_tx.clone()).spawn();

        send_state(&state_tx, &model);

        'main: loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Terminal input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => Message::Key(key),
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };
                if dispatch(&mut model, msg, &mut services, &msg_tx) {
                    shutdown.store(true, Ordering::Relaxed);
                    break 'main;
                }
                if model.dirty {
                    send_state(&state_tx, &model);
                    model.dirty = false;
                }
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                if dispatch(&mut model, msg, &mut services, &msg_tx) {
                    shutdown.store(true, Ordering::Relaxed);
                    break 'main;
                }
            }

            if model.dirty {
                send_state(&state_tx, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        dlog_debug!("LogicThread shutting down");
        ticker.shutdown();
        services.shutdown();
        Ok(())
    }
}

/// Run `msg` through update and execute the resulting commands.
/// Returns true when the app should quit.
fn dispatch(
    model: &mut Model,
    msg: Message,
    services: &mut Services,
    msg_tx: &mpsc::UnboundedSender<Message>,
) -> bool {
    update(model, msg)
        .into_iter()
        .any(|cmd| execute_command(cmd, services, msg_tx))
}

fn execute_command(
    cmd: Command,
    services: &mut Services,
    msg_tx: &mpsc::UnboundedSender<Message>,
) -> bool {
    match cmd {
        Command::StartRun { tasks } => {
            dlog_debug!("Command::StartRun tasks={}", tasks.len());
            let handle = RunActor::new(msg_tx.clone(), services.runner.clone(), tasks).spawn();
            services.run = Some(handle);
        }

        Command::FetchInsights(snapshot) => {
            dlog_debug!("Command::FetchInsights logs={}", snapshot.logs.len());
            let handle =
                InsightsActor::new(msg_tx.clone(), services.insights.clone(), snapshot).spawn();
            services.insight_request = Some(handle);
        }

        Command::Quit => {
            dlog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}
