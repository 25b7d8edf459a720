//! Run actor: drives one pipeline run and forwards its events.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::core::task::Task;
use crate::pipeline::TaskRunner;
use crate::tea::Message;
use crate::{dlog_debug, dlog_warn};

use super::ActorHandle;

/// Executes a single run on a shared runner.
///
/// The runner sits behind a mutex so its random source carries over between
/// runs. The model's run guard keeps the lock uncontended.
pub struct RunActor {
    msg_tx: mpsc::UnboundedSender<Message>,
    runner: Arc<Mutex<TaskRunner>>,
    tasks: Vec<Task>,
}

impl RunActor {
    pub fn new(
        msg_tx: mpsc::UnboundedSender<Message>,
        runner: Arc<Mutex<TaskRunner>>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            msg_tx,
            runner,
            tasks,
        }
    }

    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        dlog_debug!("RunActor::spawn tasks={}", self.tasks.len());

        tokio::spawn(async move {
            let (event_tx, mut event_rx) = mpsc::unbounded_channel();
            let msg_tx = self.msg_tx;
            let runner = self.runner;
            let tasks = self.tasks;

            let run = async move {
                let mut runner = runner.lock().await;
                runner.run(tasks, &event_tx).await;
                // event_tx drops here, ending the forwarder
            };
            let forward = async move {
                while let Some(event) = event_rx.recv().await {
                    if msg_tx.send(Message::Run(event)).is_err() {
                        dlog_warn!("RunActor: message channel closed");
                        break;
                    }
                }
            };

            tokio::select! {
                _ = cancel_clone.cancelled() => {
                    dlog_debug!("RunActor cancelled");
                }
                _ = futures::future::join(run, forward) => {
                    dlog_debug!("RunActor finished");
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
