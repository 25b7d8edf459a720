//! One-shot insight request.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::dlog_debug;
use crate::insights::{fetch_insights, InsightSnapshot, InsightsClient};
use crate::tea::Message;

use super::ActorHandle;

pub struct InsightsActor {
    msg_tx: mpsc::UnboundedSender<Message>,
    client: Arc<dyn InsightsClient>,
    snapshot: InsightSnapshot,
}

impl InsightsActor {
    pub fn new(
        msg_tx: mpsc::UnboundedSender<Message>,
        client: Arc<dyn InsightsClient>,
        snapshot: InsightSnapshot,
    ) -> Self {
        Self {
            msg_tx,
            client,
            snapshot,
        }
    }

    /// No timeout: the panel waits as long as the backend does.
    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        dlog_debug!("InsightsActor::spawn tasks={}", self.snapshot.tasks.len());

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_clone.cancelled() => {
                    dlog_debug!("InsightsActor cancelled");
                }
                text = fetch_insights(self.client.as_ref(), &self.snapshot) => {
                    let _ = self.msg_tx.send(Message::InsightsReady(text));
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
