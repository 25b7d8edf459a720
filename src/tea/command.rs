//! Commands are outputs from the update function. The logic thread executes
//! them; update itself never touches the network or spawns anything.

use crate::core::task::Task;
use crate::insights::InsightSnapshot;

#[derive(Debug)]
pub enum Command {
    /// Kick off one pipeline run over these tasks.
    StartRun { tasks: Vec<Task> },

    /// Ask the insights backend about this snapshot.
    FetchInsights(InsightSnapshot),

    Quit,
}
