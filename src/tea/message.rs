//! Messages are inputs to the update function: terminal events, progress
//! from the run actor, and completion of insight requests.

use crossterm::event::KeyEvent;

use crate::pipeline::RunEvent;

#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    /// Periodic wake-up so running task durations stay fresh.
    Tick,

    /// Forwarded from the run actor, in emission order.
    Run(RunEvent),

    /// Text to show in the insights panel.
    InsightsReady(String),
}
