//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute.

use crossterm::event::{KeyCode, KeyEvent};

use crate::insights::InsightSnapshot;
use crate::pipeline::RunEvent;
use crate::{dlog, dlog_debug, dlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Model, Notification, NotificationLevel, View};

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    dlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

fn set_info(model: &mut Model, message: String) {
    model.notification = Some(Notification {
        level: NotificationLevel::Info,
        message,
    });
}

/// Pure update function: Model + Message → Commands
///
/// All I/O happens via the returned commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None;
            model.dirty = true;
            update_keys(model, key, &mut cmds);
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::Tick => {
            // Only the running task's elapsed time moves between events.
            if model.is_running {
                model.dirty = true;
            }
        }

        Message::Run(RunEvent::Finished(summary)) => {
            dlog!(
                "Message::Run Finished run_id={} outcome={}",
                summary.run_id,
                summary.outcome
            );
            model.is_running = false;
            model.last_outcome = Some(summary.outcome);
            model.dirty = true;
            request_insights(model, &mut cmds);
        }

        Message::Run(event) => {
            if let Err(e) = model.pipeline.apply(event) {
                set_error(model, e.to_string());
            }
            model.dirty = true;
        }

        Message::InsightsReady(text) => {
            dlog_debug!("Message::InsightsReady len={}", text.len());
            model.insight = text;
            model.insights_loading = false;
            model.dirty = true;
        }
    }

    cmds
}

fn update_keys(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            if let Some(view) = View::from_index(index) {
                model.view = view;
            }
        }

        KeyCode::Tab => {
            model.view = model.view.next();
        }

        KeyCode::BackTab => {
            model.view = model.view.prev();
        }

        KeyCode::Char('r') => {
            if model.is_running {
                dlog_debug!("Run requested while a run is in flight, ignoring");
            } else {
                model.is_running = true;
                model.last_outcome = None;
                cmds.push(Command::StartRun {
                    tasks: model.pipeline.tasks.clone(),
                });
            }
        }

        KeyCode::Char('i') => {
            if model.insights_loading {
                dlog_debug!("Insights already loading, ignoring");
            } else {
                request_insights(model, cmds);
            }
        }

        KeyCode::Char('c') => {
            let cleared = model.pipeline.logs.len();
            model.pipeline.logs.clear();
            set_info(model, format!("Cleared {} log lines", cleared));
        }

        KeyCode::Char('j') | KeyCode::Down if model.view == View::Orchestration => {
            let len = model.pipeline.tasks.len();
            if len > 0 {
                model.selected = (model.selected + 1) % len;
            }
        }

        KeyCode::Char('k') | KeyCode::Up if model.view == View::Orchestration => {
            let len = model.pipeline.tasks.len();
            if len > 0 {
                model.selected = model.selected.checked_sub(1).unwrap_or(len - 1);
            }
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            cmds.push(Command::Quit);
        }

        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }

        _ => {}
    }
}

fn request_insights(model: &mut Model, cmds: &mut Vec<Command>) {
    model.insights_loading = true;
    model.dirty = true;
    cmds.push(Command::FetchInsights(InsightSnapshot::capture(
        &model.pipeline,
    )));
}
