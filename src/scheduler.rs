//! One-shot scheduling of the daily routine.
//!
//! A [`Schedule`] holds the night's tasks. Running it makes a single pass in
//! time order on the calling thread: tasks already in the past either run at
//! once or are dropped according to their [`MissedPolicy`], future tasks are
//! waited for on the context clock. Every task can be cancelled through its
//! [`TaskHandle`], and a shutdown request aborts whatever is still pending.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::clock::RoutineContext;
use crate::constants::CHECK_INTERVAL_SECS;
use crate::logger::Log;

/// A labelled instant, used for the timeline and for past/future decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub label: String,
    pub at: DateTime<Local>,
}

impl ScheduledEvent {
    pub fn new(label: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            label: label.into(),
            at,
        }
    }
}

/// What to do with a task whose instant has already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissedPolicy {
    /// State-setting actions still make sense late.
    RunImmediately,
    /// Sessions only make sense at their instant.
    Skip,
}

/// Cancellation handle for one scheduled task.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle(Arc<AtomicBool>);

impl TaskHandle {
    /// Takes effect within one check interval, even while the pass is
    /// already waiting for this task's instant.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a task's turn in the pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDisposition {
    Ran,
    /// Past and run anyway (`MissedPolicy::RunImmediately`).
    RanLate,
    /// Past and dropped (`MissedPolicy::Skip`).
    Missed,
    /// Ran, but the action returned an error.
    Failed,
    Cancelled,
    /// Shutdown came before the task's instant.
    Interrupted,
}

type Action<'a> = Box<dyn FnMut(&RoutineContext) -> Result<()> + 'a>;

struct Task<'a> {
    event: ScheduledEvent,
    policy: MissedPolicy,
    handle: TaskHandle,
    action: Action<'a>,
}

/// The tasks of one night.
#[derive(Default)]
pub struct Schedule<'a> {
    tasks: Vec<Task<'a>>,
}

impl<'a> Schedule<'a> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Add a task and return the handle that cancels it.
    pub fn add<F>(
        &mut self,
        label: impl Into<String>,
        at: DateTime<Local>,
        policy: MissedPolicy,
        action: F,
    ) -> TaskHandle
    where
        F: FnMut(&RoutineContext) -> Result<()> + 'a,
    {
        let handle = TaskHandle::default();
        self.tasks.push(Task {
            event: ScheduledEvent::new(label, at),
            policy,
            handle: handle.clone(),
            action: Box::new(action),
        });
        handle
    }

    /// The scheduled instants, in insertion order.
    pub fn events(&self) -> Vec<ScheduledEvent> {
        self.tasks.iter().map(|t| t.event.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Execute the pass. Returns each task's label with how it ended, in the
    /// order the tasks were considered.
    pub fn run(mut self, ctx: &RoutineContext) -> Vec<(String, TaskDisposition)> {
        // Stable: tasks sharing an instant keep their insertion order
        self.tasks.sort_by_key(|t| t.event.at);
        let now = ctx.clock.now();
        let mut report = Vec::with_capacity(self.tasks.len());

        for mut task in self.tasks {
            let label = task.event.label.clone();
            let disposition = if !ctx.is_running() {
                TaskDisposition::Interrupted
            } else if task.handle.is_cancelled() {
                Log::log_debug(&format!("{label}: cancelled"));
                TaskDisposition::Cancelled
            } else if task.event.at < now {
                match task.policy {
                    MissedPolicy::RunImmediately => {
                        Log::log_block_start(&format!("{label}: time already passed, applying now."));
                        execute(&mut task, ctx, TaskDisposition::RanLate)
                    }
                    MissedPolicy::Skip => {
                        Log::log_block_start(&format!("{label}: time already passed, skipped."));
                        TaskDisposition::Missed
                    }
                }
            } else {
                Log::log_debug(&format!(
                    "Waiting for {label} at {}",
                    task.event.at.format("%Y-%m-%d %H:%M:%S")
                ));
                match wait_for(&task, ctx) {
                    Some(stopped) => stopped,
                    None => execute(&mut task, ctx, TaskDisposition::Ran),
                }
            };
            report.push((label, disposition));
        }

        report
    }
}

/// Wait for the task's instant one check interval at a time. Returns the
/// disposition if a cancel or shutdown ended the wait early.
fn wait_for(task: &Task, ctx: &RoutineContext) -> Option<TaskDisposition> {
    let slice = chrono::Duration::seconds(CHECK_INTERVAL_SECS as i64);

    loop {
        if task.handle.is_cancelled() {
            Log::log_debug(&format!("{}: cancelled while waiting", task.event.label));
            return Some(TaskDisposition::Cancelled);
        }
        let now = ctx.clock.now();
        if now >= task.event.at {
            return None;
        }
        if !ctx.clock.sleep_until(task.event.at.min(now + slice), ctx.running) {
            return Some(TaskDisposition::Interrupted);
        }
    }
}

fn execute(task: &mut Task, ctx: &RoutineContext, success: TaskDisposition) -> TaskDisposition {
    match (task.action)(ctx) {
        Ok(()) => success,
        Err(e) => {
            Log::log_error(&format!("{} failed: {e:#}", task.event.label));
            TaskDisposition::Failed
        }
    }
}

/// Render events as column-aligned `label : time` lines, sorted by time.
pub fn format_timeline(events: &[ScheduledEvent]) -> Vec<String> {
    let mut events: Vec<&ScheduledEvent> = events.iter().collect();
    events.sort_by_key(|e| e.at);

    let width = events
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0);

    events
        .iter()
        .map(|e| {
            format!(
                "{:<width$} : {:>11}",
                e.label,
                e.at.format("%l:%M:%S %p").to_string(),
                width = width
            )
        })
        .collect()
}
