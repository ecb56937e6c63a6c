//! # Task Management System
//!
//! A bounded pool of worker threads plus the machinery that moves work to
//! them and completed results back to the main thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: central coordinator for task distribution
//! - `Task`: a unit of background work (a terrain fill, a mesh build)
//! - `Completion`: the main-thread continuation of a finished task
//! - `TaskChannel`: the mpsc channel pair backing one worker thread
//!
//! ## Scheduling
//!
//! Tasks are distributed round-robin across worker channels. Each channel
//! accepts a bounded number of in-flight tasks; excess work queues in the
//! manager and is re-dispatched as workers free up. Completions are drained
//! on the main thread at most once per tick; only what is already waiting
//! is taken, so completions arriving mid-drain never starve the tick.

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, info};

use task::{Completion, Task};

/// Maximum number of tasks in flight per worker channel.
///
/// One per channel keeps each worker processing in publish order and lets
/// the manager's own queue provide the elasticity.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// The mpsc channel pair connecting the main thread to one worker.
struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    completion_receiver: Receiver<Box<dyn Completion + Send>>,
    tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Owned by the streamer and driven entirely from the main thread: publish
/// work whenever, drain completions once per tick.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker
    /// threads.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (completion_tx, completion_rx) = channel::<Box<dyn Completion + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let completion = task.process();
                    let _ = completion_tx.send(completion);
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                completion_receiver: completion_rx,
                tasks_in_flight: 0,
                _worker: worker,
            });
        }

        info!("task manager started with {} workers", num_workers);

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// Returns the task back on failure (worker disconnected) so it can be
    /// requeued.
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].tasks_in_flight += 1;
                Ok(())
            }
            Err(send_error) => Err(send_error.0),
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from
    /// the last used channel so load spreads evenly.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        if self
            .channels
            .iter()
            .all(|channel| channel.tasks_in_flight >= MAX_TASKS_IN_FLIGHT)
        {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            if self.channels[current].tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                error!("all channels are full, but missed the first check");
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// The task is sent to an available worker immediately, or queued in the
    /// manager when every channel is at its in-flight cap. Never blocks.
    ///
    /// # Returns
    /// `true` if the task went straight to a worker, `false` if it queued.
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if self.channels.is_empty() {
            self.queued_tasks.push_back(task);
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Re-dispatches queued tasks while workers are available.
    ///
    /// Called once per tick, after the completion drain has freed up
    /// channels. Processes the queue in FIFO order and stops at the first
    /// task that cannot be placed.
    pub fn process_queued_tasks(&mut self) {
        if self.queued_tasks.is_empty() {
            return;
        }

        match self.find_available_channel() {
            None => {}
            Some(mut channel_idx) => {
                while let Some(task) = self.queued_tasks.pop_front() {
                    match self.try_send_task(task, channel_idx) {
                        Ok(_) => match self.find_available_channel() {
                            Some(next_idx) => channel_idx = next_idx,
                            None => break,
                        },
                        Err(task) => {
                            // Channel disconnected; put the task back and
                            // stop for this tick.
                            self.queued_tasks.push_front(task);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Drains every completion currently waiting on any channel.
    ///
    /// Takes only what is already queued at call time: work finishing during
    /// the drain is picked up next tick. Completions come back in arrival
    /// order per channel.
    pub fn drain_completions(&mut self) -> Vec<Box<dyn Completion + Send>> {
        let mut completions = Vec::new();
        for channel in &mut self.channels {
            while let Ok(completion) = channel.completion_receiver.try_recv() {
                channel.tasks_in_flight -= 1;
                completions.push(completion);
            }
        }
        completions
    }

    /// Number of tasks currently being processed by workers.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.tasks_in_flight)
            .sum()
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::streamer::WorldStreamer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    struct CountingTask {
        processed: Arc<AtomicUsize>,
    }

    struct CountingCompletion;

    impl Task for CountingTask {
        fn process(&self) -> Box<dyn Completion + Send> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingCompletion)
        }
    }

    impl Completion for CountingCompletion {
        fn apply(self: Box<Self>, _streamer: &mut WorldStreamer) {}
    }

    fn drain_until(manager: &mut TaskManager, count: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut drained = 0;
        while drained < count && Instant::now() < deadline {
            drained += manager.drain_completions().len();
            manager.process_queued_tasks();
            std::thread::sleep(Duration::from_millis(1));
        }
        drained
    }

    #[test]
    fn tasks_run_and_complete() {
        let processed = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(2);

        for _ in 0..8 {
            manager.publish_task(Box::new(CountingTask {
                processed: processed.clone(),
            }));
        }

        assert_eq!(drain_until(&mut manager, 8), 8);
        assert_eq!(processed.load(Ordering::SeqCst), 8);
        assert_eq!(manager.tasks_in_flight(), 0);
        assert_eq!(manager.queued_task_count(), 0);
    }

    #[test]
    fn excess_tasks_queue_until_workers_free_up() {
        let processed = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(1);

        let mut direct = 0;
        for _ in 0..4 {
            if manager.publish_task(Box::new(CountingTask {
                processed: processed.clone(),
            })) {
                direct += 1;
            }
        }
        // One slot per worker: at most one direct dispatch.
        assert_eq!(direct, 1);
        assert_eq!(manager.queued_task_count(), 3);

        assert_eq!(drain_until(&mut manager, 4), 4);
        assert_eq!(processed.load(Ordering::SeqCst), 4);
    }
}
