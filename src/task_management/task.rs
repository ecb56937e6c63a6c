//! # Task System Core Traits
//!
//! The fundamental building blocks of the background work system.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method runs on a worker thread
//! 3. The task returns a boxed `Completion`
//! 4. The completion is drained on the main thread, at most once per tick
//! 5. The completion's `apply()` runs against the streamer
//!
//! ## Thread Safety
//! Both traits are `Send`: tasks travel to workers, completions travel back.
//! A task owns everything it needs (shared chunks travel as
//! [`MtResource`](crate::core::MtResource) clones), so workers never reach
//! into main-thread state.

use crate::world::streamer::WorldStreamer;

/// A unit of work executed on a background worker.
///
/// Tasks should be coarse-grained (one terrain fill, one mesh build) to
/// amortize scheduling overhead, and must own or share everything they
/// touch.
pub trait Task: Send {
    /// Performs the work and returns the completion to apply on the main
    /// thread.
    fn process(&self) -> Box<dyn Completion + Send>;
}

/// The main-thread continuation of a completed [`Task`].
///
/// Applied against the streamer during the per-tick completion drain, in
/// arrival order. Implementations must re-validate their target: the chunk
/// slot they were dispatched for may have been reclaimed and reassigned
/// while the work was in flight (the per-chunk epoch exists for exactly this
/// check).
pub trait Completion: Send {
    /// Applies the result of the background work to the streamer.
    fn apply(self: Box<Self>, streamer: &mut WorldStreamer);
}
