//! Logical thread identity for slot selection.
//!
//! The pool picks a slot from the id reported by a [`ThreadContext`]. The
//! default [`RayonContext`] reports the index of the current worker in the
//! rayon pool, and 0 outside any parallel region, so serial code always
//! lands in slot 0.

/// Source of the calling thread's logical id and the expected thread count.
pub trait ThreadContext: Send + Sync {
    /// Id of the calling thread, in `[0, estimate_max_threads())` for
    /// threads of the pool this context describes.
    fn current_thread_id(&self) -> usize;

    /// Number of slots a pool should allocate by default.
    fn estimate_max_threads(&self) -> usize;
}

/// Thread identity from the rayon global (or installed) thread pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RayonContext;

impl ThreadContext for RayonContext {
    #[inline]
    fn current_thread_id(&self) -> usize {
        rayon::current_thread_index().unwrap_or(0)
    }

    fn estimate_max_threads(&self) -> usize {
        estimate_max_threads()
    }
}

/// Context reporting a fixed id; for serial drivers and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedContext {
    /// Id returned by `current_thread_id`.
    pub id: usize,
    /// Count returned by `estimate_max_threads`; at least 1 is used.
    pub max_threads: usize,
}

impl FixedContext {
    /// Context pinned to `id` in a pool of `max_threads`.
    pub fn new(id: usize, max_threads: usize) -> Self {
        Self { id, max_threads }
    }
}

impl ThreadContext for FixedContext {
    #[inline]
    fn current_thread_id(&self) -> usize {
        self.id
    }

    fn estimate_max_threads(&self) -> usize {
        self.max_threads.max(1)
    }
}

/// Upper estimate of the number of threads a parallel region may use.
///
/// The maximum of the rayon pool size, the standard library's available
/// parallelism and the logical CPU count; never less than 1.
pub fn estimate_max_threads() -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    rayon::current_num_threads()
        .max(available)
        .max(num_cpus::get())
        .max(1)
}
