//! Worker pool shared by the parallel phases.

use rayon::prelude::*;
use rayon::ThreadPool;

use causeway_core::errors::SearchError;

/// Dedicated pool; `parallelism == 0` means one worker per logical CPU.
pub(crate) fn build_pool(parallelism: usize) -> Result<ThreadPool, SearchError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .thread_name(|i| format!("causeway-worker-{i}"))
        .build()
        .map_err(|e| SearchError::invalid(format!("cannot build worker pool: {e}")))
}

/// Map `f` over `items` on `pool`, keeping input order. Returns once every
/// task has finished, which is the barrier between phases. A single-worker
/// pool runs the items in order on the calling thread.
pub(crate) fn map_ordered<T, R, F>(pool: &ThreadPool, items: &[T], f: F) -> Result<Vec<R>, SearchError>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R, SearchError> + Sync + Send,
{
    if pool.current_num_threads() <= 1 {
        items.iter().map(f).collect()
    } else {
        pool.install(|| items.par_iter().map(f).collect())
    }
}
