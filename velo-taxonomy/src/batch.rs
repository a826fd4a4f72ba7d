//! Chunked dispatch of store write operations.

use futures::future::join_all;
use std::future::Future;
use tracing::info;
use velo_common::{Error, Result};

/// Run `op` over every item, dispatching at most `batch_size`
/// operations concurrently and completing each chunk before the next
/// one starts. Returns the number of completed operations.
///
/// Chunking is the only concurrency bound: within a chunk the
/// operations run concurrently and may settle in any order, which is
/// safe as long as each targets a disjoint unique key. A failure fails
/// the chunk as a unit once all of its operations have settled, and no
/// further chunks are dispatched. Already committed chunks are not
/// rolled back.
pub async fn run_in_batches<T, F, Fut>(items: Vec<T>, batch_size: usize, op: F) -> Result<usize>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if batch_size == 0 {
        return Err(Error::Config(
            "batch size must be a positive integer".to_string(),
        ));
    }

    let total = items.len();
    let mut completed = 0usize;
    let mut pending = items.into_iter();

    loop {
        let chunk: Vec<T> = pending.by_ref().take(batch_size).collect();
        if chunk.is_empty() {
            break;
        }

        let dispatched = chunk.len();
        let results = join_all(chunk.into_iter().map(&op)).await;
        results.into_iter().collect::<Result<Vec<()>>>()?;

        completed += dispatched;
        info!(completed, total, "Committed batch of {} writes", dispatched);
    }

    Ok(completed)
}
