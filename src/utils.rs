/// Configures a custom Rayon thread pool with specified size.
///
/// Used for directory mode when `--threads` is given, so page rendering does
/// not compete with the global pool size.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Resolves the thread count to use for a run.
///
/// A requested count above the number of CPUs is capped; `None` falls back
/// to the size of the global rayon pool.
///
/// # Errors
/// * If `requested` is `Some(0)`.
pub fn effective_threads(requested: Option<usize>) -> anyhow::Result<usize> {
    match requested {
        Some(n) if n > 0 => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                tracing::warn!(
                    requested = n,
                    max_threads,
                    "limiting thread count to available CPUs"
                );
                anyhow::Ok(max_threads)
            } else {
                anyhow::Ok(n)
            }
        }
        Some(_) => Err(anyhow::anyhow!("Number of threads must be a positive integer")),
        None => anyhow::Ok(rayon::current_num_threads()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_is_an_error() {
        assert!(effective_threads(Some(0)).is_err());
    }

    #[test]
    fn thread_count_is_capped() {
        let max = num_cpus::get();
        assert_eq!(effective_threads(Some(max + 8)).unwrap(), max);
        assert_eq!(effective_threads(Some(1)).unwrap(), 1);
        assert!(effective_threads(None).unwrap() >= 1);
    }

    #[test]
    fn pool_has_requested_size() {
        let pool = configure_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
