use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Build the process-wide runtime with one worker per configured I/O
/// thread. The first caller sizes the pool; later calls get the same
/// runtime regardless of the count they pass.
pub fn init(io_threads: usize) -> &'static Runtime {
    RUNTIME.get_or_init(|| build(io_threads))
}

/// The process-wide runtime. Contexts that never call `init` (tests, mostly)
/// get a single-worker pool.
pub fn handle() -> &'static Runtime {
    RUNTIME.get_or_init(|| build(1))
}

fn build(io_threads: usize) -> Runtime {
    Builder::new_multi_thread()
        .worker_threads(io_threads.max(1))
        .thread_name("ws-io")
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_caller_sizes_the_pool() {
        let first = init(2);
        let second = init(8);
        assert!(std::ptr::eq(first, second));

        first.block_on(async {
            let task = tokio::spawn(async { 21 * 2 });
            assert_eq!(task.await.unwrap(), 42);
        });
    }

    #[test]
    fn handle_falls_back_to_a_default_pool() {
        handle().block_on(async {
            assert_eq!(tokio::spawn(async { 1 + 1 }).await.unwrap(), 2);
        });
    }
}
