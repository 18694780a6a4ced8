use std::num::NonZeroUsize;

use inspector_core::config::{RuntimeFlavor, RuntimeSettings};
use tokio::runtime::{Builder, Runtime};

/// Resolve `auto` against the CPU count. Never returns `Auto`.
pub fn select_flavor(requested: RuntimeFlavor, available_cpus: usize) -> RuntimeFlavor {
    match requested {
        RuntimeFlavor::Auto if available_cpus > 1 => RuntimeFlavor::MultiThread,
        RuntimeFlavor::Auto => RuntimeFlavor::CurrentThread,
        explicit => explicit,
    }
}

pub fn build_runtime(settings: &RuntimeSettings) -> std::io::Result<Runtime> {
    let cpus = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);

    let mut builder = match select_flavor(settings.flavor, cpus) {
        RuntimeFlavor::CurrentThread => Builder::new_current_thread(),
        _ => {
            let mut builder = Builder::new_multi_thread();
            if let Some(workers) = settings.worker_threads.filter(|workers| *workers > 0) {
                builder.worker_threads(workers);
            }
            builder
        }
    };

    builder.enable_all().thread_name("inspector-worker").build()
}

#[cfg(test)]
mod tests {
    use inspector_core::config::{RuntimeFlavor, RuntimeSettings};

    use super::{build_runtime, select_flavor};

    #[test]
    fn auto_follows_cpu_count() {
        assert_eq!(select_flavor(RuntimeFlavor::Auto, 8), RuntimeFlavor::MultiThread);
        assert_eq!(select_flavor(RuntimeFlavor::Auto, 1), RuntimeFlavor::CurrentThread);
    }

    #[test]
    fn explicit_flavor_wins() {
        assert_eq!(
            select_flavor(RuntimeFlavor::CurrentThread, 8),
            RuntimeFlavor::CurrentThread
        );
        assert_eq!(
            select_flavor(RuntimeFlavor::MultiThread, 1),
            RuntimeFlavor::MultiThread
        );
    }

    #[test]
    fn builds_a_working_runtime() {
        let runtime = build_runtime(&RuntimeSettings {
            flavor: RuntimeFlavor::MultiThread,
            worker_threads: Some(2),
        })
        .unwrap();

        assert_eq!(runtime.block_on(async { 40 + 2 }), 42);
    }
}
