//! Platform abstraction: task spawning, timers, and logging setup.
//!
//! Everything runs on a single execution context. Native code must drive the
//! controller inside a `tokio::task::LocalSet`; wasm uses the browser's
//! microtask queue.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod runtime_wasm;
        pub use runtime_wasm::{init_logging, install_panic_hook, sleep, spawn_local};
    } else {
        mod runtime_native;
        pub use runtime_native::{init_logging, install_panic_hook, sleep, spawn_local};
    }
}
