use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use wasm_bindgen::prelude::*;

pub fn spawn_local<F>(fut: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(fut);
}

pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("{} {}", record.target(), record.args());
        let value = JsValue::from_str(&msg);
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&value),
            log::Level::Warn => web_sys::console::warn_1(&value),
            log::Level::Info => web_sys::console::info_1(&value),
            log::Level::Debug | log::Level::Trace => web_sys::console::log_1(&value),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;
static LOGGER_INIT: Once = Once::new();
static PANIC_HOOK: Once = Once::new();

pub fn init_logging(level: log::Level) {
    LOGGER_INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
    });
    log::set_max_level(level.to_level_filter());
}

pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&JsValue::from_str(&format!("panic: {info}")));
        }));
    });
}
