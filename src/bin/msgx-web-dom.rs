#![cfg_attr(target_arch = "wasm32", no_main)]

// DOM-based Web frontend for msgx.
//
// JS side:
//   import init, { WasmApp } from "./msgx-web-dom.js";
//   const app = new WasmApp();
//   const snap = JSON.parse(app.snapshot_json());
//   const snap2 = JSON.parse(app.handle_action_json(JSON.stringify({ type: "Submit", text: "hi" })));
//
// The JS side owns the textarea and disables the submit button while
// `snap.mode.kind === "editor" && snap.mode.submitting`.

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use serde::Deserialize;
    use tokio::sync::mpsc::{error::TryRecvError, unbounded_channel, UnboundedReceiver};
    use wasm_bindgen::prelude::*;

    use msgx::{
        ledger::{RestClient, DEFAULT_NODE_URL},
        rpc_utils::HttpSettings,
        webshim::{current_pathname, BrowserWallet},
        App, AppEvent,
    };

    /// Actions from the DOM.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(tag = "type")]
    pub enum UiAction {
        /// Form submit with the textarea contents.
        Submit { text: String },
        /// Retry the wallet connect after a denial.
        Reconnect,
    }

    #[wasm_bindgen(start)]
    pub fn wasm_start() {
        msgx::platform::install_panic_hook();
        msgx::platform::init_logging(log::Level::Info);
        msgx::debug::init_once();
    }

    /// Wasm-exposed app wrapper: the controller plus its event receiver.
    #[wasm_bindgen]
    pub struct WasmApp {
        app: App,
        event_rx: UnboundedReceiver<AppEvent>,
    }

    #[wasm_bindgen]
    impl WasmApp {
        /// Resolve identity from the page path (or the wallet) and start fetching.
        #[wasm_bindgen(constructor)]
        #[allow(clippy::new_without_default)]
        pub fn new() -> WasmApp {
            let (event_tx, event_rx) = unbounded_channel::<AppEvent>();
            let ledger = Rc::new(RestClient::new(DEFAULT_NODE_URL, HttpSettings::default()));
            let mut app = App::new(ledger, Rc::new(BrowserWallet), event_tx);

            let path = current_pathname();
            log::info!("[WasmApp] starting at {path:?} against {DEFAULT_NODE_URL}");
            app.start(&path);

            WasmApp { app, event_rx }
        }

        /// Get a fresh snapshot as JSON (drains pending events first).
        #[wasm_bindgen]
        pub fn snapshot_json(&mut self) -> String {
            self.drain_events();
            self.render()
        }

        /// Apply an action (JSON-encoded UiAction) and return an updated snapshot.
        #[wasm_bindgen]
        pub fn handle_action_json(&mut self, action_json: String) -> String {
            self.drain_events();
            match serde_json::from_str::<UiAction>(&action_json) {
                Ok(UiAction::Submit { text }) => {
                    if let Err(e) = self.app.submit(&text) {
                        log::warn!("[WasmApp] submit refused: {e}");
                    }
                }
                Ok(UiAction::Reconnect) => self.app.reconnect(),
                Err(e) => log::warn!("Failed to deserialize UiAction ({e}): {action_json:?}"),
            }
            self.render()
        }

        /// True while the controller still has work outstanding.
        #[wasm_bindgen]
        pub fn busy(&mut self) -> bool {
            self.drain_events();
            !self.app.is_settled()
        }
    }

    impl WasmApp {
        fn render(&self) -> String {
            serde_json::to_string(&self.app.snapshot()).unwrap_or_else(|e| {
                log::error!("Failed to serialize ViewSnapshot: {e}");
                "{}".to_string()
            })
        }

        fn drain_events(&mut self) {
            loop {
                match self.event_rx.try_recv() {
                    Ok(ev) => self.app.on_event(ev),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::warn!("[WasmApp] Event channel disconnected");
                        break;
                    }
                }
            }
        }
    }
}

// Native builds: just provide a stub main so `cargo build --all-features` doesn't explode.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("msgx-web-dom is only supported on wasm32 (browser) target.");
}
