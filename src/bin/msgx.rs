// Native binary for msgx - resolve, settle, optionally write once, print.

use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::LocalSet;

use msgx::{
    config::{load, Config},
    credentials::LocalWallet,
    debug,
    ledger::{LedgerClient, RestClient},
    platform,
    wallet::{DetachedWallet, Wallet},
    App, AppEvent,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    platform::init_logging(log::Level::Info);
    debug::init_once();

    let cfg = load().context("Failed to load configuration")?;
    cfg.print_summary();

    LocalSet::new().run_until(run(cfg)).await
}

async fn run(cfg: Config) -> Result<()> {
    let node = RestClient::new(cfg.node_url.clone(), cfg.http());
    let wallet: Rc<dyn Wallet> = match &cfg.credentials {
        Some(path) => Rc::new(LocalWallet::load(path, node.clone(), cfg.gas.clone())?),
        None => Rc::new(DetachedWallet),
    };
    let ledger: Rc<dyn LedgerClient> = Rc::new(node);

    let (tx, mut rx) = unbounded_channel::<AppEvent>();
    let mut app = App::new(ledger, wallet, tx);

    app.start(&cfg.location);
    settle(&mut app, &mut rx).await;

    if let Some(text) = &cfg.set_message {
        app.submit(text)
            .map_err(|e| anyhow!("cannot submit: {e}"))?;
        settle(&mut app, &mut rx).await;
        if let Some(reason) = app.last_failure() {
            log::warn!("submission did not go through ({reason}); showing on-chain state");
        }
    }

    let snap = app.snapshot();
    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print!("{}", snap.to_text());
    }
    Ok(())
}

/// Fold events until nothing is outstanding.
async fn settle(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    while !app.is_settled() {
        match rx.recv().await {
            Some(ev) => app.on_event(ev),
            None => break,
        }
    }
}
