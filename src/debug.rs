//! Filterable category tracing for development
//!
//! Categories: IDENTITY, MIRROR, SUBMIT, ROUTER, WALLET
//! Enable via: MSGX_DEBUG=identity,mirror (native)
//!         or: ?msgxdebug=all / localStorage.setItem('msgx.debug','mirror') (web)

use std::sync::atomic::{AtomicU32, Ordering};

pub mod cat {
    pub const IDENTITY: u32 = 1 << 0;
    pub const MIRROR: u32 = 1 << 1;
    pub const SUBMIT: u32 = 1 << 2;
    pub const ROUTER: u32 = 1 << 3;
    pub const WALLET: u32 = 1 << 4;
    pub const ALL: u32 = 0xffff_ffff;
}

static MASK: AtomicU32 = AtomicU32::new(0);

#[inline]
pub fn mask() -> u32 {
    MASK.load(Ordering::Relaxed)
}

#[inline]
pub fn set(mask: u32) {
    MASK.store(mask, Ordering::Relaxed)
}

#[inline]
pub fn is(cat: u32) -> bool {
    (MASK.load(Ordering::Relaxed) & cat) != 0
}

#[inline]
pub fn cat_name(cat: u32) -> &'static str {
    match cat {
        c if c == cat::IDENTITY => "identity",
        c if c == cat::MIRROR => "mirror",
        c if c == cat::SUBMIT => "submit",
        c if c == cat::ROUTER => "router",
        c if c == cat::WALLET => "wallet",
        _ => "misc",
    }
}

/// Parse a comma list like `"identity,mirror"` into a mask.
pub fn parse_list(list: &str) -> u32 {
    let mut m: u32 = 0;
    for tok in list.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        match tok.as_str() {
            "" | "none" => m = 0,
            "all" => m = cat::ALL,
            "identity" => m |= cat::IDENTITY,
            "mirror" => m |= cat::MIRROR,
            "submit" => m |= cat::SUBMIT,
            "router" => m |= cat::ROUTER,
            "wallet" => m |= cat::WALLET,
            _ => {}
        }
    }
    m
}

#[inline]
pub fn set_from_list(list: &str) {
    set(parse_list(list));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if let Ok(v) = std::env::var("MSGX_DEBUG") {
            set_from_list(&v);
        }
    });
}

#[cfg(target_arch = "wasm32")]
pub fn init_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let Some(win) = web_sys::window() else { return };
        // URL query: ?msgxdebug=mirror,submit
        if let Ok(search) = win.location().search() {
            for part in search.trim_start_matches('?').split('&') {
                let mut it = part.splitn(2, '=');
                let key = it.next().unwrap_or_default();
                let val = it.next().unwrap_or_default();
                if key.eq_ignore_ascii_case("msgxdebug") {
                    let decoded = urlencoding::decode(val)
                        .map(|c| c.into_owned())
                        .unwrap_or_default();
                    set_from_list(&decoded);
                }
            }
        }
        if let Ok(Some(storage)) = win.local_storage() {
            if let Ok(Some(v)) = storage.get_item("msgx.debug") {
                set_from_list(&v);
            }
        }
    });
}

#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    log::info!("[msgx][{}] {}", cat_name(cat), msg.as_ref());
}
