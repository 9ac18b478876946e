//! Page-location router
//!
//! The first path segment of the page location, when present, names the
//! account to view and puts the page in read-only mode. Anything else means
//! "owner mode": the address comes from the connected wallet.
//!
//! ## Accepted inputs
//!
//! - Full URLs: `https://host/0xABC?tab=1#top`
//! - Paths: `/0xABC`, `/0xABC/anything/else`, `/`
//! - Bare segments: `0xABC` (what the native CLI receives as an argument)
//! - Empty string
//!
//! Query and fragment are stripped, and the segment is percent-decoded.
//!
//! ## Example
//!
//! ```rust
//! use msgx::router::{parse, Route};
//!
//! match parse("/0xABC") {
//!     Route::Address { address } => assert_eq!(address.as_str(), "0xABC"),
//!     Route::Owner => unreachable!(),
//! }
//! ```

use crate::debug::{self, cat};
use crate::types::Address;

/// Strip query and fragment from URL path
#[inline]
fn strip_query_frag(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Drop `scheme://authority` if present, leaving the path. The scheme must
/// come before any `/`, so a URL nested in a path segment is not an authority.
#[inline]
fn after_authority(s: &str) -> &str {
    let Some(pos) = s.find("://") else {
        return s;
    };
    if s[..pos].contains('/') {
        return s;
    }
    let rest = &s[pos + 3..];
    match rest.find('/') {
        Some(slash) => &rest[slash..],
        None => "",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// No override: resolve identity through the wallet, editable.
    Owner,
    /// Address override from the URL: read-only.
    Address { address: Address },
}

impl Route {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Route::Address { .. })
    }
}

/// Parse a page location into a route. Never fails; unknown shapes fall back
/// to treating the first segment as an address.
pub fn parse(raw: &str) -> Route {
    let s = raw.trim();
    let path = after_authority(strip_query_frag(s));

    let first = path.split('/').find(|seg| !seg.trim().is_empty());
    let route = match first {
        None => Route::Owner,
        Some(seg) => {
            let decoded = urlencoding::decode(seg)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| seg.to_string());
            let decoded = decoded.trim();
            if decoded.is_empty() {
                Route::Owner
            } else {
                Route::Address {
                    address: Address::new(decoded),
                }
            }
        }
    };
    debug::log(cat::ROUTER, format!("{raw:?} -> {route:?}"));
    route
}
