//! Identity resolution against a counting wallet.

mod common;

use common::FakeWallet;
use msgx::error::IdentityError;
use msgx::identity::{IdentityResolver, ResolverState};
use msgx::Address;

#[tokio::test]
async fn override_never_touches_the_wallet() {
    let wallet = FakeWallet::at("0xDEF");
    let mut resolver = IdentityResolver::new();

    let id = resolver.resolve("/0xABC", &wallet).await.unwrap();
    assert_eq!(id.address, Address::new("0xABC"));
    assert!(!id.editable);
    assert_eq!(wallet.connect_calls.get(), 0);
}

#[tokio::test]
async fn override_with_query_and_full_url() {
    let wallet = FakeWallet::at("0xDEF");
    let mut resolver = IdentityResolver::new();

    let id = resolver
        .resolve("https://app.example/0xABC?tab=1#top", &wallet)
        .await
        .unwrap();
    assert_eq!(id.address.as_str(), "0xABC");
    assert_eq!(wallet.connect_calls.get(), 0);
}

#[tokio::test]
async fn no_override_adopts_the_wallet_address() {
    let wallet = FakeWallet::at("0xDEF");
    let mut resolver = IdentityResolver::new();

    let id = resolver.resolve("/", &wallet).await.unwrap();
    assert_eq!(id.address.as_str(), "0xDEF");
    assert!(id.editable);
    assert_eq!(wallet.connect_calls.get(), 1);

    // decided once per page lifetime
    let again = resolver.resolve("/", &wallet).await.unwrap();
    assert_eq!(again, id);
    assert_eq!(wallet.connect_calls.get(), 1);
}

#[tokio::test]
async fn denied_connect_is_unavailable_and_retryable() {
    let wallet = FakeWallet::absent();
    let mut resolver = IdentityResolver::new();

    let err = resolver.resolve("", &wallet).await.unwrap_err();
    assert!(matches!(err, IdentityError::Unavailable(_)));
    assert!(matches!(resolver.state(), ResolverState::Unavailable(_)));
    assert!(resolver.identity().is_none());

    *wallet.address.borrow_mut() = Some(Address::new("0xDEF"));
    let id = resolver.resolve("", &wallet).await.unwrap();
    assert!(id.editable);
    assert_eq!(wallet.connect_calls.get(), 2);
}
