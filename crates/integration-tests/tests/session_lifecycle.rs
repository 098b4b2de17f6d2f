//! Session lifecycle against the mock store: login, persistence across
//! restarts, expiry and logout.
//!
//! Run with: cargo test -p tienda-integration-tests --test session_lifecycle

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use secrecy::SecretString;
use tienda_core::UserId;
use tienda_integration_tests::{
    ADMIN_EMAIL, ADMIN_ID, MockStore, admin_password, mint_token, scratch_dir,
};
use tienda_storefront::navigation::AdminSection;
use tienda_storefront::session::{MemoryStorage, SessionStorage, keys};
use tienda_storefront::{ApiError, Route, SessionError, Shop};

async fn store() -> MockStore {
    MockStore::start().await.expect("mock store failed to start")
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_persists_session_and_opens_dashboard() {
    let store = store().await;
    let mut shop = store.shop();

    let session = shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();
    assert_eq!(session.user().id, UserId::new(ADMIN_ID));
    assert_eq!(session.user().email.as_str(), ADMIN_EMAIL);
    assert!(session.expires_at() > Utc::now());

    assert_eq!(shop.route(), &Route::Admin(AdminSection::Dashboard));
    let storage = shop.session().storage();
    assert!(storage.get(keys::TOKEN).unwrap().is_some());
    assert!(storage.get(keys::USER).unwrap().unwrap().contains(ADMIN_EMAIL));
}

#[tokio::test]
async fn test_bad_credentials_leave_state_untouched() {
    let store = store().await;
    let mut shop = store.shop();

    let err = shop
        .login(ADMIN_EMAIL, &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Api(ApiError::Unauthorized { message: Some(ref m) }) if m == "Credenciales inválidas"
    ));

    assert!(!shop.session().is_active());
    assert!(shop.session().storage().is_empty());
    assert_eq!(shop.route(), &Route::Home);
}

#[tokio::test]
async fn test_malformed_email_is_rejected_before_sending() {
    let store = store().await;
    let mut shop = store.shop();

    let err = shop
        .login("not-an-email", &admin_password())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidEmail(_)));
    assert!(store.requests().await.is_empty());
}

#[tokio::test]
async fn test_login_sends_no_credential() {
    let store = store().await;
    let mut shop = store.shop();
    shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();
    shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();

    let requests = store.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.path == "/api/login"));
    assert!(requests.iter().all(|r| r.authorization.is_none()));
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let store = store().await;
    let dir = scratch_dir();

    {
        let mut shop = store.file_shop(&dir);
        shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();
    }

    let mut shop = store.file_shop(&dir);
    let restored = shop.restore().expect("session should be restored");
    assert_eq!(restored.user().email.as_str(), ADMIN_EMAIL);
    assert_eq!(
        shop.visit("/admin/categorias"),
        &Route::Admin(AdminSection::Categories)
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_logout_then_restart_has_no_session() {
    let store = store().await;
    let dir = scratch_dir();

    {
        let mut shop = store.file_shop(&dir);
        shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();
        shop.logout();
        assert_eq!(shop.route(), &Route::AdminLogin);
    }

    let mut shop = store.file_shop(&dir);
    assert!(shop.restore().is_none());
    assert_eq!(shop.visit("/admin"), &Route::AdminLogin);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_expired_persisted_session_is_purged() {
    let store = store().await;
    let token = mint_token(Utc::now() - Duration::minutes(5)).unwrap();

    let mut storage = MemoryStorage::new();
    storage.set(keys::TOKEN, &token).unwrap();
    storage
        .set(keys::USER, r#"{"id":1,"email":"admin@tienda.com"}"#)
        .unwrap();

    let api = store.shop().api().clone();
    let mut shop = Shop::new(api, storage);
    assert!(shop.restore().is_none());
    assert!(shop.session().storage().is_empty());
}

#[tokio::test]
async fn test_session_expiring_mid_use_is_dropped_on_next_admin_visit() {
    let store = store().await;
    store.set_token_ttl(Duration::seconds(1)).await;
    let mut shop = store.shop();
    shop.login(ADMIN_EMAIL, &admin_password()).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

    assert_eq!(shop.visit("/admin/productos"), &Route::AdminLogin);
    assert!(!shop.session().is_active());
    assert!(shop.session().storage().is_empty());
}
