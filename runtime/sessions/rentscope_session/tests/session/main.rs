use fixtures::{session, spy_session};
use googletest::{assert_that, prelude::none};
use redact::Secret;
use rentscope_session::{Session, User, errors::LoadError};
use rentscope_storage::keys;


fn token(raw: &str) -> Secret<String> {
    Secret::new(raw.to_owned())
}

#[tokio::test]
async fn a_fresh_session_is_anonymous() {
    let (session, _) = session();

    assert!(!session.is_authenticated().await.unwrap());
    assert_that!(session.effective_role().await.unwrap(), none());
    assert!(session.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_writes_through_before_returning() {
    let (session, call_tracker) = spy_session();

    session
        .login(token("abc"), &User::with_role("user"))
        .await
        .unwrap();

    assert_eq!(
        call_tracker.writes().await,
        vec!["set token".to_owned(), "set user".to_owned()]
    );
    assert!(session.is_authenticated().await.unwrap());
    let stored = session.token().await.unwrap().unwrap();
    assert_eq!(stored.expose_secret(), "abc");
}

#[tokio::test]
async fn the_role_override_wins_without_touching_the_cached_user() {
    let (session, _) = session();
    let user = User::with_role("user");
    session.login(token("abc"), &user).await.unwrap();

    assert_eq!(
        session.effective_role().await.unwrap().as_deref(),
        Some("user")
    );

    session.set_role_override(Some("admin")).await.unwrap();
    assert_eq!(
        session.effective_role().await.unwrap().as_deref(),
        Some("admin")
    );
    assert_eq!(session.user().await.unwrap(), Some(user));

    session.set_role_override(None).await.unwrap();
    assert_eq!(
        session.effective_role().await.unwrap().as_deref(),
        Some("user")
    );
}

#[tokio::test]
async fn a_role_override_applies_to_anonymous_sessions_too() {
    let (session, _) = session();
    session.set_role_override(Some("admin")).await.unwrap();

    assert!(!session.is_authenticated().await.unwrap());
    assert_eq!(
        session.effective_role().await.unwrap().as_deref(),
        Some("admin")
    );
}

#[tokio::test]
async fn logout_clears_every_field() {
    let (session, store) = session();
    session
        .login(token("abc"), &User::with_role("user"))
        .await
        .unwrap();
    session.set_role_override(Some("admin")).await.unwrap();

    session.logout().await.unwrap();

    assert!(!session.is_authenticated().await.unwrap());
    assert!(session.snapshot().await.unwrap().is_empty());
    for key in [keys::TOKEN, keys::USER, keys::ROLE_OVERRIDE] {
        assert_that!(store.get(key).await.unwrap(), none());
    }
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (session, store) = session();
    session
        .login(token("abc"), &User::with_role("user"))
        .await
        .unwrap();
    store.set(keys::LANGUAGE, "en-US").await.unwrap();

    session.logout().await.unwrap();
    let once = session.snapshot().await.unwrap();
    session.logout().await.unwrap();
    let twice = session.snapshot().await.unwrap();

    assert!(once.is_empty());
    assert!(twice.is_empty());
    // Keys that don't belong to the session are left alone.
    assert_eq!(
        store.get(keys::LANGUAGE).await.unwrap().as_deref(),
        Some("en-US")
    );
}

#[tokio::test]
async fn logging_out_of_an_empty_session_is_not_an_error() {
    let (session, call_tracker) = spy_session();

    session.logout().await.unwrap();

    assert_eq!(
        call_tracker.writes().await,
        vec![
            "remove token".to_owned(),
            "remove user".to_owned(),
            "remove temp_admin_role".to_owned()
        ]
    );
}

#[tokio::test]
async fn two_sessions_on_the_same_store_agree() {
    let (first, store) = session();
    let second = Session::new(store);

    first
        .login(token("abc"), &User::with_role("user"))
        .await
        .unwrap();
    assert!(second.is_authenticated().await.unwrap());

    second.logout().await.unwrap();
    assert!(!first.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn an_empty_token_does_not_count_as_logged_in() {
    let (session, store) = session();
    store.set(keys::TOKEN, "").await.unwrap();

    assert!(!session.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn a_corrupted_user_is_reported() {
    let (session, store) = session();
    store.set(keys::USER, "{ not json").await.unwrap();

    let err = session.user().await.unwrap_err();
    assert!(matches!(err, LoadError::InvalidUser(_)));
}

#[tokio::test]
async fn profile_updates_only_replace_the_cached_user() {
    let (session, call_tracker) = spy_session();
    session
        .login(token("abc"), &User::with_role("user"))
        .await
        .unwrap();
    call_tracker.reset().await;

    let mut updated = User::with_role("user");
    updated.username = Some("alice".into());
    session.update_user(&updated).await.unwrap();

    assert_eq!(call_tracker.writes().await, vec!["set user".to_owned()]);
    assert_eq!(session.user().await.unwrap(), Some(updated));
    assert!(session.is_authenticated().await.unwrap());
}
