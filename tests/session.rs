mod support;

use book_library_client::item::{Role, UserInfo};
use book_library_client::session::Session;
use book_library_client::view::{ToastKind, ViewEvent};
use book_library_client::LibraryError;
use std::sync::Arc;
use support::{server_error, Call, FakeApi, Recorder};

fn session(api: FakeApi) -> (Arc<FakeApi>, Arc<Recorder>, Session<FakeApi, Recorder>) {
    let api = Arc::new(api);
    let renderer = Arc::new(Recorder::default());
    let session = Session::new(Arc::clone(&api), Arc::clone(&renderer));
    (api, renderer, session)
}

fn accounts() -> FakeApi {
    FakeApi::new()
        .with_account("kaan", "secret", Role::User)
        .with_account("admin", "admin123", Role::Admin)
}

#[tokio::test]
async fn login_keeps_the_user() {
    let (_, renderer, mut session) = session(accounts());

    let user = session.login(" kaan ", "secret").await.unwrap();

    assert_eq!(user, UserInfo { username: "kaan".into(), role: Role::User });
    assert!(session.is_authenticated());
    assert_eq!(session.current(), Some(&user));
    assert!(renderer.events().contains(&ViewEvent::SessionChanged(Some(user))));

    let toast = renderer.last_toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message.as_deref(), Some("Welcome back, kaan!"));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let (_, renderer, mut session) = session(accounts());

    let err = session.login("kaan", "nope").await.unwrap_err();

    assert_eq!(err, LibraryError::Rejected("Invalid username or password".into()));
    assert!(!session.is_authenticated());
    assert_eq!(renderer.last_toast().unwrap().kind, ToastKind::Error);
}

#[tokio::test]
async fn empty_credentials_are_not_sent() {
    let (api, _, mut session) = session(accounts());

    let err = session.login("  ", "secret").await.unwrap_err();

    assert!(err.is_validation());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn check_restores_an_existing_session() {
    let (api, _, mut session) = session(accounts());
    assert_eq!(session.check().await, None);

    session.login("admin", "admin123").await.unwrap();
    let mut fresh = Session::new(Arc::clone(&api), Arc::new(Recorder::default()));

    let user = fresh.check().await.unwrap();
    assert_eq!(user.username, "admin");
    assert!(user.role.is_admin());
}

#[tokio::test]
async fn failed_check_means_logged_out() {
    let (api, _, mut session) = session(accounts());
    api.fail("me", server_error());

    assert_eq!(session.check().await, None);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn register_checks_password_confirmation_locally() {
    let (api, _, session) = session(accounts());

    let err = session.register("sam", "sam@library.com", "pw1", "pw2").await.unwrap_err();

    assert_eq!(err, LibraryError::Validation("Passwords do not match".into()));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn register_then_login() {
    let (api, renderer, mut session) = session(accounts());

    session.register("sam", "sam@library.com", "pw", "pw").await.unwrap();
    assert_eq!(renderer.last_toast().unwrap().title, "Registration successful");
    assert!(!session.is_authenticated());

    session.login("sam", "pw").await.unwrap();
    assert_eq!(api.calls(), vec![Call::Register("sam".into()), Call::Login("sam".into())]);
}

#[tokio::test]
async fn duplicated_username_is_rejected() {
    let (_, _, session) = session(accounts());

    let err = session.register("kaan", "", "pw", "pw").await.unwrap_err();

    assert_eq!(err, LibraryError::Rejected("Username already exists".into()));
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_fails() {
    let (api, renderer, mut session) = session(accounts());
    session.login("kaan", "secret").await.unwrap();
    api.fail("logout", server_error());

    session.logout().await;

    assert!(!session.is_authenticated());
    assert_eq!(renderer.events().last(), Some(&ViewEvent::SessionChanged(None)));
}

#[tokio::test]
async fn only_admins_pass_the_admin_check() {
    let (_, _, mut session) = session(accounts());
    assert!(matches!(session.require_admin(), Err(LibraryError::Forbidden(_))));

    session.login("kaan", "secret").await.unwrap();
    assert!(matches!(session.require_admin(), Err(LibraryError::Forbidden(_))));

    session.login("admin", "admin123").await.unwrap();
    assert_eq!(session.require_admin().unwrap().username, "admin");
}
