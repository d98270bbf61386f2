//! End-to-end tests for the portal pages
//!
//! Each test spawns its own server over in-memory stores, so no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test portal_tests

use integration_tests::{
    assert_body, assert_redirect, link_path, unique_username, Role, TestServer,
    TEST_PASSWORD,
};
use portal_core::ActionFlag;
use reqwest::StatusCode;

const LOGIN_FAILED: &str = "Username or password is incorrect. Please try again.";

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await.expect("Failed to start server");
    let browser = server.browser().unwrap();

    let body = assert_body(browser.get("/health").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("healthy"));

    let body = assert_body(browser.get("/health/ready").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("\"status\":\"ready\""));
}

// ============================================================================
// Login / logout
// ============================================================================

#[tokio::test]
async fn test_login_success_redirects_to_profile() {
    let server = TestServer::start().await.unwrap();
    server.create_user("testuser", Role::Regular).await.unwrap();
    let browser = server.browser().unwrap();

    let response = browser.login("testuser", TEST_PASSWORD).await.unwrap();
    assert_redirect(&response, "/profile/").unwrap();
    let cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("sessionid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = assert_body(browser.get("/profile/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("testuser"));

    let user = server
        .state
        .service_context()
        .user_repo()
        .find_by_username("testuser")
        .await
        .unwrap()
        .unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn test_login_failures_rerender_form() {
    let server = TestServer::start().await.unwrap();
    server.create_user("testuser", Role::Regular).await.unwrap();
    server.create_user("sleeper", Role::Inactive).await.unwrap();
    let browser = server.browser().unwrap();

    for (username, password) in [
        ("testuser", "wrongpass"),
        ("sleeper", TEST_PASSWORD),
        ("nobody", TEST_PASSWORD),
    ] {
        let response = browser.login(username, password).await.unwrap();
        let body = assert_body(response, StatusCode::OK).await.unwrap();
        assert!(body.contains(LOGIN_FAILED), "{username}");
    }

    let response = browser.login("", "").await.unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("This field is required."));

    // Nothing was logged in, so nothing was audited
    let entries = server
        .state
        .service_context()
        .audit_repo()
        .recent(10)
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_login_honours_safe_next_only() {
    let server = TestServer::start().await.unwrap();
    server.create_user("testuser", Role::Regular).await.unwrap();

    let browser = server.browser().unwrap();
    let response = browser
        .post_form(
            "/login/",
            &[("username", "testuser"), ("password", TEST_PASSWORD), ("next", "/profile/edit/1/")],
        )
        .await
        .unwrap();
    assert_redirect(&response, "/profile/edit/1/").unwrap();

    let browser = server.browser().unwrap();
    let response = browser
        .post_form(
            "/login/",
            &[
                ("username", "testuser"),
                ("password", TEST_PASSWORD),
                ("next", "https://evil.example.com/"),
            ],
        )
        .await
        .unwrap();
    assert_redirect(&response, "/profile/").unwrap();
}

#[tokio::test]
async fn test_logout_ends_session_and_audits() {
    let server = TestServer::start().await.unwrap();
    let (user, browser) = server.logged_in("testuser", Role::Regular).await.unwrap();

    let response = browser.logout().await.unwrap();
    assert_redirect(&response, "/login/").unwrap();

    let response = browser.get("/profile/").await.unwrap();
    assert_redirect(&response, "/login/?next=/profile/").unwrap();

    let entries = server
        .state
        .service_context()
        .audit_repo()
        .recent(10)
        .await
        .unwrap();
    let messages: Vec<&str> = entries.iter().map(|e| e.change_message.as_str()).collect();
    assert_eq!(messages, ["User logged out", "User logged in"]);
    for entry in &entries {
        assert_eq!(entry.action_flag, ActionFlag::Addition);
        assert_eq!(entry.content_type, "user");
        assert_eq!(entry.object_id.as_deref(), Some(user.id.to_string().as_str()));
        assert_eq!(entry.object_repr, "testuser (testuser@example.com)");
    }

    // A second logout has no session left: redirect only, nothing logged
    let response = browser.logout().await.unwrap();
    assert_redirect(&response, "/login/").unwrap();
    let count = server
        .state
        .service_context()
        .audit_repo()
        .recent(10)
        .await
        .unwrap()
        .len();
    assert_eq!(count, 2);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_requires_login() {
    let server = TestServer::start().await.unwrap();
    let browser = server.browser().unwrap();

    let response = browser.get("/profile/").await.unwrap();
    assert_redirect(&response, "/login/?next=/profile/").unwrap();

    let response = browser.get("/profile/edit/1/").await.unwrap();
    assert_redirect(&response, "/login/?next=/profile/edit/1/").unwrap();
}

#[tokio::test]
async fn test_edit_own_profile() {
    let server = TestServer::start().await.unwrap();
    let (user, browser) = server.logged_in("testuser", Role::Regular).await.unwrap();
    let (profile, _) = server
        .state
        .service_context()
        .profile_repo()
        .get_or_create(user.id)
        .await
        .unwrap();
    let edit_path = format!("/profile/edit/{}/", profile.id);

    assert_body(browser.get(&edit_path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    let response = browser
        .post_form(
            &edit_path,
            &[
                ("home_address", "New Address"),
                ("phone_number", "+911234567890"),
                ("location", "POINT(1 1)"),
            ],
        )
        .await
        .unwrap();
    assert_redirect(&response, "/profile/").unwrap();

    let body = assert_body(browser.get("/profile/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("New Address"));
    assert!(body.contains("POINT(1 1)"));

    let stored = server
        .state
        .service_context()
        .profile_repo()
        .find_by_id(profile.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.home_address.as_deref(), Some("New Address"));
    assert_eq!(stored.location.unwrap().coordinates(), [1.0, 1.0]);
}

#[tokio::test]
async fn test_edit_profile_invalid_input_rerenders() {
    let server = TestServer::start().await.unwrap();
    let (user, browser) = server.logged_in("testuser", Role::Regular).await.unwrap();
    let (profile, _) = server
        .state
        .service_context()
        .profile_repo()
        .get_or_create(user.id)
        .await
        .unwrap();

    let response = browser
        .post_form(
            &format!("/profile/edit/{}/", profile.id),
            &[
                ("home_address", "Somewhere"),
                ("phone_number", "1234567890123456"),
                ("location", "POINT(500 1)"),
            ],
        )
        .await
        .unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("Ensure this value has at most 15 characters."));
    assert!(body.contains("Invalid geometry value"));

    let stored = server
        .state
        .service_context()
        .profile_repo()
        .find_by_id(profile.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.home_address.is_none());
}

#[tokio::test]
async fn test_edit_other_profile_is_forbidden() {
    let server = TestServer::start().await.unwrap();
    let owner = server.create_user("owner", Role::Regular).await.unwrap();
    let (other_profile, _) = server
        .state
        .service_context()
        .profile_repo()
        .get_or_create(owner.id)
        .await
        .unwrap();
    let (_, browser) = server.logged_in("intruder", Role::Regular).await.unwrap();
    let path = format!("/profile/edit/{}/", other_profile.id);

    let body = assert_body(browser.get(&path).await.unwrap(), StatusCode::FORBIDDEN)
        .await
        .unwrap();
    assert_eq!(body, "You are not allowed to edit this profile.");

    let response = browser
        .post_form(&path, &[("home_address", "Hijacked")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = browser.get("/profile/edit/999999/").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Map
// ============================================================================

#[tokio::test]
async fn test_map_for_superuser_only() {
    let server = TestServer::start().await.unwrap();
    let located = server.create_user("located", Role::Regular).await.unwrap();
    let ctx = server.state.service_context();
    let (mut profile, _) = ctx.profile_repo().get_or_create(located.id).await.unwrap();
    profile.location = Some(portal_core::GeoPoint::new(1.0, 1.0).unwrap());
    ctx.profile_repo().update(&profile).await.unwrap();

    let anonymous = server.browser().unwrap();
    let response = anonymous.get("/map/").await.unwrap();
    assert_redirect(&response, "/login/?next=/map/").unwrap();

    let (_, regular) = server.logged_in("regular", Role::Regular).await.unwrap();
    let response = regular.get("/map/").await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, admin) = server.logged_in("root", Role::Superuser).await.unwrap();
    let body = assert_body(admin.get("/map/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("\"type\":\"FeatureCollection\""));
    assert!(body.contains("\"username\":\"located\""));
    assert!(body.contains("\"coordinates\":[1.0,1.0]"));
    assert!(body.contains("\"home_address\":\"N/A\""));

    assert_body(admin.get("/admin/map/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_requires_staff() {
    let server = TestServer::start().await.unwrap();

    let response = server.browser().unwrap().get("/admin/users/").await.unwrap();
    assert_redirect(&response, "/login/?next=/admin/users/").unwrap();

    let (_, regular) = server.logged_in("regular", Role::Regular).await.unwrap();
    let response = regular.get("/admin/users/").await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();
    let response = staff.get("/admin/").await.unwrap();
    assert_redirect(&response, "/admin/users/").unwrap();
    let body = assert_body(staff.get("/admin/users/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("regular@example.com"));
}

#[tokio::test]
async fn test_admin_create_user_sends_invitation() {
    let server = TestServer::start().await.unwrap();
    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();
    let username = unique_username("invitee");
    let email = format!("{username}@example.com");

    let response = staff
        .post_form(
            "/admin/users/add/",
            &[
                ("username", username.as_str()),
                ("email", email.as_str()),
                ("first_name", "New"),
                ("last_name", "Person"),
                ("is_active", "on"),
            ],
        )
        .await
        .unwrap();
    assert_redirect(&response, "/admin/users/").unwrap();

    // Exactly one profile for the new account
    let ctx = server.state.service_context();
    let user = ctx
        .user_repo()
        .find_by_username(&username)
        .await
        .unwrap()
        .unwrap();
    assert!(ctx.profile_repo().find_by_user(user.id).await.unwrap().is_some());
    let owned = ctx
        .profile_repo()
        .list_with_owner()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.owner.id == user.id)
        .count();
    assert_eq!(owned, 1);

    // The invitation
    let outbox = server.mailer.outbox();
    assert_eq!(outbox.len(), 1);
    let mail = &outbox[0];
    assert_eq!(mail.subject, "You're invited to our platform");
    assert_eq!(mail.to, vec![email.clone()]);
    assert!(mail.body_text.starts_with("Hello New Person,"));
    assert!(mail.body_html.is_some());

    // Unusable password until the link is used
    let anonymous = server.browser().unwrap();
    let response = anonymous.login(&username, "").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let path = link_path(&mail.body_text, &server.base_url()).expect("link in mail");
    assert!(path.starts_with("/reset/"));
    assert_body(anonymous.get(&path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    let response = anonymous
        .post_form(
            &path,
            &[("new_password1", "brand-new-pass1"), ("new_password2", "brand-new-pass1")],
        )
        .await
        .unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("Your password has been set. You can now log in."));
    assert!(body.contains("href=\"/login/\""));

    let response = anonymous.login(&username, "brand-new-pass1").await.unwrap();
    assert_redirect(&response, "/profile/").unwrap();

    // The link works once
    let body = assert_body(anonymous.get(&path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("invalid"));

    // Creation is in the admin log
    let body = assert_body(staff.get("/admin/log/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("Added."));
}

#[tokio::test]
async fn test_reset_form_errors() {
    let server = TestServer::start().await.unwrap();
    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();
    staff
        .post_form(
            "/admin/users/add/",
            &[("username", "mismatch"), ("email", "mismatch@example.com"), ("is_active", "on")],
        )
        .await
        .unwrap();
    let mail = server.mailer.outbox().pop().expect("invitation");
    let path = link_path(&mail.body_text, &server.base_url()).unwrap();
    let browser = server.browser().unwrap();

    let response = browser
        .post_form(&path, &[("new_password1", "first-pass-1"), ("new_password2", "other-pass-2")])
        .await
        .unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("The two password fields"));

    let response = browser
        .post_form(&path, &[("new_password1", "12345678901"), ("new_password2", "12345678901")])
        .await
        .unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("entirely numeric"));

    // The link survives failed attempts
    let body = assert_body(browser.get(&path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("new_password1"));
}

#[tokio::test]
async fn test_admin_create_validation() {
    let server = TestServer::start().await.unwrap();
    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();

    let response = staff
        .post_form("/admin/users/add/", &[("username", "noemail"), ("email", "")])
        .await
        .unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("Email is required."));

    let response = staff
        .post_form(
            "/admin/users/add/",
            &[("username", "duplicate"), ("email", "staffer@example.com")],
        )
        .await
        .unwrap();
    let body = assert_body(response, StatusCode::OK).await.unwrap();
    assert!(body.contains("A user with that email already exists."));

    assert!(server.mailer.outbox().is_empty());
}

#[tokio::test]
async fn test_admin_edit_does_not_invite() {
    let server = TestServer::start().await.unwrap();
    let subject = server.create_user("subject", Role::Regular).await.unwrap();
    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();
    let path = format!("/admin/users/{}/change/", subject.id);

    assert_body(staff.get(&path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    let response = staff
        .post_form(
            &path,
            &[
                ("username", "subject"),
                ("email", "subject@example.com"),
                ("first_name", "Renamed"),
                ("last_name", "User"),
                ("is_active", "on"),
            ],
        )
        .await
        .unwrap();
    assert_redirect(&response, "/admin/users/").unwrap();
    assert!(server.mailer.outbox().is_empty());

    let updated = server
        .state
        .service_context()
        .user_repo()
        .find_by_id(subject.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Renamed");

    let body = assert_body(staff.get(&path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("Changed first_name."));
}

#[tokio::test]
async fn test_admin_profiles_show_location() {
    let server = TestServer::start().await.unwrap();
    let located = server.create_user("located", Role::Regular).await.unwrap();
    let ctx = server.state.service_context();
    let (mut profile, _) = ctx.profile_repo().get_or_create(located.id).await.unwrap();
    profile.location = Some(portal_core::GeoPoint::new(1.0, 1.0).unwrap());
    ctx.profile_repo().update(&profile).await.unwrap();

    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();
    let body = assert_body(staff.get("/admin/profiles/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("POINT(1 1)"));
    assert!(body.contains("located"));
}

#[tokio::test]
async fn test_admin_add_form_explains_invitation() {
    let server = TestServer::start().await.unwrap();
    let subject = server.create_user("subject", Role::Regular).await.unwrap();
    let (_, staff) = server.logged_in("staffer", Role::Staff).await.unwrap();

    let body = assert_body(staff.get("/admin/users/add/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("whether or not a password is entered here"));
    assert!(!body.contains("Leave the password blank"));

    let path = format!("/admin/users/{}/change/", subject.id);
    let body = assert_body(staff.get(&path).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(!body.contains("invitation link"));
}

#[tokio::test]
async fn test_new_accounts_are_listed_with_a_profile() {
    let server = TestServer::start().await.unwrap();
    let root = portal_service::UserService::new(server.state.service_context())
        .create_superuser("root", "root@example.com", "s3cret-pass")
        .await
        .unwrap();

    let profile = server
        .state
        .service_context()
        .profile_repo()
        .find_by_user(root.id)
        .await
        .unwrap();
    assert!(profile.is_some());

    let browser = server.browser().unwrap();
    let response = browser.login("root", "s3cret-pass").await.unwrap();
    assert_redirect(&response, "/profile/").unwrap();
    let body = assert_body(browser.get("/admin/profiles/").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(body.contains("<td>root</td>"));
}
