//! Token issuance, sliding expiry and revocation through the public
//! authenticator facade.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use smartserve::auth::{AuthError, Authenticator, PasswordHasher};
use smartserve::config::AppConfig;
use smartserve::ordering::{MemoryStore, NewUser, OrderingService, User, UserChanges};

const PASSWORD: &str = "tangerine-Orbit-57";

fn config(iterations: &str) -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SECRET_KEY", "token-secret"),
        ("PRODUCTION", "False"),
        ("PASSWORD_HASH_ITERATIONS", iterations),
        ("AUTH_TOKEN_TTL", "3600"),
        ("AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL", "300"),
    ]);
    AppConfig::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
        .expect("config loads")
}

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-14T09:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn setup() -> (Arc<OrderingService<MemoryStore>>, Authenticator<MemoryStore>, User) {
    let ordering = Arc::new(OrderingService::open(Arc::new(MemoryStore)).expect("opens"));
    let auth = Authenticator::new(ordering.clone(), &config("1"));
    let user = auth
        .register(
            NewUser {
                employee_id: Some("482913".to_string()),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                password: Some(PASSWORD.to_string()),
                ..NewUser::default()
            },
            start(),
        )
        .expect("registers");
    (ordering, auth, user)
}

fn header(token: &str) -> String {
    format!("Token {token}")
}

#[test]
fn only_the_digest_is_stored() {
    let (ordering, auth, user) = setup();
    let issued = auth.login("482913", PASSWORD, start()).expect("logs in");

    assert_eq!(issued.expiry, start() + Duration::hours(1));
    ordering.read(|catalog| {
        let tokens = catalog.user_tokens(user.id);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_key, issued.token[..15]);
        assert_ne!(tokens[0].digest, issued.token);
        assert_eq!(tokens[0].digest.len(), 128);
        assert_eq!(
            catalog.user(user.id).expect("user exists").last_login,
            Some(start())
        );
    });
}

#[test]
fn expiry_slides_only_past_the_refresh_interval() {
    let (ordering, auth, user) = setup();
    let issued = auth.issue(user.id, start()).expect("issues");
    let header = header(&issued.token);
    let expiry = || ordering.read(|catalog| catalog.user_tokens(user.id)[0].expiry);

    auth.authenticate(Some(&header), start() + Duration::seconds(200))
        .expect("valid token");
    assert_eq!(expiry(), issued.expiry);

    let later = start() + Duration::seconds(400);
    auth.authenticate(Some(&header), later).expect("valid token");
    assert_eq!(expiry(), later + Duration::hours(1));
}

#[test]
fn expired_tokens_are_purged() {
    let (ordering, auth, user) = setup();
    let issued = auth.issue(user.id, start()).expect("issues");

    let err = auth
        .authenticate(Some(&header(&issued.token)), start() + Duration::hours(2))
        .expect_err("expired");
    assert!(matches!(err, AuthError::InvalidToken));
    ordering.read(|catalog| assert!(catalog.user_tokens(user.id).is_empty()));
}

#[test]
fn deactivated_users_lose_access() {
    let (ordering, auth, user) = setup();
    let issued = auth.issue(user.id, start()).expect("issues");
    ordering
        .update_user(
            user.id,
            UserChanges {
                is_active: Some(false),
                ..UserChanges::default()
            },
        )
        .expect("deactivates");

    assert!(matches!(
        auth.authenticate(Some(&header(&issued.token)), start()),
        Err(AuthError::InactiveUser)
    ));
    assert!(matches!(
        auth.login("482913", PASSWORD, start()),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn login_upgrades_outdated_hashes() {
    let (ordering, _, user) = setup();
    let stronger = Authenticator::new(ordering.clone(), &config("2"));

    stronger.login("482913", PASSWORD, start()).expect("logs in");

    let encoded = ordering.read(|catalog| catalog.user(user.id).expect("exists").password.clone());
    assert!(encoded.starts_with("pbkdf2_sha256$2$"));
    assert!(!PasswordHasher::new(2).must_update(&encoded));
}

#[test]
fn accounts_without_password_cannot_log_in() {
    let (_, auth, _) = setup();
    auth.register(
        NewUser {
            employee_id: Some("520114".to_string()),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            ..NewUser::default()
        },
        start(),
    )
    .expect("registers");

    assert!(matches!(
        auth.login("520114", "", start()),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn logout_all_reports_revoked_tokens() {
    let (_, auth, user) = setup();
    auth.issue(user.id, start()).expect("issues");
    auth.issue(user.id, start()).expect("issues");

    assert_eq!(auth.logout_all(user.id).expect("revokes"), 2);
}
