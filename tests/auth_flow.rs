mod common;

use uuid::Uuid;

use marketplace_api::{
    bootstrap::ensure_root_admin,
    config::AppConfig,
    dto::auth::{LoginRequest, RegisterRequest},
    entity::users::Role,
    error::AppError,
    middleware::auth::AuthUser,
    services::auth_service,
};

// Registration role policy, login, and the root bootstrap.
#[tokio::test]
async fn register_login_and_bootstrap_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    // Token issuance reads the secret from the environment.
    unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };

    // Anonymous registration lands as client even when asking for company:
    // an omitted role is fine, an explicit elevated one is refused.
    let resp = auth_service::register(
        &state,
        None,
        RegisterRequest {
            email: "carol@example.com".into(),
            password: "s3cret".into(),
            role: None,
            company_name: Some("Sneaky Co".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(resp.role, Role::Client);
    assert!(!resp.is_root);
    assert!(!resp.token.is_empty());

    let err = auth_service::register(
        &state,
        None,
        RegisterRequest {
            email: "evil@example.com".into(),
            password: "s3cret".into(),
            role: Some(Role::Company),
            company_name: Some("Evil Co".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = auth_service::register(
        &state,
        None,
        RegisterRequest {
            email: "evil@example.com".into(),
            password: "s3cret".into(),
            role: Some(Role::Root),
            company_name: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // An explicit client request from an anonymous caller still succeeds, and
    // the company name is discarded.
    let login = auth_service::login(
        &state,
        LoginRequest {
            email: "carol@example.com".into(),
            password: "s3cret".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(login.role, Role::Client);

    // Duplicate email conflicts.
    let err = auth_service::register(
        &state,
        None,
        RegisterRequest {
            email: "carol@example.com".into(),
            password: "other".into(),
            role: None,
            company_name: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A root caller can mint company accounts, company_name kept.
    let root_caller = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Root,
    };
    let resp = auth_service::register(
        &state,
        Some(root_caller),
        RegisterRequest {
            email: "shop@example.com".into(),
            password: "shop123".into(),
            role: Some(Role::Company),
            company_name: Some("Example Shop".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(resp.role, Role::Company);

    // Wrong password and unknown email answer identically.
    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "carol@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "nobody@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    // Bootstrap provisions the root once and promotes an existing account on
    // a rerun with the same email.
    let config = AppConfig {
        database_url: String::new(),
        host: String::new(),
        port: 0,
        root_email: "root@example.com".into(),
        root_password: "root123".into(),
    };
    let first = ensure_root_admin(&state.orm, &config).await?;
    let second = ensure_root_admin(&state.orm, &config).await?;
    assert_eq!(first, second);

    let promoted_config = AppConfig {
        root_email: "carol@example.com".into(),
        ..config
    };
    ensure_root_admin(&state.orm, &promoted_config).await?;
    let login = auth_service::login(
        &state,
        LoginRequest {
            email: "carol@example.com".into(),
            password: "s3cret".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(login.role, Role::Root);
    assert!(login.is_root);

    Ok(())
}
