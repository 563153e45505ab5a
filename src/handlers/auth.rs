use axum::{
    extract::{Form, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::get_current_user,
    middleware::CurrentUser,
    models::{Role, User},
    utils::{create_token, hash_password, verify_password},
    AppState,
};

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    user_type: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    user_type: String,
    // Role-specific profile fields
    company_name: Option<String>,
    region: Option<String>,
    contact_email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    shipping_address: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: Uuid,
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>, AppError> {
    let role = form
        .user_type
        .parse::<Role>()
        .map_err(AppError::Validation)?;

    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 AND user_type = $2",
    )
    .bind(&form.username)
    .bind(role.as_str())
    .fetch_optional(&state.db)
    .await?;

    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash).unwrap_or(false) => user,
        _ => return Err(AppError::Unauthorized),
    };

    let token = create_token(user.id, user.username.clone(), role)
        .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))?;

    // Session record for tracking; login does not depend on it succeeding.
    let session_id = Uuid::new_v4();
    let expires_at = chrono::Utc::now() + chrono::Duration::hours(24);
    let _ = sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(user.id)
        .bind(expires_at)
        .execute(&state.db)
        .await;

    let _ = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&state.db)
        .await;

    let cookie = Cookie::build(("auth_token", token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(24))
        .build();
    cookies.add(cookie);

    Ok(Json(LoginResponse {
        success: true,
        user_id: user.id,
        username: user.username,
        role,
    }))
}

pub async fn logout(cookies: Cookies) -> Json<serde_json::Value> {
    cookies.remove(Cookie::from("auth_token"));
    Json(serde_json::json!({ "success": true }))
}

pub async fn me(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<CurrentUser>, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Json<RegisterResponse>, AppError> {
    let role = form
        .user_type
        .parse::<Role>()
        .map_err(AppError::Validation)?;

    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| AppError::Internal(format!("Failed to process password: {}", e)))?;

    let mut tx = state.db.begin().await?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (username, email, password_hash, user_type)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&form.username)
    .bind(&form.email)
    .bind(&password_hash)
    .bind(role.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|_| {
        AppError::Validation("Username or email already exists or registration failed".to_string())
    })?;

    // The role profile is created alongside the account, in the same
    // transaction.
    match role {
        Role::Manufacturer => {
            let company_name = required(form.company_name, "company_name")?;
            sqlx::query(
                "INSERT INTO manufacturers (user_id, company_name, contact_email) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(company_name)
            .bind(&form.contact_email)
            .execute(&mut *tx)
            .await?;
        }
        Role::Distributor => {
            let company_name = required(form.company_name, "company_name")?;
            sqlx::query("INSERT INTO distributors (user_id, company_name, region) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(company_name)
                .bind(&form.region)
                .execute(&mut *tx)
                .await?;
        }
        Role::Customer => {
            let first_name = required(form.first_name, "first_name")?;
            let last_name = required(form.last_name, "last_name")?;
            sqlx::query(
                r#"
                INSERT INTO customers (user_id, first_name, last_name, default_shipping_address)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id)
            .bind(first_name)
            .bind(last_name)
            .bind(&form.shipping_address)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    Ok(Json(RegisterResponse {
        success: true,
        user_id,
    }))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}
