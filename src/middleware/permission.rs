use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    models::Role,
    utils::verify_token,
};

/// The authenticated principal for a request. Resolved once per request from
/// the `auth_token` cookie and passed explicitly into whatever the handler
/// calls; nothing downstream reads session state on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

pub async fn get_current_user(cookies: Cookies, db: &Database) -> Option<CurrentUser> {
    // Try to get JWT token from auth_token cookie
    let token = cookies.get("auth_token")?.value().to_string();
    let claims = verify_token(&token).ok()?;

    let user_id = Uuid::parse_str(&claims.sub).ok()?;

    // Re-read the account so a stale token cannot outlive a changed or
    // deleted user.
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT username, user_type FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .ok()??;

    let role = row.1.parse::<Role>().ok()?;

    Some(CurrentUser {
        id: user_id,
        username: row.0,
        role,
    })
}

/// Gate a handler on both authentication and role.
pub async fn require_role(
    cookies: Cookies,
    db: &Database,
    role: Role,
) -> Result<CurrentUser, AppError> {
    let user = get_current_user(cookies, db)
        .await
        .ok_or(AppError::Unauthorized)?;

    if user.role != role {
        return Err(AppError::Forbidden);
    }

    Ok(user)
}

pub async fn manufacturer_id_for(db: &Database, user: &CurrentUser) -> Result<Uuid, AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM manufacturers WHERE user_id = $1")
        .bind(user.id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::Validation("Manufacturer profile not found".to_string()))
}

pub async fn distributor_id_for(db: &Database, user: &CurrentUser) -> Result<Uuid, AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM distributors WHERE user_id = $1")
        .bind(user.id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::Validation("Distributor profile not found".to_string()))
}

pub async fn customer_id_for(db: &Database, user: &CurrentUser) -> Result<Uuid, AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM customers WHERE user_id = $1")
        .bind(user.id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::Validation("Customer profile not found".to_string()))
}
