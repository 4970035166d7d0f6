use crate::db::{AdminUser, DbPool};
use crate::error::{InventoryError, InventoryResult};
use crate::extract::JsonBody;
use crate::middleware::auth::{issue_token, Claims};
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use bcrypt::verify;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AdminProfile {
    pub email: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: AdminProfile,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub logged_in: bool,
    pub user: AdminProfile,
}

async fn find_admin(pool: &DbPool, email: &str) -> InventoryResult<Option<AdminUser>> {
    let admin = sqlx::query_as::<_, AdminUser>(
        "SELECT email, password_hash, role FROM admin WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(admin)
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> InventoryResult<Json<LoginResponse>> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(InventoryError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // Only the configured admin account may sign in.
    if email != state.config.admin_email {
        tracing::warn!("Rejected login for non-admin email {}", email);
        return Err(InventoryError::Auth("Unauthorized access".to_string()));
    }

    let admin = find_admin(&state.pool, email).await?;
    let valid = match &admin {
        Some(user) => verify(&payload.password, &user.password_hash).unwrap_or(false),
        None => false,
    };

    let admin = match (admin, valid) {
        (Some(admin), true) => admin,
        _ => {
            tracing::warn!("Invalid credentials for {}", email);
            return Err(InventoryError::Auth("Invalid credentials".to_string()));
        }
    };

    let token = issue_token(&state.config, &admin.email, &admin.role)?;
    tracing::info!("Admin {} logged in", admin.email);

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user: AdminProfile {
            email: admin.email,
            role: admin.role,
        },
        token,
    }))
}

pub async fn check_auth_status(Extension(claims): Extension<Claims>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        logged_in: true,
        user: AdminProfile {
            email: claims.sub,
            role: claims.role,
        },
    })
}
