use crate::{
    auth::{AuthError, AuthResponse, AuthService, LoginRequest, RegisterRequest, RegisterResponse},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// ## Responses:
/// - `200 OK`: `{"message": ...}` confirmation.
/// - `400 Bad Request`: the username is already taken, or the body is malformed.
/// - `422 Unprocessable Entity`: username or password fails validation.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    auth.register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        message: "User registered successfully".into(),
    }))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{"token": "Bearer <jwt>"}`.
/// - `401 Unauthorized`: unknown user or wrong password, indistinguishably.
///
/// Credentials no account could have been registered with are refused with the
/// same 401.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    if let Err(e) = login_data.validate() {
        log::warn!("login failed, malformed credentials: {}", e);
        return Err(AuthError::AuthenticationFailure.into());
    }

    let token = auth
        .authenticate(&login_data.username, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse::bearer(&token)))
}
