//! Registration, login and profile management.

use api_protocol::{
    AuthResponse, DeleteAccountRequest, LoginRequest, MessageResponse, RegisterRequest,
    UpdateProfileRequest, UserProfile,
};
use auth::{hash_password, verify_password};
use chrono::Utc;
use concert_store::ConcertStore;
use entities::User;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::services::validation::{is_valid_email, max_length, require_length};
use crate::state::AppState;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_LOCATION_LEN: usize = 100;

fn trimmed(value: Option<&String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn validate_registration(req: &RegisterRequest) -> ServerResult<()> {
    if !is_valid_email(req.email.trim()) {
        return Err(ServerError::InvalidRequest(
            "email must be a valid email address".to_string(),
        ));
    }
    require_length("username", req.username.trim(), MIN_USERNAME_LEN, MAX_USERNAME_LEN)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServerError::InvalidRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    max_length("first_name", &trimmed(req.first_name.as_ref()), MAX_NAME_LEN)?;
    max_length("last_name", &trimmed(req.last_name.as_ref()), MAX_NAME_LEN)?;
    max_length("location", &trimmed(req.location.as_ref()), MAX_LOCATION_LEN)?;
    Ok(())
}

fn issue_token<S: ConcertStore>(state: &AppState<S>, user: &User) -> ServerResult<AuthResponse> {
    let token = state.jwt_manager.generate_token(user.id)?;
    Ok(AuthResponse {
        token,
        user: UserProfile::from(user),
    })
}

/// Registers a new user and returns a session token.
pub async fn register<S: ConcertStore>(
    state: &AppState<S>,
    req: RegisterRequest,
) -> ServerResult<AuthResponse> {
    validate_registration(&req)?;

    let email = req.email.trim();
    let username = req.username.trim();

    if state
        .store
        .find_user_by_email_or_username(email, username)
        .await?
        .is_some()
    {
        return Err(ServerError::Conflict(
            "User with this email or username already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = User::new(email, username, password_hash).with_profile(
        trimmed(req.first_name.as_ref()),
        trimmed(req.last_name.as_ref()),
        trimmed(req.location.as_ref()),
    );

    let user = state.store.create_user(user).await.map_err(|e| match e {
        concert_store::ConcertStoreError::AlreadyExists { .. } => ServerError::Conflict(
            "User with this email or username already exists".to_string(),
        ),
        other => other.into(),
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

    issue_token(state, &user)
}

/// Logs a user in with email and password.
///
/// Unknown email and wrong password produce the same error.
pub async fn login<S: ConcertStore>(
    state: &AppState<S>,
    req: LoginRequest,
) -> ServerResult<AuthResponse> {
    let Some(user) = state.store.get_user_by_email(req.email.trim()).await? else {
        return Err(ServerError::InvalidCredentials);
    };

    verify_password(&req.password, &user.password_hash)
        .map_err(|_| ServerError::InvalidCredentials)?;

    tracing::info!(user_id = %user.id, "User logged in");

    issue_token(state, &user)
}

async fn load_user<S: ConcertStore>(store: &S, user_id: Uuid) -> ServerResult<User> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}

/// Returns the caller's profile.
pub async fn get_profile<S: ConcertStore>(store: &S, user_id: Uuid) -> ServerResult<UserProfile> {
    let user = load_user(store, user_id).await?;
    Ok(UserProfile::from(&user))
}

/// Updates first name, last name and location.
pub async fn update_profile<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> ServerResult<UserProfile> {
    let first_name = trimmed(req.first_name.as_ref());
    let last_name = trimmed(req.last_name.as_ref());
    let location = trimmed(req.location.as_ref());

    require_length("first_name", &first_name, 1, MAX_NAME_LEN)?;
    require_length("last_name", &last_name, 1, MAX_NAME_LEN)?;
    max_length("location", &location, MAX_LOCATION_LEN)?;

    let mut user = load_user(store, user_id).await?;
    user.first_name = first_name;
    user.last_name = last_name;
    user.location = location;
    user.updated_at = Utc::now();

    let user = store.update_user(user).await?;
    tracing::info!(user_id = %user.id, "Updated profile");

    Ok(UserProfile::from(&user))
}

/// Deletes the caller's account and attendance records after re-checking
/// the password.
pub async fn delete_account<S: ConcertStore>(
    store: &S,
    user_id: Uuid,
    req: DeleteAccountRequest,
) -> ServerResult<MessageResponse> {
    if req.password.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Password is required to delete account".to_string(),
        ));
    }

    let user = load_user(store, user_id).await?;
    verify_password(&req.password, &user.password_hash)
        .map_err(|_| ServerError::InvalidCredentials)?;

    let removed = store.delete_user(user.id).await?;
    tracing::info!(user_id = %user.id, attendances_removed = removed, "Deleted account");

    Ok(MessageResponse::new("User account deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;

    fn register_request(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "secret1".to_string(),
            first_name: Some("Jo".to_string()),
            last_name: None,
            location: Some("Denver".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = test_state();

        let registered = register(&state, register_request("fan@example.com", "fan"))
            .await
            .unwrap();
        assert_eq!(registered.user.first_name, "Jo");
        assert_eq!(
            state.jwt_manager.validate_session(&registered.token).unwrap(),
            registered.user.id
        );

        let logged_in = login(
            &state,
            LoginRequest {
                email: "fan@example.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_or_username() {
        let state = test_state();
        register(&state, register_request("fan@example.com", "fan"))
            .await
            .unwrap();

        let same_email = register(&state, register_request("fan@example.com", "other")).await;
        assert!(matches!(same_email, Err(ServerError::Conflict(_))));

        let same_username = register(&state, register_request("other@example.com", "fan")).await;
        assert!(matches!(same_username, Err(ServerError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let state = test_state();

        let bad_email = register(&state, register_request("not-an-email", "fan")).await;
        assert!(matches!(bad_email, Err(ServerError::InvalidRequest(_))));

        let short_username = register(&state, register_request("fan@example.com", "jo")).await;
        assert!(matches!(short_username, Err(ServerError::InvalidRequest(_))));

        let mut short_password = register_request("fan@example.com", "fan");
        short_password.password = "12345".to_string();
        assert!(matches!(
            register(&state, short_password).await,
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = test_state();
        register(&state, register_request("fan@example.com", "fan"))
            .await
            .unwrap();

        let wrong_password = login(
            &state,
            LoginRequest {
                email: "fan@example.com".to_string(),
                password: "wrong-password".to_string(),
            },
        )
        .await
        .unwrap_err();
        let unknown_email = login(
            &state,
            LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong_password, ServerError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_update_profile_requires_names() {
        let state = test_state();
        let registered = register(&state, register_request("fan@example.com", "fan"))
            .await
            .unwrap();

        let missing_last = update_profile(
            &state.store,
            registered.user.id,
            UpdateProfileRequest {
                first_name: Some("Jo".to_string()),
                last_name: None,
                location: None,
            },
        )
        .await;
        assert!(matches!(missing_last, Err(ServerError::InvalidRequest(_))));

        let updated = update_profile(
            &state.store,
            registered.user.id,
            UpdateProfileRequest {
                first_name: Some(" Jo ".to_string()),
                last_name: Some("Smith".to_string()),
                location: Some("Boulder, CO".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.first_name, "Jo");
        assert_eq!(updated.location, "Boulder, CO");
        assert_eq!(updated.email, "fan@example.com");
    }

    #[tokio::test]
    async fn test_delete_account_checks_password() {
        let state = test_state();
        let registered = register(&state, register_request("fan@example.com", "fan"))
            .await
            .unwrap();
        let user_id = registered.user.id;

        let wrong = delete_account(
            &state.store,
            user_id,
            DeleteAccountRequest {
                password: "nope-nope".to_string(),
            },
        )
        .await;
        assert!(matches!(wrong, Err(ServerError::InvalidCredentials)));
        assert!(state.store.get_user(user_id).await.unwrap().is_some());

        delete_account(
            &state.store,
            user_id,
            DeleteAccountRequest {
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(state.store.get_user(user_id).await.unwrap().is_none());
    }
}
