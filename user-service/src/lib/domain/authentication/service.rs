use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AccessToken;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::ports::UserRepository;

/// Orchestrates credential checks, token issuance and session resolution.
pub struct AuthenticationService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthenticationService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `repository` - Credential store used to look users up
    /// * `authenticator` - Password verification and token handling
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        // A name that could never have been registered cannot match a record
        let Ok(username) = Username::new(username.to_string()) else {
            return Ok(None);
        };

        Ok(self.repository.find_by_username(&username).await?)
    }
}

#[async_trait]
impl<UR> AuthenticationServicePort for AuthenticationService<UR>
where
    UR: UserRepository,
{
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.find_user(username).await? else {
            self.authenticator.simulate_verification(password).await?;
            tracing::info!(reason = "unknown_user", "Authentication failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .authenticator
            .verify_password(password, &user.password_hash)
            .await?
        {
            tracing::info!(
                reason = "password_mismatch",
                user_id = %user.id,
                "Authentication failed"
            );
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let user = self.authenticate(username, password).await?;
        let issued = self.authenticator.issue_token(user.username.as_str())?;

        tracing::info!(
            user_id = %user.id,
            expires_at = %issued.claims.expires_at(),
            "Session token issued"
        );

        Ok(AccessToken::from_issued(issued))
    }

    async fn resolve_current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.authenticator.validate_token(token)?;

        self.find_user(claims.subject())
            .await?
            .ok_or_else(|| AuthError::UserNotFound(claims.sub.clone()))
    }
}

#[cfg(test)]
mod tests {
    use auth::ManualClock;
    use auth::SigningSecret;
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::UserId;
    use crate::user::errors::UserError;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
        }
    }

    const SECRET: &str = "test_secret_key_at_least_32_bytes!";

    fn authenticator(clock: Arc<ManualClock>) -> Arc<Authenticator> {
        let secret = SigningSecret::new(SECRET).unwrap();
        Arc::new(Authenticator::with_clock(&secret, clock).with_leeway(Duration::zero()))
    }

    async fn alice(authenticator: &Authenticator) -> User {
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("a@b.com".to_string()).unwrap(),
            password_hash: authenticator.hash_password("secret123").await.unwrap(),
            created_at: Utc::now(),
        }
    }

    /// Repository holding exactly one user.
    fn repository_with(user: User) -> MockTestUserRepository {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(move |username| {
                Ok((username == &user.username).then(|| user.clone()))
            });
        repository
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let authenticator = authenticator(Arc::new(ManualClock::starting_now()));
        let user = alice(&authenticator).await;
        let service = AuthenticationService::new(
            Arc::new(repository_with(user.clone())),
            Arc::clone(&authenticator),
        );

        let authenticated = service.authenticate("alice", "secret123").await.unwrap();
        assert_eq!(authenticated, user);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let authenticator = authenticator(Arc::new(ManualClock::starting_now()));
        let user = alice(&authenticator).await;
        let service = AuthenticationService::new(
            Arc::new(repository_with(user)),
            Arc::clone(&authenticator),
        );

        let wrong_password = service.authenticate("alice", "wrongpass").await.unwrap_err();
        let unknown_user = service.authenticate("nobody", "anything").await.unwrap_err();
        let invalid_name = service.authenticate("x", "anything").await.unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password, invalid_name);
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_invalid_credentials() {
        let authenticator = authenticator(Arc::new(ManualClock::starting_now()));
        let mut user = alice(&authenticator).await;
        user.password_hash = "legacy$format".to_string();
        let service =
            AuthenticationService::new(Arc::new(repository_with(user)), authenticator);

        assert_eq!(
            service.authenticate("alice", "secret123").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_login_issues_thirty_minute_token() {
        let authenticator = authenticator(Arc::new(ManualClock::starting_now()));
        let user = alice(&authenticator).await;
        let service = AuthenticationService::new(
            Arc::new(repository_with(user)),
            Arc::clone(&authenticator),
        );

        let token = service.login("alice", "secret123").await.unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 30 * 60);

        let claims = authenticator.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[tokio::test]
    async fn test_login_wrong_password_issues_nothing() {
        let authenticator = authenticator(Arc::new(ManualClock::starting_now()));
        let user = alice(&authenticator).await;
        let service =
            AuthenticationService::new(Arc::new(repository_with(user)), authenticator);

        assert_eq!(
            service.login("alice", "wrongpass").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_resolve_current_user_until_expiry() {
        let clock = Arc::new(ManualClock::starting_now());
        let authenticator = authenticator(clock.clone());
        let user = alice(&authenticator).await;
        let service = AuthenticationService::new(
            Arc::new(repository_with(user.clone())),
            Arc::clone(&authenticator),
        );

        let token = service.login("alice", "secret123").await.unwrap();
        assert_eq!(
            service.resolve_current_user(&token.access_token).await.unwrap(),
            user
        );

        clock.advance(Duration::minutes(31));
        assert_eq!(
            service
                .resolve_current_user(&token.access_token)
                .await
                .unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn test_resolve_current_user_deleted_subject() {
        let clock = Arc::new(ManualClock::starting_now());
        let authenticator = authenticator(clock);
        let issued = authenticator.issue_token("ghost").unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        let service = AuthenticationService::new(Arc::new(repository), authenticator);

        assert_eq!(
            service.resolve_current_user(&issued.token).await.unwrap_err(),
            AuthError::UserNotFound("ghost".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_current_user_bad_tokens() {
        let clock = Arc::new(ManualClock::starting_now());
        let authenticator = authenticator(clock.clone());

        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);
        let service = AuthenticationService::new(Arc::new(repository), Arc::clone(&authenticator));

        assert!(matches!(
            service.resolve_current_user("garbage").await,
            Err(AuthError::TokenMalformed(_))
        ));

        let other_secret = SigningSecret::new("another_secret_key_at_least_32_bytes").unwrap();
        let forged = Authenticator::with_clock(&other_secret, clock)
            .issue_token("alice")
            .unwrap();
        assert_eq!(
            service.resolve_current_user(&forged.token).await.unwrap_err(),
            AuthError::TokenSignatureInvalid
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_not_invalid_credentials() {
        let authenticator = authenticator(Arc::new(ManualClock::starting_now()));

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection reset".to_string())));
        let service = AuthenticationService::new(Arc::new(repository), authenticator);

        assert!(matches!(
            service.authenticate("alice", "secret123").await,
            Err(AuthError::Store(_))
        ));
    }
}
