//! Auth endpoints: login, registration, verification, and the super-admin
//! approval queue.

use pappi_core::{UserId, UserRole};

use super::types::{LoginResponse, PendingUser, RegisterInput, RegisterResponse, VerifyResponse};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with an account-status code when the
    /// account is unverified, pending approval, or rejected; a code-less
    /// `Api` error means invalid credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let response = self
            .post("/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Register a new restaurant owner.
    ///
    /// The response carries the one-time verification codes (development
    /// deployment - nothing is dispatched out of band).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the email is already taken.
    pub async fn register(&self, input: &RegisterInput) -> Result<RegisterResponse, BackendError> {
        let response = self.post("/auth/register-v2").json(input).send().await?;

        Self::decode(response).await
    }

    /// Submit the email + SMS verification codes for a freshly registered user.
    ///
    /// # Errors
    ///
    /// Returns an error if either code is wrong or expired.
    pub async fn verify(
        &self,
        user_id: UserId,
        email_code: &str,
        sms_code: &str,
        email: &str,
    ) -> Result<VerifyResponse, BackendError> {
        let response = self
            .post("/auth/verify")
            .json(&serde_json::json!({
                "userId": user_id,
                "emailCode": email_code,
                "smsCode": sms_code,
                "email": email,
            }))
            .send()
            .await?;

        Self::decode(response).await
    }

    /// List users awaiting super-admin approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn pending_users(&self) -> Result<Vec<PendingUser>, BackendError> {
        let response = self.get("/auth/pending").send().await?;
        Self::decode(response).await
    }

    /// Approve a pending registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn approve_user(&self, user_id: UserId) -> Result<(), BackendError> {
        let response = self
            .post("/auth/approve")
            .json(&serde_json::json!({ "userId": user_id }))
            .send()
            .await?;

        Self::expect_success(response).await
    }

    /// Reject a pending registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn reject_user(&self, user_id: UserId) -> Result<(), BackendError> {
        let response = self
            .post("/auth/reject")
            .json(&serde_json::json!({ "userId": user_id }))
            .send()
            .await?;

        Self::expect_success(response).await
    }
}

/// Convenience constructor for the standard admin registration payload.
impl RegisterInput {
    #[must_use]
    pub fn admin(
        name: String,
        email: String,
        password: String,
        phone: String,
        restaurant_name: String,
    ) -> Self {
        Self {
            name,
            email,
            password,
            role: UserRole::Admin,
            phone,
            restaurant_name,
        }
    }
}
