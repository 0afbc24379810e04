//! Authentication form controllers.
//!
//! Thin, stateless-per-submission wrappers over the identity service:
//! validate the input, call the one matching operation, hand the
//! outcome back to the caller for display.

use std::sync::Arc;

use taskdeck_core::error::Result;
use taskdeck_core::identity::{Identity, IdentityService};
use taskdeck_core::validation::{LoginInput, ResetInput, SignupInput};

use super::{Submission, SubmitGuard};

/// Controller for the login form.
pub struct LoginForm {
    identity: Arc<dyn IdentityService>,
    guard: SubmitGuard,
}

impl LoginForm {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self {
            identity,
            guard: SubmitGuard::default(),
        }
    }

    /// Validates and signs in.
    pub async fn submit(&self, input: LoginInput) -> Result<Submission<Identity>> {
        if !self.guard.claim() {
            return Ok(Submission::Ignored);
        }
        let result = self.run(input).await;
        self.guard.release();
        result.map(Submission::Completed)
    }

    async fn run(&self, input: LoginInput) -> Result<Identity> {
        input.validate()?;
        self.identity.sign_in(&input.email, &input.password).await
    }
}

/// Controller for the signup form.
pub struct SignupForm {
    identity: Arc<dyn IdentityService>,
    guard: SubmitGuard,
}

impl SignupForm {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self {
            identity,
            guard: SubmitGuard::default(),
        }
    }

    /// Validates and creates the account.
    pub async fn submit(&self, input: SignupInput) -> Result<Submission<Identity>> {
        if !self.guard.claim() {
            return Ok(Submission::Ignored);
        }
        let result = self.run(input).await;
        self.guard.release();
        result.map(Submission::Completed)
    }

    async fn run(&self, input: SignupInput) -> Result<Identity> {
        input.validate()?;
        self.identity
            .sign_up(&input.email, &input.password, input.display_name.trim())
            .await
    }
}

/// Controller for the password-reset form.
pub struct PasswordResetForm {
    identity: Arc<dyn IdentityService>,
    guard: SubmitGuard,
}

impl PasswordResetForm {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self {
            identity,
            guard: SubmitGuard::default(),
        }
    }

    /// Validates and requests the reset email.
    pub async fn submit(&self, input: ResetInput) -> Result<Submission<()>> {
        if !self.guard.claim() {
            return Ok(Submission::Ignored);
        }
        let result = self.run(input).await;
        self.guard.release();
        result.map(Submission::Completed)
    }

    async fn run(&self, input: ResetInput) -> Result<()> {
        input.validate()?;
        self.identity.send_password_reset(&input.email).await
    }
}
