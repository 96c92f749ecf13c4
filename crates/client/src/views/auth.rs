//! Signup, login and logout.

use carpool_core::{AuthResponse, LoginRequest, Role, SessionIdentity, SignupRequest};

use crate::api::endpoints;
use crate::error::ClientError;
use crate::route::Page;
use crate::views::Context;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct AuthView {
    ctx: Context,
}

impl AuthView {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Create an account, store its identity and return the landing page.
    pub async fn signup(&self, form: SignupForm) -> Option<Page> {
        let request = SignupRequest {
            email: normalize_email(&form.email),
            password: form.password,
            name: form.name.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
            role: form.role,
        };

        match self.authenticate(endpoints::SIGNUP, &request).await {
            Ok(identity) => {
                self.ctx.notifier.success(format!(
                    "Welcome, {}! Your account is ready.",
                    request.name
                ));
                Some(Page::landing(identity.role))
            }
            Err(err) => {
                tracing::error!(error = %err, "signup failed");
                let message = if err.to_string().to_lowercase().contains("email") {
                    "Email already registered or invalid."
                } else {
                    "Account creation failed."
                };
                self.ctx.notifier.danger(message);
                None
            }
        }
    }

    /// Log in, store the identity and return the landing page.
    ///
    /// Failures never say which credential was wrong.
    pub async fn login(&self, form: LoginForm) -> Option<Page> {
        let request = LoginRequest {
            email: normalize_email(&form.email),
            password: form.password,
        };

        match self.authenticate(endpoints::LOGIN, &request).await {
            Ok(identity) => {
                self.ctx
                    .notifier
                    .success(format!("Welcome back, {}!", identity.name));
                Some(Page::landing(identity.role))
            }
            Err(err) => {
                tracing::error!(error = %err, "login failed");
                self.ctx.notifier.danger("Invalid email or password.");
                None
            }
        }
    }

    async fn authenticate<B>(&self, endpoint: &str, body: &B) -> Result<SessionIdentity, ClientError>
    where
        B: serde::Serialize,
    {
        let response: AuthResponse = self.ctx.api.create(endpoint, body).await?;
        let identity = SessionIdentity::from(&response);
        self.ctx.session.persist(&identity)?;
        Ok(identity)
    }

    /// Forget the identity and go back to the entry page.
    pub fn logout(&self) -> Page {
        if let Err(err) = self.ctx.session.clear() {
            tracing::error!(error = %err, "failed to clear session");
        }
        Page::Index
    }
}
