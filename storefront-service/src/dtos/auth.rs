use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Admin, Customer};

#[derive(Debug, Deserialize, Validate)]
pub struct CheckEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Constant shape whether or not the account exists.
#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}

/// Quick-auth: login when the email exists, signup when it does not.
///
/// Password strength is checked in the handler on the signup path only, so
/// an existing account with a legacy password can still log in.
#[derive(Debug, Deserialize, Validate)]
pub struct QuickAuthRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Required on signup, ignored on login.
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuickAuthResponse {
    pub token: String,
    pub customer: CustomerProfile,
    /// Whether this call created the account.
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl From<Customer> for CustomerProfile {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            email: c.email,
            name: c.name,
            phone: c.phone,
            company: c.company,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub admin: AdminProfile,
}

#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<Admin> for AdminProfile {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id,
            email: a.email,
            name: a.name,
        }
    }
}
