//! User sessions, bearer-token claims and the authorization gate

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by administrators
pub const ROLE_ADMIN: &str = "admin";
/// Role carried by every registered customer
pub const ROLE_CUSTOMER: &str = "customer";

/// Authenticated identity held by the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub token: String,
}

impl UserSession {
    /// `Authorization` header value for this session
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User roles
    pub roles: Vec<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    pub fn roles_for(is_admin: bool) -> Vec<String> {
        if is_admin {
            vec![ROLE_CUSTOMER.to_string(), ROLE_ADMIN.to_string()]
        } else {
            vec![ROLE_CUSTOMER.to_string()]
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ROLE_ADMIN)
    }
}

/// Authorization state of the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Customer,
    Admin,
}

impl Access {
    pub fn of(session: Option<&UserSession>) -> Self {
        match session {
            None => Access::Anonymous,
            Some(session) if session.is_admin => Access::Admin,
            Some(_) => Access::Customer,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Access::Anonymous)
    }
}

/// Kind of view being entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Catalog, product pages, cart
    Public,
    /// Checkout, profile, order history
    Protected,
    /// Back-office
    AdminOnly,
}

/// Where a rejected visitor is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    AdminLogin,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/login",
            Redirect::AdminLogin => "/admin/login",
        }
    }
}

/// Decide whether `access` may enter `boundary`.
pub fn admit(access: Access, boundary: Boundary) -> Result<(), Redirect> {
    match (boundary, access) {
        (Boundary::Public, _) => Ok(()),
        (Boundary::Protected, Access::Anonymous) => Err(Redirect::Login),
        (Boundary::Protected, _) => Ok(()),
        (Boundary::AdminOnly, Access::Admin) => Ok(()),
        (Boundary::AdminOnly, _) => Err(Redirect::AdminLogin),
    }
}
