//! Seeding of the first administrator account

use anyhow::Result;
use shop::validation::{normalize_email, validate_email, validate_password};
use tracing::info;

use crate::{models::NewUser, repositories::UserRepository};

/// Administrator credentials read at startup
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AdminSeed {
    /// Read the seed from the environment, `None` when not configured
    ///
    /// # Environment Variables
    /// - `ADMIN_EMAIL`: Email of the administrator to ensure
    /// - `ADMIN_PASSWORD`: Password used if the account has to be created
    /// - `ADMIN_NAME`: Display name (default: "Admin")
    pub fn from_env() -> Result<Option<Self>> {
        let (Ok(email), Ok(password)) = (
            std::env::var("ADMIN_EMAIL"),
            std::env::var("ADMIN_PASSWORD"),
        ) else {
            return Ok(None);
        };

        let email = normalize_email(&email);
        validate_email(&email)?;
        validate_password(&password)?;

        let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string());

        Ok(Some(AdminSeed {
            name,
            email,
            password,
        }))
    }
}

/// Make sure the seeded account exists and carries the admin flag
pub async fn ensure_admin(users: &UserRepository, seed: AdminSeed) -> Result<()> {
    match users.find_by_email(&seed.email).await? {
        Some(user) if user.is_admin => {
            info!("Admin account {} already present", seed.email);
        }
        Some(user) => {
            users.promote_to_admin(user.id).await?;
            info!("Promoted {} to admin", seed.email);
        }
        None => {
            users
                .create(NewUser {
                    name: seed.name,
                    email: seed.email.clone(),
                    password: seed.password,
                    is_admin: true,
                })
                .await?;
            info!("Created admin account {}", seed.email);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_seed_absent_without_credentials() {
        unsafe {
            std::env::remove_var("ADMIN_EMAIL");
            std::env::remove_var("ADMIN_PASSWORD");
        }

        assert!(AdminSeed::from_env().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_seed_normalizes_email() {
        unsafe {
            std::env::set_var("ADMIN_EMAIL", "  Admin@Gmail.com ");
            std::env::set_var("ADMIN_PASSWORD", "change-me");
            std::env::remove_var("ADMIN_NAME");
        }

        let seed = AdminSeed::from_env().unwrap().unwrap();
        assert_eq!(seed.email, "admin@gmail.com");
        assert_eq!(seed.name, "Admin");

        unsafe {
            std::env::set_var("ADMIN_PASSWORD", "123");
        }
        assert!(AdminSeed::from_env().is_err());

        unsafe {
            std::env::remove_var("ADMIN_EMAIL");
            std::env::remove_var("ADMIN_PASSWORD");
        }
    }
}
