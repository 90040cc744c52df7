//! Password hashing and reset tokens.
//!
//! Passwords are stored as Argon2 PHC strings. Plain text reaches the
//! `password` column either through [`PasswordExt::set_password`] or through
//! the column setter, which the API layer applies to untrusted input.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use uuid::Uuid;

use activerecord_core::{ColumnDef, Error, Result, Value};

use super::text_column;
use crate::model::{Bundle, Model, TableBuilder};
use crate::record::Record;

pub const PASSWORD: &str = "password";
pub const PASSWORD_RESET_TOKEN: &str = "password_reset_token";
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Adds `password VARCHAR(1024) NOT NULL` (hashed on input) and a nullable
/// `password_reset_token VARCHAR(1024)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Password;

impl Bundle for Password {
    fn contribute(&self, t: &mut TableBuilder) -> Result<()> {
        t.column(
            ColumnDef::new(PASSWORD)
                .sql_type("VARCHAR")
                .length(1024)
                .not_null()
                .setter(|value| match value {
                    Value::Text(plain) => hash_password(plain).map(Value::Text),
                    _ => Err("'Password' must be a string.".to_string()),
                }),
        )?;
        t.column(
            ColumnDef::new(PASSWORD_RESET_TOKEN)
                .sql_type("VARCHAR")
                .length(1024),
        )?;
        Ok(())
    }
}

/// Hash a plain text password, rejecting ones that are too short.
pub fn hash_password(plain: &str) -> std::result::Result<String, String> {
    let length = plain.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "'Password' must be at least {} characters long. {} characters provided.",
            PASSWORD_MIN_LENGTH, length
        ));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("'Password' hash failed: {}", e))
}

/// Operations for records with the [`Password`] bundle.
pub trait PasswordExt: Sized {
    /// Hash and store a new password.
    fn set_password(&mut self, plain: &str) -> Result<&mut Self>;

    /// True if `plain` matches the stored hash.
    fn is_password(&self, plain: &str) -> Result<bool>;

    fn password_reset_token(&self) -> Result<Option<String>>;

    /// Store and return a fresh random token.
    fn generate_password_reset_token(&mut self) -> Result<String>;

    fn clear_password_reset_token(&mut self) -> Result<&mut Self>;
}

impl<M: Model> PasswordExt for Record<M> {
    fn set_password(&mut self, plain: &str) -> Result<&mut Self> {
        let hash = hash_password(plain).map_err(Error::Custom)?;
        self.set(PASSWORD, hash)
    }

    fn is_password(&self, plain: &str) -> Result<bool> {
        let Some(stored) = text_column(self, PASSWORD)? else {
            return Ok(false);
        };
        match PasswordHash::new(&stored) {
            Ok(hash) => Ok(Argon2::default()
                .verify_password(plain.as_bytes(), &hash)
                .is_ok()),
            Err(e) => {
                tracing::warn!(
                    table = self.table_name(),
                    error = %e,
                    "Stored password is not a valid hash"
                );
                Ok(false)
            }
        }
    }

    fn password_reset_token(&self) -> Result<Option<String>> {
        text_column(self, PASSWORD_RESET_TOKEN)
    }

    fn generate_password_reset_token(&mut self) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.set(PASSWORD_RESET_TOKEN, token.clone())?;
        Ok(token)
    }

    fn clear_password_reset_token(&mut self) -> Result<&mut Self> {
        self.set(PASSWORD_RESET_TOKEN, Value::Null)
    }
}
