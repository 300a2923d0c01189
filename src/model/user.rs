use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::model::errors::ResError;

/// Identity record resolved from the external user directory. This
/// service never writes users, it only reads what `validate_session`
/// returns for the caller's token.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl SessionUser {
    /// Display name stored on authored rows: full name, then the local
    /// part of the email, then the anonymous label.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref() {
            if !name.is_empty() {
                return name.to_owned();
            }
        }
        if let Some(email) = self.email.as_deref() {
            if let Some(local) = email.split('@').next() {
                if !local.is_empty() {
                    return local.to_owned();
                }
            }
        }
        "Anonim Kullanıcı".to_owned()
    }
}

impl TryFrom<Row> for SessionUser {
    type Error = ResError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(SessionUser {
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            avatar_url: row.try_get("avatar_url")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(full_name: Option<&str>, email: Option<&str>) -> SessionUser {
        SessionUser {
            user_id: Uuid::new_v4(),
            email: email.map(str::to_owned),
            full_name: full_name.map(str::to_owned),
            avatar_url: None,
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(
            user(Some("Ayşe Yılmaz"), Some("ayse@example.com")).display_name(),
            "Ayşe Yılmaz"
        );
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        assert_eq!(user(None, Some("ayse@example.com")).display_name(), "ayse");
        assert_eq!(user(Some(""), Some("ayse@example.com")).display_name(), "ayse");
    }

    #[test]
    fn display_name_defaults_to_anonymous() {
        assert_eq!(user(None, None).display_name(), "Anonim Kullanıcı");
        assert_eq!(user(None, Some("@example.com")).display_name(), "Anonim Kullanıcı");
    }
}
