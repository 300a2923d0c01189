use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::handler::db::DatabaseService;
use crate::model::{errors::ResError, user::SessionUser};

pub const SESSION_COOKIE: &str = "auth_token";

impl DatabaseService {
    /// Maps an opaque session token to the caller's identity through the
    /// external user directory. No rows means invalid or expired.
    pub async fn resolve_session(&self, token: &str) -> Result<SessionUser, ResError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT user_id, email, full_name, avatar_url FROM validate_session($1)",
                &[&token],
            )
            .await?;

        match row {
            Some(row) => SessionUser::try_from(row),
            None => Err(ResError::Unauthorized),
        }
    }
}

/// Extractor so every authenticated route receives the resolved caller
/// identity as an argument instead of re-deriving it internally.
impl FromRequest for SessionUser {
    type Error = ResError;
    type Future = LocalBoxFuture<'static, Result<SessionUser, ResError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_owned());
        let db = req.app_data::<Data<DatabaseService>>().cloned();

        Box::pin(async move {
            let token = token.ok_or(ResError::Unauthorized)?;
            let db = db.ok_or(ResError::Internal)?;
            db.resolve_session(token.as_str()).await
        })
    }
}
