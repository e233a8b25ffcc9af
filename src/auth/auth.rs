use crate::config::Config;
use crate::model::role::Role;
use crate::models::Claims;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};

pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            email: data.claims.sub,
            role,
        }))
    }
}

impl AuthUser {
    /// Capability checks live here, at the API boundary; the attendance
    /// core never inspects roles.
    pub fn require_company_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::CompanyAdmin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Company admin only"))
        }
    }

    /// A user may read their own KPIs; managers and company admins may
    /// read anyone's.
    pub fn require_self_or_manager_or_admin(&self, target_user_id: u64) -> actix_web::Result<()> {
        if self.user_id == target_user_id
            || matches!(self.role, Role::Manager | Role::CompanyAdmin)
        {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(
                "You may only view your own KPIs",
            ))
        }
    }
}
