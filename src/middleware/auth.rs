use actix_web::{dev::Payload, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::utils::AppError;

/// Claims carried by the identity provider's HS256 bearer token.
/// `sub` is the gardener uid every ownership check keys on.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub exp: usize,
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

/// Verify a bearer token and return its claims.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))
}

fn claims_from_request(req: &HttpRequest) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("missing authorization token".to_string()))?;

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("invalid token format".to_string()))?;

    verify_token(token)
}

impl FromRequest for Claims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_with(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    fn valid_claims() -> Claims {
        Claims {
            sub: "u1".into(),
            name: Some("Flora".into()),
            picture: None,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn verifies_a_well_formed_token() {
        let token = token_with(&valid_claims(), &jwt_secret());
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.name.as_deref(), Some("Flora"));
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let token = token_with(&valid_claims(), "some-other-secret");
        assert!(matches!(
            verify_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_an_expired_token() {
        let claims = Claims {
            exp: (chrono::Utc::now().timestamp() - 3600) as usize,
            ..valid_claims()
        };
        let token = token_with(&claims, &jwt_secret());
        assert!(matches!(
            verify_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_reads_the_bearer_header() {
        let token = token_with(&valid_claims(), &jwt_secret());
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        let claims = Claims::extract(&req).await.unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[actix_web::test]
    async fn extractor_rejects_missing_and_malformed_headers() {
        let req = TestRequest::default().to_http_request();
        assert!(Claims::extract(&req).await.is_err());

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();
        assert!(Claims::extract(&req).await.is_err());
    }
}
