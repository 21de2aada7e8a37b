use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Reads `exp` from a bearer token without verifying its signature.
///
/// Tokens that are not JWTs, or carry no `exp`, have no known expiry.
pub(crate) fn expires_at(token: &str) -> Option<OffsetDateTime> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims.exp.and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok())
}

pub(crate) fn is_expired(token: &str, now: OffsetDateTime) -> bool {
    expires_at(token).is_some_and(|expiry| expiry <= now)
}

#[cfg(test)]
pub(crate) fn unsigned_jwt(exp: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[derive(serde::Serialize)]
    struct Claims {
        sub: &'static str,
        exp: i64,
    }

    encode(&Header::default(), &Claims { sub: "u-1", exp }, &EncodingKey::from_secret(b"k"))
        .expect("encode test token")
}
