use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
    get_current_timestamp,
};
use uuid::Uuid;

use crate::{model::employee::Employee, models::Claims};

pub fn generate_access_token(employee: &Employee, secret: &str, ttl: u64) -> Result<String, Error> {
    let claims = Claims {
        sub: employee.id,
        name: employee.name.clone(),
        role: employee.role,
        exp: get_current_timestamp() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
