//! TC3-HMAC-SHA256 request signing

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

#[derive(Clone)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

pub struct Signer<'a> {
    credential: &'a Credential,
    service: &'a str,
}

impl<'a> Signer<'a> {
    pub fn new(credential: &'a Credential, service: &'a str) -> Self {
        Self {
            credential,
            service,
        }
    }

    /// Builds the `Authorization` header for a JSON `POST /` to `host`.
    pub fn authorization(
        &self,
        host: &str,
        payload: &str,
        timestamp: i64,
    ) -> Result<String, ApiError> {
        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .ok_or_else(|| ApiError::SigningError(format!("invalid timestamp {}", timestamp)))?
            .format("%Y-%m-%d")
            .to_string();

        let canonical_request = format!(
            "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
            CONTENT_TYPE,
            host,
            SIGNED_HEADERS,
            sha256_hex(payload.as_bytes())
        );

        let scope = format!("{}/{}/tc3_request", date, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(
            format!("TC3{}", self.credential.secret_key).as_bytes(),
            date.as_bytes(),
        )?;
        let secret_service = hmac_sha256(&secret_date, self.service.as_bytes())?;
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request")?;
        let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes())?);

        Ok(format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.credential.secret_id, scope, SIGNED_HEADERS, signature
        ))
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ApiError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| ApiError::SigningError(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
