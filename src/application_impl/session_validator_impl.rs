use crate::application_port::{SessionValidator, TokenCodec};
use crate::domain_model::SubjectId;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

/// Lenient bearer validation: anything that does not yield a live subject
/// downgrades the request to anonymous instead of failing it.
pub struct BearerSessionValidator {
    header_name: String,
    codec: Arc<dyn TokenCodec>,
}

impl BearerSessionValidator {
    pub fn new(header_name: impl Into<String>, codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            header_name: header_name.into(),
            codec,
        }
    }
}

impl SessionValidator for BearerSessionValidator {
    fn header_name(&self) -> &str {
        &self.header_name
    }

    fn derive_subject(&self, header_value: Option<&str>) -> Option<SubjectId> {
        let header_value = header_value?;
        let Some(token) = header_value.split_whitespace().nth(1) else {
            warn!("Invalid authorization header");
            return None;
        };

        let Some(claims) = self.codec.decode(token) else {
            warn!("Invalid authorization header");
            return None;
        };

        if !claims.is_live_at(Utc::now()) {
            debug!(subject = %claims.subject, "expired or non-expiring access token");
            return None;
        }

        Some(claims.subject)
    }
}
