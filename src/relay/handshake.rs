//! Connection admission

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::codec::{encode, encode_header, OpCode, SenderHeader};
use crate::error::SessionError;
use crate::session::{Outbound, Session};
use crate::tenant::{Tenant, TenantRegistry};

/// Longest accepted session id in bytes
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Why a connection was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("server not found: {0}")]
    UnknownTenant(String),

    #[error("multi login not allowed: {0}")]
    DuplicateSession(String),

    #[error("invalid id: {0:?}")]
    InvalidSessionId(String),
}

impl Rejection {
    /// Text sent to the client in a MESSAGE frame
    pub fn notice(&self) -> &'static str {
        match self {
            Rejection::UnknownTenant(_) => "Connection cancel: server not found.",
            Rejection::DuplicateSession(_) => "Connection cancel: multi login is not allowed.",
            Rejection::InvalidSessionId(_) => "Connection cancel: invalid id.",
        }
    }
}

/// Session ids end up inside console commands; only allow name-like ids
pub fn validate_session_id(id: &str) -> Result<(), SessionError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidId(id.to_string()))
    }
}

/// Resolve the tenant and register the session
pub fn admit(
    tenants: &TenantRegistry,
    tenant_name: &str,
    id: &str,
    outbound: Outbound,
) -> Result<(Arc<Tenant>, Session), Rejection> {
    let tenant = tenants
        .resolve(tenant_name)
        .ok_or_else(|| Rejection::UnknownTenant(tenant_name.to_string()))?;

    validate_session_id(id).map_err(|_| Rejection::InvalidSessionId(id.to_string()))?;

    let session = tenant
        .sessions()
        .register(id, outbound)
        .map_err(|e| match e {
            SessionError::Duplicate(id) => Rejection::DuplicateSession(id),
            SessionError::InvalidId(id) => Rejection::InvalidSessionId(id),
        })?;

    Ok((tenant, session))
}

/// MESSAGE frame explaining `rejection`, addressed as coming from `id`
pub fn rejection_frame(id: &str, rejection: &Rejection) -> Bytes {
    let header = encode_header(id).unwrap_or_else(|_| SenderHeader::empty());
    encode(OpCode::Message, &header, rejection.notice().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::tenant::TenantConfig;
    use tokio::sync::mpsc;

    fn registry() -> TenantRegistry {
        let registry = TenantRegistry::new();
        registry
            .create("alpha", TenantConfig::new("localhost:25575", "0000"))
            .unwrap();
        registry
    }

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("Steve").is_ok());
        assert!(validate_session_id("p1_-x").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("a b").is_err());
        assert!(validate_session_id("@a").is_err());
        assert!(validate_session_id("p1\nop p1").is_err());
        assert!(validate_session_id(&"x".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_admit() {
        let tenants = registry();
        let (tx, _rx) = mpsc::channel(4);

        let (tenant, session) = admit(&tenants, "alpha", "p1", tx).unwrap();
        assert_eq!(tenant.name(), "alpha");
        assert_eq!(session.id, "p1");
        assert!(tenant.sessions().contains("p1"));
    }

    #[test]
    fn test_admit_unknown_tenant() {
        let tenants = registry();
        let (tx, _rx) = mpsc::channel(4);
        assert_eq!(
            admit(&tenants, "beta", "p1", tx).unwrap_err(),
            Rejection::UnknownTenant("beta".into())
        );
    }

    #[test]
    fn test_second_login_rejected_first_kept() {
        let tenants = registry();
        let (tx1, _rx1) = mpsc::channel(4);
        let (tx2, _rx2) = mpsc::channel(4);

        admit(&tenants, "alpha", "p1", tx1.clone()).unwrap();
        let rejection = admit(&tenants, "alpha", "p1", tx2).unwrap_err();
        assert_eq!(rejection, Rejection::DuplicateSession("p1".into()));

        let tenant = tenants.resolve("alpha").unwrap();
        assert!(tenant.sessions().get("p1").unwrap().outbound.same_channel(&tx1));

        let frame = decode(&rejection_frame("p1", &rejection)).unwrap();
        assert_eq!(frame.op, OpCode::Message);
        assert_eq!(frame.sender, "p1");
        assert_eq!(
            std::str::from_utf8(&frame.payload).unwrap(),
            "Connection cancel: multi login is not allowed."
        );
    }

    #[test]
    fn test_admit_invalid_id() {
        let tenants = registry();
        let (tx, _rx) = mpsc::channel(4);
        assert!(matches!(
            admit(&tenants, "alpha", "bad id", tx),
            Err(Rejection::InvalidSessionId(_))
        ));
        assert!(tenants.resolve("alpha").unwrap().sessions().is_empty());
    }
}
