//! Per-tenant dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sts_auth::Request;
use tracing::info;

use crate::error::{StsError, StsResult};
use crate::response::{IssueResponse, IssuedToken};
use crate::sts::Sts;

/// Routes operations to the STS of the tenant named in the request path.
#[derive(Default)]
pub struct MultiTenantSts {
    tenants: RwLock<HashMap<String, Arc<Sts>>>,
}

impl MultiTenantSts {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a tenant.
    pub fn add_tenant(&self, tenant: impl Into<String>, sts: Sts) {
        let tenant = tenant.into();
        info!(%tenant, "tenant registered");
        self.tenants.write().insert(tenant, Arc::new(sts));
    }

    /// Removes a tenant.
    pub fn remove_tenant(&self, tenant: &str) -> bool {
        self.tenants.write().remove(tenant).is_some()
    }

    /// Returns the tenant's STS.
    pub fn tenant(&self, tenant: &str) -> StsResult<Arc<Sts>> {
        self.tenants
            .read()
            .get(tenant)
            .cloned()
            .ok_or_else(|| StsError::NoSuchIdp {
                tenant: tenant.to_string(),
            })
    }

    /// Issue for a tenant.
    pub async fn issue(&self, tenant: &str, request: &Request) -> StsResult<IssueResponse> {
        self.tenant(tenant)?.issue(request).await
    }

    /// Renew for a tenant.
    pub async fn renew(&self, tenant: &str, request: &Request) -> StsResult<IssuedToken> {
        self.tenant(tenant)?.renew(request).await
    }

    /// Validate for a tenant.
    pub async fn validate(&self, tenant: &str, request: &Request) -> StsResult<bool> {
        self.tenant(tenant)?.validate(request).await
    }

    /// Challenge for a tenant.
    pub async fn challenge(&self, tenant: &str, request: &Request) -> StsResult<IssueResponse> {
        self.tenant(tenant)?.challenge(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sts::StsServices;
    use crate::testutil::{ScriptedAuthenticator, StubAuthority, StubDiscovery, StubValidator};
    use sts_auth::{RequestSecurityToken, SecurityHeader, request_type};
    use sts_core::StsConfig;

    fn sts() -> Sts {
        Sts::new(
            StsConfig::for_testing(),
            StsServices {
                authenticator: Arc::new(ScriptedAuthenticator::default()),
                token_validator: Arc::new(StubValidator::Valid),
                authority: Arc::new(StubAuthority::default()),
                discovery: Arc::new(StubDiscovery::default()),
            },
        )
    }

    #[tokio::test]
    async fn unknown_tenant_is_no_such_idp() {
        let registry = MultiTenantSts::new();
        registry.add_tenant("acme", sts());
        assert!(registry.tenant("acme").is_ok());

        let request = Request::new(
            SecurityHeader::default(),
            RequestSecurityToken::new(request_type::ISSUE),
        );
        let err = registry.issue("globex", &request).await.unwrap_err();
        assert!(matches!(err, StsError::NoSuchIdp { tenant } if tenant == "globex"));
    }

    #[test]
    fn tenants_can_be_removed() {
        let registry = MultiTenantSts::new();
        registry.add_tenant("acme", sts());
        assert!(registry.remove_tenant("acme"));
        assert!(!registry.remove_tenant("acme"));
        assert!(registry.tenant("acme").is_err());
    }
}
