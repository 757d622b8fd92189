//! Resolución de roles
//!
//! Un rol explícito válido gana; si no, se mira el dominio del email en el
//! mapeo configurado; el resto son `client`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RoleDomainMap;
use crate::models::{Role, RoleSource};

#[derive(Debug, Clone)]
pub struct RoleResolver {
    domains: Arc<RoleDomainMap>,
}

impl RoleResolver {
    pub fn new(domains: Arc<RoleDomainMap>) -> Self {
        Self { domains }
    }

    pub fn resolve_role(&self, email: &str, explicit_role: Option<&str>) -> (Role, RoleSource) {
        if let Some(raw) = explicit_role.map(str::trim).filter(|raw| !raw.is_empty()) {
            match raw.parse::<Role>() {
                Ok(role) => return (role, RoleSource::Explicit),
                Err(e) => warn!(email = %email, "⚠️ Rol explícito ignorado: {}", e),
            }
        }

        let role = self.domains.role_for_email(email).unwrap_or(Role::Client);
        debug!(email = %email, role = %role, "👤 Rol derivado del dominio");
        (role, RoleSource::Domain)
    }
}
