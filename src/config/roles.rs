//! Mapeo de dominios de email a roles
//!
//! Convención por defecto: `@logistic.com`, `@manager.com` y `@admin.com`.
//! Se puede sobrescribir con `ECOTRACK_ROLE_DOMAINS=acme-logistics.fr:logistic,...`.

use super::{env_optional, ConfigError};
use crate::models::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct RoleDomainMap {
    /// Pares (dominio, rol); el primer dominio que coincide gana
    pub entries: Vec<(String, Role)>,
}

impl Default for RoleDomainMap {
    fn default() -> Self {
        Self {
            entries: vec![
                ("logistic.com".to_string(), Role::Logistic),
                ("manager.com".to_string(), Role::Manager),
                ("admin.com".to_string(), Role::Admin),
            ],
        }
    }
}

impl RoleDomainMap {
    pub fn from_env() -> Result<Self, ConfigError> {
        match env_optional("ECOTRACK_ROLE_DOMAINS") {
            Some(raw) => Self::parse(&raw),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        const KEY: &str = "ECOTRACK_ROLE_DOMAINS";

        let entries = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (domain, role) = entry
                    .split_once(':')
                    .ok_or_else(|| ConfigError::invalid(KEY, format!("expected domain:role, got '{}'", entry)))?;
                let domain = domain.trim().trim_start_matches('@').to_ascii_lowercase();
                if domain.is_empty() {
                    return Err(ConfigError::invalid(KEY, "domain must not be empty"));
                }
                let role = role.parse::<Role>().map_err(|e| ConfigError::invalid(KEY, e))?;
                Ok((domain, role))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Rol asociado al dominio del email, si lo hay
    pub fn role_for_email(&self, email: &str) -> Option<Role> {
        let (_, domain) = email.trim().rsplit_once('@')?;
        let domain = domain.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(mapped, _)| domain == *mapped)
            .map(|(_, role)| *role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domains() {
        let map = RoleDomainMap::default();
        assert_eq!(map.role_for_email("anna@logistic.com"), Some(Role::Logistic));
        assert_eq!(map.role_for_email("BOSS@Manager.COM"), Some(Role::Manager));
        assert_eq!(map.role_for_email("root@admin.com"), Some(Role::Admin));
        assert_eq!(map.role_for_email("someone@gmail.com"), None);
        assert_eq!(map.role_for_email("no-at-sign"), None);
    }

    #[test]
    fn test_domain_must_match_exactly() {
        let map = RoleDomainMap::default();
        assert_eq!(map.role_for_email("eve@notlogistic.com"), None);
        assert_eq!(map.role_for_email("eve@logistic.com.evil.org"), None);
    }

    #[test]
    fn test_parse() {
        let map = RoleDomainMap::parse("@acme-logistics.fr:logistic, acme.fr:manager").unwrap();
        assert_eq!(map.role_for_email("x@acme-logistics.fr"), Some(Role::Logistic));
        assert_eq!(map.role_for_email("y@acme.fr"), Some(Role::Manager));
        assert!(RoleDomainMap::parse("acme.fr").is_err());
        assert!(RoleDomainMap::parse("acme.fr:driver").is_err());
    }
}
