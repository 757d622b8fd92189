//! Servicio de usuarios
//!
//! Alta de usuarios con rol resuelto, consulta y cambio de rol por un
//! administrador.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::authorization_service::AuthorizationService;
use super::role_resolver::RoleResolver;
use crate::models::{Role, RoleSource, User};
use crate::repositories::{Store, UserRepository};
use crate::utils::errors::{invalid_input_error, not_found_error, AppResult};
use crate::utils::validation::validate_email;

/// Datos de alta de un usuario
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub company_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    resolver: RoleResolver,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, resolver: RoleResolver) -> Self {
        Self { store, resolver }
    }

    pub async fn register_user(&self, input: RegisterUser) -> AppResult<User> {
        let email = input.email.trim().to_ascii_lowercase();
        validate_email(&email).map_err(|_| invalid_input_error("email is not a valid address"))?;

        let company_name = input
            .company_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let (role, role_source) = self.resolver.resolve_role(&email, input.role.as_deref());
        let user = self
            .store
            .insert_user(User::new(email, role, role_source, company_name))
            .await?;

        info!(user_id = %user.id, role = %user.role, "✅ Usuario registrado");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))
    }

    /// Cambio de rol por un administrador; el rol queda fijado con origen `admin`
    pub async fn change_role(&self, acting: &User, user_id: Uuid, role: Role) -> AppResult<User> {
        AuthorizationService::require(AuthorizationService::can_manage_roles(acting), acting, "change user role")?;

        let user = self.store.update_user_role(user_id, role, RoleSource::Admin).await?;
        info!(admin_id = %acting.id, user_id = %user.id, role = %user.role, "🔑 Rol actualizado");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoleDomainMap;
    use crate::repositories::MemoryStore;
    use crate::utils::errors::AppError;

    fn service() -> UserService {
        UserService::new(
            Arc::new(MemoryStore::new()),
            RoleResolver::new(Arc::new(RoleDomainMap::default())),
        )
    }

    fn register(email: &str, role: Option<&str>) -> RegisterUser {
        RegisterUser {
            email: email.to_string(),
            company_name: Some("  Acme  ".to_string()),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_register_resolves_role() {
        let service = service();
        let user = service.register_user(register("Ops@Logistic.com", None)).await.unwrap();

        assert_eq!(user.email, "ops@logistic.com");
        assert_eq!(user.role, Role::Logistic);
        assert_eq!(user.role_source, RoleSource::Domain);
        assert_eq!(user.company_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();
        service.register_user(register("a@example.com", None)).await.unwrap();
        let again = service.register_user(register("A@example.com", Some("admin"))).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let result = service().register_user(register("not-an-email", None)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_change_role_requires_admin() {
        let service = service();
        let admin = service.register_user(register("boss@admin.com", None)).await.unwrap();
        let manager = service.register_user(register("m@manager.com", None)).await.unwrap();
        let client = service.register_user(register("c@logistic.com", Some("client"))).await.unwrap();

        let denied = service.change_role(&manager, client.id, Role::Logistic).await;
        assert!(matches!(denied, Err(AppError::Unauthorized(_))));

        let changed = service.change_role(&admin, client.id, Role::Logistic).await.unwrap();
        assert_eq!(changed.role, Role::Logistic);
        assert_eq!(changed.role_source, RoleSource::Admin);

        let stored = service.get_user(client.id).await.unwrap();
        assert_eq!(stored.role_source, RoleSource::Admin);
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let result = service().get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
