use crate::models::{Order, Role, User};
use crate::utils::errors::{unauthorized_error, AppResult};

/// Servicio de autorización para verificar permisos por rol
pub struct AuthorizationService;

impl AuthorizationService {
    /// Verifica si un usuario tiene al menos uno de los roles requeridos
    pub fn has_any_role(user: &User, required_roles: &[Role]) -> bool {
        required_roles.contains(&user.role)
    }

    /// Verifica si un usuario puede elegir la opción de una ruta
    pub fn can_select_route(user: &User) -> bool {
        Self::has_any_role(user, &[Role::Logistic, Role::Admin])
    }

    /// Verifica si un usuario puede avanzar el estado de un pedido
    pub fn can_advance(user: &User) -> bool {
        Self::has_any_role(user, &[Role::Manager, Role::Admin, Role::Logistic])
    }

    /// Verifica si un usuario puede ver o cancelar un pedido
    pub fn can_access_order(user: &User, order: &Order) -> bool {
        user.role.is_staff() || order.user_id == user.id
    }

    /// Verifica si un usuario puede cambiar roles de otros usuarios
    pub fn can_manage_roles(user: &User) -> bool {
        matches!(user.role, Role::Admin)
    }

    /// Falla con `Unauthorized` si no se cumple el permiso
    pub fn require(allowed: bool, user: &User, operation: &str) -> AppResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(unauthorized_error(
                operation,
                &format!("role '{}' is not allowed", user.role),
            ))
        }
    }
}
