use cuotas_domain::{Action, Role};

use crate::CoreError;

/// Fails with `PermissionDenied` unless `role` may perform `action`.
pub fn authorize(role: Role, action: Action) -> Result<(), CoreError> {
    if role.allows(action) {
        Ok(())
    } else {
        Err(CoreError::PermissionDenied { role, action })
    }
}
