//! Named hydrators referenced from `config/hal.json`.

use hal_framework::{Entity, Fields, HalError, HydratorManager};

/// Fields that never leave the store.
const PRIVATE_FIELDS: [&str; 2] = ["email", "password"];

/// Public fields minus anything personal.
pub fn public_profile(entity: &dyn Entity) -> Result<Fields, HalError> {
    let mut fields = entity.public_fields()?;
    for name in PRIVATE_FIELDS {
        fields.remove(name);
    }
    Ok(fields)
}

/// Hydrators the store configuration may name.
pub fn registry() -> HydratorManager {
    HydratorManager::new().with_named("public_profile", public_profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, UserId};

    #[test]
    fn public_profile_hides_email() {
        let user = User::new(UserId(1), "Alice", "alice@example.com");
        let fields = public_profile(&user).unwrap();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn registry_resolves_by_name() {
        let hydrators = registry();
        assert!(hydrators.resolve("public_profile").is_ok());
        assert!(matches!(hydrators.resolve("private"), Err(HalError::UnknownHydrator(_))));
    }
}
