//! Locally persisted identity of the logged-in user.

use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::role::Role;
use crate::user::AuthResponse;

/// The reduced identity kept between page loads.
///
/// This is the only state the client owns: created on login/signup, read by
/// every view, removed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl SessionIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&AuthResponse> for SessionIdentity {
    fn from(value: &AuthResponse) -> Self {
        Self {
            id: value.id,
            name: value.first_name.clone(),
            email: value.email.clone(),
            role: value.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_auth_response_to_identity() {
        let response: AuthResponse = serde_json::from_value(serde_json::json!({
            "message": "Login successful",
            "id": 3,
            "first_name": "Asha",
            "email": "asha@example.com",
            "role": "driver"
        }))
        .unwrap();

        let identity = SessionIdentity::from(&response);
        assert_eq!(identity.id, UserId::new(3));
        assert_eq!(identity.name, "Asha");
        assert_eq!(identity.role, Role::Driver);

        let stored = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            stored,
            serde_json::json!({"id": 3, "name": "Asha", "email": "asha@example.com", "role": "driver"})
        );
    }
}
