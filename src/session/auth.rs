use serde_json::json;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{AdminUser, Capability, LoginResponse, NewAdminUser};

/// Admin authentication and account management.
///
/// Unlike the data facade, every error here is returned to the caller so
/// the UI can show it.
#[derive(Clone)]
pub struct AdminAuth {
    api: ApiClient,
}

impl AdminAuth {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    pub fn current_user(&self) -> Option<AdminUser> {
        self.api.session().user()
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.api.session().has_capability(capability)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, ApiError> {
        let resp: LoginResponse = self
            .api
            .post("/admin/login", &json!({ "email": email, "password": password }))
            .await
            .map_err(|e| {
                warn!("Login failed for {}: {}", email, e);
                e
            })?;

        if resp.token.is_empty() {
            return Err(ApiError::Decode("login response carried an empty token".to_string()));
        }

        info!("Logged in as {} ({:?})", resp.admin.email, resp.admin.role);
        self.api.session().set(resp.token, resp.admin.clone());
        Ok(resp.admin)
    }

    pub fn logout(&self) {
        if self.is_authenticated() {
            info!("Logged out");
        }
        self.api.session().clear();
    }

    /// Ask the server whether the token is still good and refresh the profile
    pub async fn verify(&self) -> Result<AdminUser, ApiError> {
        self.require_login()?;
        let value: serde_json::Value = self.api.get("/admin/verify").await?;
        // accepts either `{ admin: {...} }` or the bare profile
        let user: AdminUser = serde_json::from_value(value.get("admin").cloned().unwrap_or(value))
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.api.session().set_user(user.clone());
        Ok(user)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.require_login()?;
        let _: serde_json::Value = self
            .api
            .post(
                "/admin/change-password",
                &json!({ "currentPassword": current_password, "newPassword": new_password }),
            )
            .await?;
        info!("Password changed");
        Ok(())
    }

    pub async fn list_admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.require(Capability::ManageAdmins)?;
        self.api.get("/admin/users").await
    }

    pub async fn create_admin_user(&self, user: &NewAdminUser) -> Result<AdminUser, ApiError> {
        self.require(Capability::ManageAdmins)?;
        let created: AdminUser = self.api.post("/admin/users", user).await?;
        info!("Created admin {}", created.email);
        Ok(created)
    }

    pub async fn delete_admin_user(&self, id: &str) -> Result<(), ApiError> {
        self.require(Capability::ManageAdmins)?;
        self.api.delete(&format!("/admin/users/{id}")).await?;
        info!("Deleted admin {}", id);
        Ok(())
    }

    fn require_login(&self) -> Result<(), ApiError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }

    fn require(&self, capability: Capability) -> Result<(), ApiError> {
        self.require_login()?;
        if self.has_capability(capability) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(capability))
        }
    }
}
