use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::Result;

pub const ROLE_DEPARTMENT_ADMIN: &str = "department_admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub department_id: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl User {
    pub fn new(
        id: &str,
        name: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            department_id: None,
            roles: Vec::new(),
            is_active: true,
        }
    }

    pub fn in_department(
        mut self,
        department_id: &str,
    ) -> Self {
        self.department_id = Some(department_id.to_string());
        self
    }

    pub fn with_role(
        mut self,
        role: &str,
    ) -> Self {
        self.roles.push(role.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn has_role(
        &self,
        role: &str,
    ) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_DEPARTMENT_ADMIN) || self.has_role(ROLE_SUPER_ADMIN)
    }

    fn belongs_to(
        &self,
        department_id: &str,
    ) -> bool {
        self.department_id.as_deref() == Some(department_id)
    }
}

/// User lookups needed for assignment, approval and fan-out.
pub trait Directory: Send + Sync {
    fn user(
        &self,
        id: &str,
    ) -> Result<Option<User>>;

    /// First active user holding `role` within `department_id`.
    fn first_active_with_role(
        &self,
        role: &str,
        department_id: &str,
    ) -> Result<Option<User>>;

    fn first_department_admin(
        &self,
        department_id: &str,
    ) -> Result<Option<User>>;

    /// Active admins of the department plus every active super admin.
    fn admins_for(
        &self,
        department_id: &str,
    ) -> Result<Vec<User>>;

    fn is_admin(
        &self,
        user_id: &str,
    ) -> Result<bool>;
}

/// Directory held in memory; "first" means first added.
#[derive(Default)]
pub struct MemDirectory {
    users: RwLock<Vec<User>>,
}

impl MemDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, replacing any existing user with the same id.
    pub fn add_user(
        &self,
        user: User,
    ) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
    }

    fn find(
        &self,
        f: impl Fn(&User) -> bool,
    ) -> Option<User> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.iter().find(|u| f(u)).cloned()
    }
}

impl Directory for MemDirectory {
    fn user(
        &self,
        id: &str,
    ) -> Result<Option<User>> {
        Ok(self.find(|u| u.id == id))
    }

    fn first_active_with_role(
        &self,
        role: &str,
        department_id: &str,
    ) -> Result<Option<User>> {
        Ok(self.find(|u| u.is_active && u.has_role(role) && u.belongs_to(department_id)))
    }

    fn first_department_admin(
        &self,
        department_id: &str,
    ) -> Result<Option<User>> {
        Ok(self.find(|u| u.is_active && u.has_role(ROLE_DEPARTMENT_ADMIN) && u.belongs_to(department_id)))
    }

    fn admins_for(
        &self,
        department_id: &str,
    ) -> Result<Vec<User>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .iter()
            .filter(|u| u.is_active && (u.has_role(ROLE_SUPER_ADMIN) || (u.has_role(ROLE_DEPARTMENT_ADMIN) && u.belongs_to(department_id))))
            .cloned()
            .collect())
    }

    fn is_admin(
        &self,
        user_id: &str,
    ) -> Result<bool> {
        Ok(self.find(|u| u.id == user_id).map(|u| u.is_admin()).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> MemDirectory {
        let dir = MemDirectory::new();
        dir.add_user(User::new("clerk0", "Retired clerk").in_department("d1").with_role("clerk").inactive());
        dir.add_user(User::new("clerk1", "Clerk").in_department("d1").with_role("clerk"));
        dir.add_user(User::new("clerk2", "Other clerk").in_department("d2").with_role("clerk"));
        dir.add_user(User::new("hod1", "Head d1").in_department("d1").with_role(ROLE_DEPARTMENT_ADMIN));
        dir.add_user(User::new("hod2", "Head d2").in_department("d2").with_role(ROLE_DEPARTMENT_ADMIN));
        dir.add_user(User::new("root", "Super").with_role(ROLE_SUPER_ADMIN));
        dir
    }

    #[test]
    fn test_role_lookup_skips_inactive_and_other_departments() {
        let dir = directory();
        assert_eq!(dir.first_active_with_role("clerk", "d1").unwrap().map(|u| u.id), Some("clerk1".to_string()));
        assert_eq!(dir.first_active_with_role("clerk", "d2").unwrap().map(|u| u.id), Some("clerk2".to_string()));
        assert!(dir.first_active_with_role("clerk", "d3").unwrap().is_none());
    }

    #[test]
    fn test_admins() {
        let dir = directory();
        assert_eq!(dir.first_department_admin("d2").unwrap().map(|u| u.id), Some("hod2".to_string()));
        let admins: Vec<_> = dir.admins_for("d1").unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(admins, vec!["hod1", "root"]);
        assert!(dir.is_admin("root").unwrap());
        assert!(!dir.is_admin("clerk1").unwrap());
        assert!(!dir.is_admin("nobody").unwrap());
    }
}
