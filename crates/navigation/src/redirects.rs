use std::collections::HashMap;

use motorhub_auth::Role;

use crate::NavigationError;

/// Public root, used when no dashboard applies.
pub const PUBLIC_ROOT: &str = "/";

/// Where each role lands when it hits a route it may not see.
///
/// Construction requires an entry for every [`Role`], so an unmapped role is
/// a load-time error instead of a silent redirect to the public root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRedirectMap {
    paths: HashMap<Role, String>,
}

impl DashboardRedirectMap {
    pub fn new(paths: HashMap<Role, String>) -> Result<Self, NavigationError> {
        for role in Role::ALL {
            match paths.get(&role) {
                None => return Err(NavigationError::UnmappedRole(role)),
                Some(path) if !path.starts_with('/') => {
                    return Err(NavigationError::InvalidPath(path.clone()));
                }
                Some(_) => {}
            }
        }
        Ok(Self { paths })
    }

    pub fn landing_path(&self, role: Role) -> &str {
        self.paths.get(&role).map(String::as_str).unwrap_or(PUBLIC_ROOT)
    }
}

impl Default for DashboardRedirectMap {
    fn default() -> Self {
        let paths = HashMap::from([
            (Role::Customer, "/dashboard".to_string()),
            (Role::Vendor, "/vendor/dashboard".to_string()),
            (Role::Admin, "/admin/dashboard".to_string()),
        ]);
        Self { paths }
    }
}
