use std::collections::BTreeMap;

use crate::modules::tokens::schemas::{PropertiesData, RoleData};

/// Role grants and property changes collected from one block's events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRolesAndProperties {
    roles: BTreeMap<String, Vec<RoleData>>,
    properties: Vec<PropertiesData>,
}

impl TokenRolesAndProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_role(&mut self, token: &str, address: &str, role: &str, set: bool) {
        self.roles.entry(role.to_string()).or_default().push(RoleData {
            token: token.to_string(),
            address: address.to_string(),
            set,
        });
    }

    pub fn add_properties(&mut self, token: &str, properties: BTreeMap<String, bool>) {
        self.properties.push(PropertiesData {
            token: token.to_string(),
            properties,
        });
    }

    /// Roles grouped by role name.
    pub fn roles(&self) -> &BTreeMap<String, Vec<RoleData>> {
        &self.roles
    }

    pub fn all_tokens_with_properties(&self) -> &[PropertiesData] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_grouped_by_name() {
        let mut roles = TokenRolesAndProperties::new();
        roles.add_role("AAA-000001", "erd1a", "ESDTRoleLocalMint", true);
        roles.add_role("BBB-000001", "erd1b", "ESDTRoleLocalMint", false);
        roles.add_role("AAA-000001", "erd1a", "ESDTRoleLocalBurn", true);

        assert_eq!(roles.roles().len(), 2);
        let mint = &roles.roles()["ESDTRoleLocalMint"];
        assert_eq!(mint.len(), 2);
        assert_eq!(
            mint[1],
            RoleData {
                token: "BBB-000001".to_string(),
                address: "erd1b".to_string(),
                set: false,
            }
        );
    }

    #[test]
    fn test_properties_keep_arrival_order() {
        let mut roles = TokenRolesAndProperties::new();
        assert!(roles.is_empty());
        roles.add_properties("BBB-000001", BTreeMap::from([("canMint".to_string(), true)]));
        roles.add_properties("AAA-000001", BTreeMap::new());

        let tokens: Vec<&str> = roles
            .all_tokens_with_properties()
            .iter()
            .map(|data| data.token.as_str())
            .collect();
        assert_eq!(tokens, vec!["BBB-000001", "AAA-000001"]);
    }
}
