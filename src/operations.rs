//! Built-in operation definitions embedded in the binary
//!
//! Lets users run `invoke -o kinesis-list-streams` instead of pointing at a
//! YAML file.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in operation YAML definitions
pub static BUILTIN_OPERATIONS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // AWS JSON 1.0
        m.insert(
            "apprunner-list-services",
            include_str!("../operations/apprunner-list-services.yaml"),
        );
        m.insert(
            "backup-gateway-list-gateways",
            include_str!("../operations/backup-gateway-list-gateways.yaml"),
        );

        // AWS JSON 1.1
        m.insert(
            "kinesis-list-streams",
            include_str!("../operations/kinesis-list-streams.yaml"),
        );
        m.insert(
            "dms-describe-endpoints",
            include_str!("../operations/dms-describe-endpoints.yaml"),
        );
        m.insert(
            "wafv2-list-web-acls",
            include_str!("../operations/wafv2-list-web-acls.yaml"),
        );
        m.insert(
            "shield-list-protections",
            include_str!("../operations/shield-list-protections.yaml"),
        );
        m.insert(
            "sso-admin-list-instances",
            include_str!("../operations/sso-admin-list-instances.yaml"),
        );

        // REST-JSON
        m.insert(
            "appsync-list-graphql-apis",
            include_str!("../operations/appsync-list-graphql-apis.yaml"),
        );
        m.insert(
            "cleanrooms-list-collaborations",
            include_str!("../operations/cleanrooms-list-collaborations.yaml"),
        );
        m.insert(
            "controltower-list-enabled-controls",
            include_str!("../operations/controltower-list-enabled-controls.yaml"),
        );
        m.insert(
            "robomaker-list-robot-applications",
            include_str!("../operations/robomaker-list-robot-applications.yaml"),
        );

        m
    });

/// Get a built-in operation by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_OPERATIONS.get(name).copied()
}

/// Check if a name is a built-in operation
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_OPERATIONS.contains_key(name)
}

/// List all built-in operation names, sorted
pub fn list_builtin() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTIN_OPERATIONS.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_builtin() {
        assert!(get_builtin("apprunner-list-services").is_some());
        assert!(get_builtin("unknown").is_none());
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin("wafv2-list-web-acls"));
        assert!(!is_builtin("wafv2"));
    }

    #[test]
    fn test_list_builtin_is_sorted() {
        let names = list_builtin();
        assert_eq!(names.len(), BUILTIN_OPERATIONS.len());
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_builtin_names_match_yaml() {
        for (name, yaml) in BUILTIN_OPERATIONS.iter() {
            assert!(
                yaml.contains(&format!("name: {name}\n")),
                "{name} does not match its YAML name"
            );
        }
    }
}
