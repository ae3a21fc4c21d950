use serde::{Deserialize, Serialize};

use crate::front_matter::FrontMatter;

/// Which site options end up in `config.yaml`, and how their keys are renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsPolicy {
    /// Keys kept after renaming.
    pub whitelist: Vec<String>,
    /// Prefixes stripped from option names, e.g. `blogname` → `name`.
    pub strip_prefixes: Vec<String>,
}

impl Default for OptionsPolicy {
    fn default() -> Self {
        Self {
            whitelist: vec![
                "name".to_string(),
                "description".to_string(),
                "url".to_string(),
            ],
            strip_prefixes: vec!["site".to_string(), "blog".to_string()],
        }
    }
}

/// Flat site configuration mapping. Later options win on renamed-key clashes.
pub fn convert_options(options: &[(String, String)], policy: &OptionsPolicy) -> FrontMatter {
    let mut config = FrontMatter::new();
    for (name, value) in options {
        if name.starts_with('_') {
            continue;
        }
        let key = policy
            .strip_prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()))
            .unwrap_or(name);
        if policy.whitelist.iter().any(|allowed| allowed == key) {
            config.insert(key, value.as_str());
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefixes_are_stripped_and_whitelist_applied() {
        let options = opts(&[
            ("siteurl", "https://example.com"),
            ("blogname", "Example"),
            ("blogdescription", "Just a blog"),
            ("admin_email", "a@example.com"),
            ("_transient_x", "y"),
        ]);
        let config = convert_options(&options, &OptionsPolicy::default());
        assert_eq!(
            config.to_yaml().unwrap(),
            "url: https://example.com\nname: Example\ndescription: Just a blog\n"
        );
    }

    #[test]
    fn empty_whitelist_yields_empty_config() {
        let policy = OptionsPolicy {
            whitelist: Vec::new(),
            ..OptionsPolicy::default()
        };
        let config = convert_options(&opts(&[("blogname", "x")]), &policy);
        assert!(config.is_empty());
    }
}
