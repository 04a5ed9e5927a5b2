// File: greenlit-common/src/models/system.rs

use serde::{Deserialize, Serialize};

/// One purchasable system the bot gates access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDefinition {
    /// Exact name used in slash commands and by the payment provider.
    pub name: String,
    /// Allow-list file name, relative to the data directory.
    pub file: String,
    /// Discord role granted to buyers.
    pub role_id: String,
    /// Roblox group buyers join.
    pub group_id: String,
    /// Roblox Open Cloud key for the group; read from the environment.
    #[serde(skip)]
    pub group_api_key: Option<String>,
}

impl SystemDefinition {
    pub fn new(name: &str, file: &str, role_id: &str, group_id: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            role_id: role_id.to_string(),
            group_id: group_id.to_string(),
            group_api_key: None,
        }
    }

    /// Environment variable holding this system's group key, e.g. `APIKEY_SHIP_SYSTEM`.
    pub fn api_key_env_var(&self) -> String {
        let upper: String = self
            .name
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c.to_ascii_uppercase() })
            .collect();
        format!("APIKEY_{upper}")
    }

    pub fn group_url(&self) -> String {
        format!("https://www.roblox.com/groups/{}", self.group_id)
    }
}

/// The configured set of systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCatalog {
    systems: Vec<SystemDefinition>,
}

impl SystemCatalog {
    pub fn new(systems: Vec<SystemDefinition>) -> Self {
        Self { systems }
    }

    /// Case-insensitive lookup on the trimmed name.
    pub fn find(&self, name: &str) -> Option<&SystemDefinition> {
        let wanted = name.trim();
        self.systems
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemDefinition> {
        self.systems.iter()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Fills each system's `group_api_key` through `lookup` (normally `std::env::var`).
    pub fn with_group_keys<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for sys in &mut self.systems {
            sys.group_api_key = lookup(&sys.api_key_env_var()).filter(|k| !k.is_empty());
        }
        self
    }
}

impl Default for SystemCatalog {
    fn default() -> Self {
        Self::new(vec![
            SystemDefinition::new("Speeders", "whitelist_speeders.json", "1379224887071084620", "7498327"),
            SystemDefinition::new("Ship System", "whitelist_ship_system.json", "1379224887071084619", "33752338"),
            SystemDefinition::new("Lightsabers", "whitelist_lightsabers.json", "1379224887071084618", "32064664"),
            SystemDefinition::new("Blasters", "whitelist_blasters.json", "1379224887071084617", "15804186"),
            SystemDefinition::new("Utilities", "whitelist_utilities.json", "1379224887071084616", "16517603"),
            SystemDefinition::new("Morph GUI", "whitelist_morph_gui.json", "1379224887071084615", "33816091"),
        ])
    }
}
