//! # Core MVS Catalog
//!
//! The minimum viable schema set every deployment ships, and the alias
//! names older producers still use for it. Each core schema is canonical
//! under `urn:zkpip:mvs:schemas:<name>.schema.json` and is also reachable
//! as `mvs/<name>`, `mvs.<name>`, its legacy filename, and its published
//! `https://zkpip.org/...` URL.

use crate::error::SchemaRegistryError;
use crate::registry::SchemaRegistryBuilder;

/// Short names of the core schemas.
pub const CORE_SCHEMAS: [&str; 6] = [
    "core",
    "proofBundle",
    "cir",
    "verification",
    "issue",
    "ecosystem",
];

/// Prefix of every core canonical id.
pub const CANONICAL_PREFIX: &str = "urn:zkpip:mvs:schemas:";

const PUBLISHED_BASE: &str = "https://zkpip.org/schemas/mvs/";

/// Canonical id for a core schema name.
pub fn canonical_id(name: &str) -> String {
    format!("{CANONICAL_PREFIX}{name}.schema.json")
}

/// Alias names for a core schema.
pub fn aliases_for(name: &str) -> Vec<String> {
    vec![
        format!("mvs/{name}"),
        format!("mvs.{name}"),
        format!("mvs.{name}.schema.json"),
        format!("{PUBLISHED_BASE}{name}.schema.json"),
    ]
}

/// Core canonical ids absent from the builder.
pub fn missing_core(builder: &SchemaRegistryBuilder) -> Vec<String> {
    CORE_SCHEMAS
        .iter()
        .map(|name| canonical_id(name))
        .filter(|id| !builder.contains(id))
        .collect()
}

/// Install the alias set for every registered core schema.
pub fn install_aliases(builder: &mut SchemaRegistryBuilder) -> Result<(), SchemaRegistryError> {
    for name in CORE_SCHEMAS {
        let canonical = canonical_id(name);
        if !builder.contains(&canonical) {
            continue;
        }
        for alias in aliases_for(name) {
            builder.add_alias(&canonical, &alias)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_ids() {
        assert_eq!(
            canonical_id("proofBundle"),
            "urn:zkpip:mvs:schemas:proofBundle.schema.json"
        );
    }

    #[test]
    fn aliases_are_unique_across_core() {
        let mut all: Vec<String> = CORE_SCHEMAS.iter().flat_map(|n| aliases_for(n)).collect();
        let before = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), before);
    }

    #[test]
    fn missing_core_lists_all_absent() {
        let mut b = SchemaRegistryBuilder::new();
        b.register(json!({"$id": canonical_id("core")}), None).unwrap();
        let missing = missing_core(&b);
        assert_eq!(missing.len(), 5);
        assert!(!missing.contains(&canonical_id("core")));
    }

    #[test]
    fn install_skips_unregistered() {
        let mut b = SchemaRegistryBuilder::new();
        b.register(json!({"$id": canonical_id("cir")}), None).unwrap();
        install_aliases(&mut b).unwrap();
        let reg = b.build().unwrap();
        assert_eq!(reg.canonical_id("mvs/cir"), Some(canonical_id("cir").as_str()));
        assert!(reg.canonical_id("mvs/core").is_none());
    }
}
