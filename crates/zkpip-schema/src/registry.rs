//! # Schema Registry
//!
//! Schemas are registered under their own `$id` (the canonical id). Aliases
//! are lookup-only names that resolve to the same compiled validator; no
//! schema is ever copied under a second id.
//!
//! ## Invariants
//!
//! - Every registered document has a non-empty `$id`, unique across the
//!   registry.
//! - Every alias resolves to exactly one canonical id, and no alias equals
//!   another schema's canonical id.
//! - Each schema is compiled once, at [`SchemaRegistryBuilder::build`], with
//!   `$ref` resolution against every registered document.
//!
//! Violations are registration-time errors.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::{catalog, document};
use crate::error::{SchemaRegistryError, SchemaValidationError, SchemaViolation};

/// What the registry knows about one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    pub canonical_id: String,
    pub aliases: BTreeSet<String>,
    /// Where the document came from (usually its filename).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

/// Resolves `$ref` URIs against the registered documents, by canonical id
/// or alias.
struct RegistryRetriever {
    documents: HashMap<String, Value>,
}

impl jsonschema::Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        self.documents
            .get(uri_str)
            .cloned()
            .ok_or_else(|| format!("schema not registered for URI: {uri_str}").into())
    }
}

/// Collects schemas and aliases, then compiles them into a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    documents: BTreeMap<String, (Value, SchemaEntry)>,
    aliases: BTreeMap<String, String>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under its `$id`. Returns the canonical id.
    pub fn register(
        &mut self,
        document: Value,
        document_id: Option<&str>,
    ) -> Result<String, SchemaRegistryError> {
        let label = document_id.unwrap_or("<inline>").to_string();
        let id = document
            .get("$id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SchemaRegistryError::MissingId {
                document: label.clone(),
            })?
            .to_string();

        if let Some((_, existing)) = self.documents.get(&id) {
            return Err(SchemaRegistryError::DuplicateId {
                first: existing.document_id.clone().unwrap_or_else(|| "<inline>".into()),
                id,
            });
        }
        if self.aliases.contains_key(&id) {
            return Err(SchemaRegistryError::NameShadowed { name: id });
        }

        let entry = SchemaEntry {
            canonical_id: id.clone(),
            aliases: BTreeSet::new(),
            document_id: document_id.map(str::to_string),
        };
        tracing::debug!(schema_id = %id, document = %label, "registered schema");
        self.documents.insert(id.clone(), (document, entry));
        Ok(id)
    }

    /// Add a lookup-only alias. Re-adding the same pair is a no-op.
    pub fn add_alias(&mut self, canonical: &str, alias: &str) -> Result<(), SchemaRegistryError> {
        if !self.documents.contains_key(canonical) {
            return Err(SchemaRegistryError::UnknownCanonical {
                alias: alias.to_string(),
                canonical: canonical.to_string(),
            });
        }
        if alias == canonical {
            return Ok(());
        }
        if self.documents.contains_key(alias) {
            return Err(SchemaRegistryError::NameShadowed {
                name: alias.to_string(),
            });
        }
        match self.aliases.get(alias) {
            Some(existing) if existing == canonical => return Ok(()),
            Some(existing) => {
                return Err(SchemaRegistryError::AliasConflict {
                    alias: alias.to_string(),
                    existing: existing.clone(),
                    requested: canonical.to_string(),
                })
            }
            None => {}
        }
        self.aliases.insert(alias.to_string(), canonical.to_string());
        if let Some((_, entry)) = self.documents.get_mut(canonical) {
            entry.aliases.insert(alias.to_string());
        }
        Ok(())
    }

    /// Whether a canonical id is registered.
    pub fn contains(&self, canonical: &str) -> bool {
        self.documents.contains_key(canonical)
    }

    /// Compile every schema once.
    pub fn build(self) -> Result<SchemaRegistry, SchemaRegistryError> {
        let mut all: HashMap<String, Value> = self
            .documents
            .iter()
            .map(|(id, (doc, _))| (id.clone(), doc.clone()))
            .collect();
        for (alias, canonical) in &self.aliases {
            if let Some((doc, _)) = self.documents.get(canonical) {
                all.insert(alias.clone(), doc.clone());
            }
        }

        let mut schemas = BTreeMap::new();
        for (id, (document, entry)) in self.documents {
            let retriever = RegistryRetriever {
                documents: all.clone(),
            };
            let validator = jsonschema::options()
                .with_draft(jsonschema::Draft::Draft202012)
                .with_retriever(retriever)
                .build(&document)
                .map_err(|e| SchemaRegistryError::Compile {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
            schemas.insert(
                id,
                CompiledSchema {
                    entry,
                    document,
                    validator,
                },
            );
        }
        Ok(SchemaRegistry {
            schemas,
            aliases: self.aliases,
        })
    }
}

struct CompiledSchema {
    entry: SchemaEntry,
    document: Value,
    validator: jsonschema::Validator,
}

/// Compiled schemas, addressable by canonical id or alias.
pub struct SchemaRegistry {
    schemas: BTreeMap<String, CompiledSchema>,
    aliases: BTreeMap<String, String>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases.len())
            .finish()
    }
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Load every `*.schema.json` under `dir`, install the core aliases and
    /// compile. Fails if any core MVS schema is absent.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaRegistryError> {
        let dir = dir.as_ref();
        let mut builder = SchemaRegistryBuilder::new();
        for path in document::schema_files(dir)? {
            let doc = document::load_document(&path)?;
            let label = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .display()
                .to_string();
            builder.register(doc, Some(&label))?;
        }
        let missing = catalog::missing_core(&builder);
        if !missing.is_empty() {
            return Err(SchemaRegistryError::MissingCoreSchema { missing });
        }
        catalog::install_aliases(&mut builder)?;
        let registry = builder.build()?;
        tracing::debug!(dir = %dir.display(), schemas = registry.len(), "schema registry loaded");
        Ok(registry)
    }

    /// Canonical id for a canonical id or alias.
    pub fn canonical_id(&self, id_or_alias: &str) -> Option<&str> {
        if let Some((id, _)) = self.schemas.get_key_value(id_or_alias) {
            return Some(id.as_str());
        }
        self.aliases.get(id_or_alias).map(String::as_str)
    }

    /// The compiled validator for a canonical id or alias.
    pub fn resolve(&self, id_or_alias: &str) -> Option<&jsonschema::Validator> {
        self.compiled(id_or_alias).map(|c| &c.validator)
    }

    /// The registered document for a canonical id or alias.
    pub fn document(&self, id_or_alias: &str) -> Option<&Value> {
        self.compiled(id_or_alias).map(|c| &c.document)
    }

    /// Every schema entry, ordered by canonical id.
    pub fn entries(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.schemas.values().map(|c| &c.entry)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate a document, collecting every violation.
    pub fn validate(&self, id_or_alias: &str, value: &Value) -> Result<(), SchemaValidationError> {
        let compiled = self
            .compiled(id_or_alias)
            .ok_or_else(|| SchemaValidationError::UnknownSchema(id_or_alias.to_string()))?;
        let schema_id = &compiled.entry.canonical_id;
        let violations: Vec<SchemaViolation> = compiled
            .validator
            .iter_errors(value)
            .map(|err| SchemaViolation {
                schema_id: schema_id.clone(),
                instance_path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::Invalid {
                schema_id: schema_id.clone(),
                violations,
            })
        }
    }

    fn compiled(&self, id_or_alias: &str) -> Option<&CompiledSchema> {
        let id = self.canonical_id(id_or_alias)?;
        self.schemas.get(id)
    }
}
