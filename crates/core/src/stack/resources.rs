//! Logical resource set with identity-based deduplication.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{Result, StackError};

/// One declared resource: a logical id, a type and its properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub logical_id: String,
    pub resource_type: String,
    pub properties: Value,
}

impl Resource {
    pub fn new(logical_id: &str, resource_type: &str, properties: Value) -> Self {
        Self {
            logical_id: logical_id.to_string(),
            resource_type: resource_type.to_string(),
            properties,
        }
    }
}

/// Insertion-ordered resources keyed by logical id.
///
/// Declaring the same resource twice is a no-op; declaring a different
/// resource under an existing id is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `resource`. Returns `true` when it was not already present.
    pub fn insert(&mut self, resource: Resource) -> Result<bool> {
        match self.get(&resource.logical_id) {
            Some(existing) if *existing == resource => Ok(false),
            Some(_) => Err(StackError::DuplicateResource(resource.logical_id)),
            None => {
                self.resources.push(resource);
                Ok(true)
            }
        }
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn logical_ids(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.logical_id.as_str()).collect()
    }

    /// Template document: `{"Resources": {id: {"Type", "Properties"}}}`.
    ///
    /// Object keys are sorted, so equal sets always render identically.
    pub fn to_template(&self) -> Value {
        let mut resources = Map::new();
        for resource in &self.resources {
            let mut entry = Map::new();
            entry.insert(
                "Type".to_string(),
                Value::String(resource.resource_type.clone()),
            );
            entry.insert("Properties".to_string(), resource.properties.clone());
            resources.insert(resource.logical_id.clone(), Value::Object(entry));
        }
        let mut template = Map::new();
        template.insert("Resources".to_string(), Value::Object(resources));
        Value::Object(template)
    }
}
