//! Search index templates.
//!
//! A template is an arbitrary nested JSON document (settings, analyzers,
//! multi-fields, nested properties). It is carried as-is so that embedding it
//! in a pipeline document and parsing it back yields the same document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{PipelineError, Result};
use crate::schema::{FieldType, ModelType};

/// Search engine field types derived from model field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFieldType {
    Keyword,
    Text,
    Boolean,
}

impl SearchFieldType {
    /// Search type for a declared model field.
    ///
    /// Enums map to `text` even though the API bounds their values; exact-match
    /// filtering on them would need `keyword`.
    pub fn for_field(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::String => SearchFieldType::Text,
            FieldType::Boolean => SearchFieldType::Boolean,
            FieldType::Enum(_) => SearchFieldType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchFieldType::Keyword => "keyword",
            SearchFieldType::Text => "text",
            SearchFieldType::Boolean => "boolean",
        }
    }
}

/// Index template handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct IndexTemplate {
    document: Value,
}

impl IndexTemplate {
    /// Wraps a template document.
    ///
    /// The document must be an object; `mappings` and `mappings.properties`,
    /// when present, must be objects too.
    pub fn from_value(document: Value) -> Result<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| invalid("template must be a JSON object"))?;
        if let Some(mappings) = root.get("mappings") {
            let mappings = mappings
                .as_object()
                .ok_or_else(|| invalid("'mappings' must be an object"))?;
            if let Some(properties) = mappings.get("properties") {
                let properties = properties
                    .as_object()
                    .ok_or_else(|| invalid("'mappings.properties' must be an object"))?;
                if let Some((name, _)) = properties.iter().find(|(_, p)| !p.is_object()) {
                    return Err(invalid(&format!("property '{}' must be an object", name)));
                }
            }
        }
        Ok(Self { document })
    }

    /// Builds the template for `model`: one shard, no replicas, `id` as an
    /// exact-match keyword and every declared field typed after its model type.
    pub fn for_model(model: &ModelType) -> Self {
        let mut properties = Map::new();
        properties.insert("id".to_string(), type_only(SearchFieldType::Keyword));
        for field in &model.fields {
            properties.insert(
                field.name.clone(),
                type_only(SearchFieldType::for_field(&field.field_type)),
            );
        }
        Self {
            document: json!({
                "settings": { "number_of_shards": 1, "number_of_replicas": 0 },
                "mappings": { "properties": properties },
            }),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Top-level field mappings, if the template declares any.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.document
            .get("mappings")?
            .get("properties")?
            .as_object()
    }

    /// Declared `type` of a top-level field.
    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.properties()?.get(name)?.get("type")?.as_str()
    }

    /// Sets the `type` of a top-level field, keeping any other attributes.
    pub fn with_property(mut self, name: &str, field_type: SearchFieldType) -> Self {
        if let Some(properties) = self.properties_mut() {
            let entry = properties
                .entry(name.to_string())
                .or_insert_with(|| json!({}));
            if let Some(mapping) = entry.as_object_mut() {
                mapping.insert("type".to_string(), json!(field_type.as_str()));
            }
        }
        self
    }

    /// Drops a top-level field.
    pub fn without_property(mut self, name: &str) -> Self {
        if let Some(properties) = self.properties_mut() {
            properties.remove(name);
        }
        self
    }

    fn properties_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.document
            .as_object_mut()?
            .entry("mappings")
            .or_insert_with(|| json!({}))
            .as_object_mut()?
            .entry("properties")
            .or_insert_with(|| json!({}))
            .as_object_mut()
    }

    /// Reports every way the top-level field types disagree with `model`.
    /// Attributes other than `type` (analyzers, multi-fields) are not compared.
    pub fn mismatches(&self, model: &ModelType) -> Vec<String> {
        let expected = Self::for_model(model);
        let empty = Map::new();
        let actual = self.properties().unwrap_or(&empty);
        let mut problems = Vec::new();

        for name in expected.properties().unwrap_or(&empty).keys() {
            let wanted = expected.field_type(name);
            match (actual.contains_key(name), self.field_type(name)) {
                (false, _) => problems.push(format!("missing field '{}'", name)),
                (true, None) => problems.push(format!("field '{}' has no type", name)),
                (true, Some(found)) if Some(found) != wanted => problems.push(format!(
                    "field '{}' is {}, expected {}",
                    name,
                    found,
                    wanted.unwrap_or_default()
                )),
                (true, Some(_)) => {}
            }
        }
        for name in actual.keys() {
            if expected.field_type(name).is_none() {
                problems.push(format!("unknown field '{}'", name));
            }
        }

        problems
    }

    /// Fails if the template is inconsistent with `model`.
    pub fn check_against(&self, model: &ModelType) -> Result<()> {
        let problems = self.mismatches(model);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MappingMismatch {
                model: model.name.clone(),
                details: problems.join(", "),
            })
        }
    }

    /// Pretty JSON, the form embedded in pipeline documents.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.document)
            .map_err(|e| PipelineError::Serialization(e.to_string()))
    }
}

impl TryFrom<Value> for IndexTemplate {
    type Error = PipelineError;

    fn try_from(document: Value) -> Result<Self> {
        Self::from_value(document)
    }
}

impl From<IndexTemplate> for Value {
    fn from(template: IndexTemplate) -> Self {
        template.document
    }
}

fn type_only(field_type: SearchFieldType) -> Value {
    json!({ "type": field_type.as_str() })
}

fn invalid(reason: &str) -> PipelineError {
    PipelineError::InvalidTemplate(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::todo_model;

    fn analyzed() -> Value {
        json!({
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 0,
                "analysis": {
                    "analyzer": {
                        "folded": {
                            "type": "custom",
                            "tokenizer": "standard",
                            "filter": ["lowercase", "asciifolding"]
                        }
                    }
                }
            },
            "mappings": {
                "properties": {
                    "id": { "type": "keyword" },
                    "content": {
                        "type": "text",
                        "analyzer": "folded",
                        "fields": { "raw": { "type": "keyword" } }
                    },
                    "done": { "type": "boolean" },
                    "priority": { "type": "text" }
                }
            }
        })
    }

    #[test]
    fn test_todo_template_fields() {
        let template = IndexTemplate::for_model(&todo_model());
        assert_eq!(
            template.as_value(),
            &json!({
                "settings": { "number_of_shards": 1, "number_of_replicas": 0 },
                "mappings": {
                    "properties": {
                        "id": { "type": "keyword" },
                        "done": { "type": "boolean" },
                        "content": { "type": "text" },
                        "priority": { "type": "text" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_nested_template_survives_deserialization() {
        let template: IndexTemplate = serde_json::from_value(analyzed()).unwrap();
        assert_eq!(template.as_value(), &analyzed());
        assert_eq!(serde_json::to_value(&template).unwrap(), analyzed());

        let back: IndexTemplate =
            serde_json::from_str(&template.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn test_malformed_templates_are_rejected() {
        for document in [
            json!([]),
            json!({ "mappings": [] }),
            json!({ "mappings": { "properties": "content" } }),
            json!({ "mappings": { "properties": { "content": "text" } } }),
        ] {
            assert!(
                matches!(
                    IndexTemplate::from_value(document.clone()),
                    Err(PipelineError::InvalidTemplate(_))
                ),
                "{} should be rejected",
                document
            );
            assert!(serde_json::from_value::<IndexTemplate>(document).is_err());
        }
    }

    #[test]
    fn test_consistent_template_has_no_mismatches() {
        let model = todo_model();
        assert!(IndexTemplate::for_model(&model).check_against(&model).is_ok());
    }

    #[test]
    fn test_extra_attributes_do_not_count_as_mismatches() {
        let template = IndexTemplate::from_value(analyzed()).unwrap();
        assert_eq!(template.mismatches(&todo_model()), Vec::<String>::new());
    }

    #[test]
    fn test_mismatches_are_reported() {
        let model = todo_model();
        let template = IndexTemplate::for_model(&model)
            .with_property("done", SearchFieldType::Text)
            .with_property("title", SearchFieldType::Text)
            .without_property("priority");

        let problems = template.mismatches(&model);
        assert_eq!(
            problems,
            vec![
                "field 'done' is text, expected boolean",
                "missing field 'priority'",
                "unknown field 'title'",
            ]
        );
        assert!(matches!(
            template.check_against(&model),
            Err(PipelineError::MappingMismatch { .. })
        ));
    }

    #[test]
    fn test_with_property_keeps_other_attributes() {
        let template = IndexTemplate::from_value(analyzed())
            .unwrap()
            .with_property("content", SearchFieldType::Keyword);
        assert_eq!(template.field_type("content"), Some("keyword"));
        assert_eq!(
            template.as_value()["mappings"]["properties"]["content"]["analyzer"],
            "folded"
        );
    }

    #[test]
    fn test_pretty_json_is_multiline() {
        let template = IndexTemplate::for_model(&todo_model());
        let json = template.to_json_pretty().unwrap();
        assert!(json.lines().count() > 10);
    }
}
