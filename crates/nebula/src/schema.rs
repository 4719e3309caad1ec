//! Input document classification and import.
//!
//! Two document shapes are accepted. A Gephi export carries an `options` block, and its nodes
//! may hold a pre-assigned `modularity_class`; everything else is read as the native shape.
//! Classification never fails: a document that does not look like a Gephi export is treated as
//! native, and only the import step can reject it.

use crate::error::{Error, Result};
use crate::model::{EdgeAttributes, GraphAttributes, NebulaGraph, NodeAttributes, new_graph};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    Gephi,
    Native,
}

impl Schema {
    pub fn as_str(self) -> &'static str {
        match self {
            Schema::Gephi => "gephi",
            Schema::Native => "native",
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a raw document.
///
/// A document is a Gephi export when its `nodes` and `edges` arrays are both non-empty, it has
/// an `options` field, the first node has a truthy `key` and `attributes`, and the first edge
/// has a truthy `key`, `source`, `target` and `attributes`.
pub fn detect_schema(doc: &Value) -> Schema {
    let schema = if looks_like_gephi(doc) {
        Schema::Gephi
    } else {
        Schema::Native
    };
    tracing::debug!(schema = schema.as_str(), "classified input document");
    schema
}

fn looks_like_gephi(doc: &Value) -> bool {
    let (Some(nodes), Some(edges)) = (
        doc.get("nodes").and_then(Value::as_array),
        doc.get("edges").and_then(Value::as_array),
    ) else {
        return false;
    };
    let (Some(node), Some(edge)) = (nodes.first(), edges.first()) else {
        return false;
    };
    if doc.get("options").is_none() {
        return false;
    }
    ["key", "attributes"]
        .iter()
        .all(|field| truthy(node.get(field)))
        && ["key", "source", "target", "attributes"]
            .iter()
            .all(|field| truthy(edge.get(field)))
}

/// JavaScript truthiness of a JSON value.
fn truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// A classified input document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Gephi(GephiDocument),
    Native(NativeDocument),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GephiDocument {
    #[serde(default)]
    pub attributes: Option<DocumentAttributes>,
    #[serde(default)]
    pub options: Option<DocumentOptions>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NativeDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentAttributes {
    #[serde(default)]
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    #[serde(default)]
    pub multi: Option<bool>,
    #[serde(default)]
    pub allow_self_loops: Option<bool>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeRecord {
    #[serde(deserialize_with = "de_key")]
    pub key: String,
    #[serde(default)]
    pub attributes: Option<NodeRecordAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeRecordAttributes {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de_class")]
    pub modularity_class: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRecord {
    #[serde(default, deserialize_with = "de_opt_key")]
    pub key: Option<String>,
    #[serde(deserialize_with = "de_key")]
    pub source: String,
    #[serde(deserialize_with = "de_key")]
    pub target: String,
    #[serde(default)]
    pub attributes: Option<EdgeRecordAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EdgeRecordAttributes {
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

fn key_from_value<E: serde::de::Error>(v: Value) -> std::result::Result<String, E> {
    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "expected a string or number key, got {other}"
        ))),
    }
}

fn de_key<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    key_from_value(Value::deserialize(d)?)
}

fn de_opt_key<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(v) => key_from_value(v).map(Some),
    }
}

/// Classes arrive as numbers or numeric strings; anything else is treated as unassigned.
fn de_class<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<i64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

impl Document {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::import(e.to_string()))?;
        Self::from_value(value)
    }

    /// Classifies `value` and decodes it into the matching variant.
    pub fn from_value(value: Value) -> Result<Self> {
        for field in ["nodes", "edges"] {
            if !value.get(field).is_some_and(Value::is_array) {
                return Err(Error::import(format!("missing required field `{field}`")));
            }
        }
        match detect_schema(&value) {
            Schema::Gephi => serde_json::from_value(value)
                .map(Document::Gephi)
                .map_err(|e| Error::import(e.to_string())),
            Schema::Native => serde_json::from_value(value)
                .map(Document::Native)
                .map_err(|e| Error::import(e.to_string())),
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            Document::Gephi(_) => Schema::Gephi,
            Document::Native(_) => Schema::Native,
        }
    }

    /// Builds the canonical graph. Duplicate node keys and edges with unknown endpoints fail.
    pub fn into_graph(self) -> Result<NebulaGraph> {
        let (attributes, nodes, edges) = match self {
            Document::Gephi(doc) => {
                if let Some(opts) = &doc.options {
                    tracing::debug!(
                        multi = ?opts.multi,
                        allow_self_loops = ?opts.allow_self_loops,
                        kind = ?opts.kind,
                        "ignoring document graph options; graphs are always directed multigraphs"
                    );
                }
                let creator = doc.attributes.and_then(|a| a.creator);
                (
                    GraphAttributes {
                        creator,
                        ..GraphAttributes::default()
                    },
                    doc.nodes,
                    doc.edges,
                )
            }
            Document::Native(doc) => (GraphAttributes::default(), doc.nodes, doc.edges),
        };

        let explicit_keys: FxHashSet<String> =
            edges.iter().filter_map(|e| e.key.clone()).collect();
        let mut graph = new_graph();
        graph.set_attrs(attributes);
        for node in nodes {
            let a = node.attributes.unwrap_or_default();
            graph.add_node(
                node.key,
                NodeAttributes {
                    x: a.x.unwrap_or(0.0),
                    y: a.y.unwrap_or(0.0),
                    size: a.size.unwrap_or(0.0),
                    label: a.label.unwrap_or_default(),
                    color: a.color,
                    modularity_class: a.modularity_class,
                    ..NodeAttributes::default()
                },
            )?;
        }
        for (i, edge) in edges.into_iter().enumerate() {
            let key = match edge.key {
                Some(key) => key,
                None => generated_edge_key(&graph, &explicit_keys, i),
            };
            let a = edge.attributes.unwrap_or_default();
            graph.add_edge(
                key,
                &edge.source,
                &edge.target,
                EdgeAttributes {
                    size: a.size,
                    weight: a.weight,
                },
            )?;
        }
        Ok(graph)
    }
}

fn generated_edge_key(graph: &NebulaGraph, reserved: &FxHashSet<String>, index: usize) -> String {
    let mut key = format!("e{index}");
    while graph.has_edge(&key) || reserved.contains(&key) {
        key.push('_');
    }
    key
}

/// Parses, classifies and imports a document in one step.
pub fn import(value: Value) -> Result<(Schema, NebulaGraph)> {
    let doc = Document::from_value(value)?;
    let schema = doc.schema();
    Ok((schema, doc.into_graph()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gephi_doc() -> Value {
        json!({
            "attributes": { "creator": "Gephi" },
            "options": { "multi": false, "allowSelfLoops": true, "type": "directed" },
            "nodes": [
                { "key": "1", "attributes": { "label": "Myriel", "modularity_class": 0 } },
                { "key": "2", "attributes": { "label": "Napoleon", "modularity_class": "3" } }
            ],
            "edges": [
                { "key": "0", "source": "2", "target": "1", "attributes": { "weight": 1.0 } }
            ]
        })
    }

    #[test]
    fn gephi_export_is_detected() {
        assert_eq!(detect_schema(&gephi_doc()), Schema::Gephi);
    }

    #[test]
    fn missing_options_falls_back_to_native() {
        let mut doc = gephi_doc();
        doc.as_object_mut().unwrap().remove("options");
        assert_eq!(detect_schema(&doc), Schema::Native);
    }

    #[test]
    fn falsy_first_edge_key_falls_back_to_native() {
        let mut doc = gephi_doc();
        doc["edges"][0]["key"] = json!("");
        assert_eq!(detect_schema(&doc), Schema::Native);
        doc["edges"][0]["key"] = json!(0);
        assert_eq!(detect_schema(&doc), Schema::Native);
    }

    #[test]
    fn empty_arrays_are_native() {
        let doc = json!({ "options": {}, "nodes": [], "edges": [] });
        assert_eq!(detect_schema(&doc), Schema::Native);
    }

    #[test]
    fn non_object_documents_are_native() {
        assert_eq!(detect_schema(&json!(42)), Schema::Native);
        assert_eq!(detect_schema(&json!(null)), Schema::Native);
    }

    #[test]
    fn gephi_classes_accept_numbers_and_numeric_strings() {
        let (schema, g) = import(gephi_doc()).unwrap();
        assert_eq!(schema, Schema::Gephi);
        assert_eq!(g.node("1").unwrap().modularity_class, Some(0));
        assert_eq!(g.node("2").unwrap().modularity_class, Some(3));
        assert_eq!(g.attrs().creator.as_deref(), Some("Gephi"));
        assert_eq!(g.edge("0").unwrap().weight, Some(1.0));
    }

    #[test]
    fn missing_nodes_is_an_import_error() {
        let err = import(json!({ "edges": [] })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "graph import failed: missing required field `nodes`"
        );
    }

    #[test]
    fn edges_without_keys_get_generated_keys() {
        let doc = json!({
            "nodes": [{ "key": "a" }, { "key": "b" }],
            "edges": [{ "source": "a", "target": "b" }, { "key": "e0", "source": "b", "target": "a" }]
        });
        let (_, g) = import(doc).unwrap();
        assert_eq!(g.edge_keys(), vec!["e0_", "e0"]);
    }

    #[test]
    fn numeric_keys_are_stringified() {
        let doc = json!({
            "nodes": [{ "key": 1 }, { "key": 2 }],
            "edges": [{ "key": 7, "source": 1, "target": 2 }]
        });
        let (_, g) = import(doc).unwrap();
        assert_eq!(g.node_ids(), vec!["1", "2"]);
        assert_eq!(g.edge_endpoints("7"), Some(("1", "2")));
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let doc = json!({
            "nodes": [{ "key": "a" }],
            "edges": [{ "key": "e", "source": "a", "target": "ghost" }]
        });
        assert!(matches!(import(doc), Err(Error::Graph(_))));
    }
}
