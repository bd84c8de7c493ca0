//! In-memory Model Store: objects as graph nodes, links as labelled edges.
//!
//! Every write is validated against the schema handed over at construction.
//! Link insertion is insert-if-absent: attempting an existing
//! (association, source, target) triple reports `Duplicate` and changes
//! nothing.

use crate::domain::ports::{AttrValue, LinkOutcome, ModelStore, ObjectHandle};
use crate::domain::schema::Schema;
use anyhow::{Result, anyhow, bail};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ObjectRecord {
    name: String,
    class_name: String,
    attributes: BTreeMap<String, AttrValue>,
}

#[derive(Debug, Clone)]
struct LinkRecord {
    association: String,
}

pub struct InMemoryModelStore {
    schema: Schema,
    graph: DiGraph<ObjectRecord, LinkRecord>,
    by_name: HashMap<String, NodeIndex>,
    by_class: HashMap<String, Vec<NodeIndex>>,
}

impl InMemoryModelStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            graph: DiGraph::new(),
            by_name: HashMap::new(),
            by_class: HashMap::new(),
        }
    }

    /// A store initialized with the fixed metamodel schema.
    pub fn with_metamodel() -> Self {
        Self::new(Schema::metamodel())
    }

    fn index(&self, handle: ObjectHandle) -> Result<NodeIndex> {
        let idx = NodeIndex::new(handle.0 as usize);
        if self.graph.node_weight(idx).is_none() {
            bail!("unknown object handle {}", handle.0);
        }
        Ok(idx)
    }

    // ---- read accessors (tests and driver summary) ----

    pub fn object_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn object_name(&self, handle: ObjectHandle) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(handle.0 as usize))
            .map(|o| o.name.as_str())
    }

    pub fn object_class(&self, handle: ObjectHandle) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(handle.0 as usize))
            .map(|o| o.class_name.as_str())
    }

    pub fn attribute(&self, handle: ObjectHandle, name: &str) -> Option<&AttrValue> {
        self.graph
            .node_weight(NodeIndex::new(handle.0 as usize))
            .and_then(|o| o.attributes.get(name))
    }

    /// Objects of a class, in creation order.
    pub fn objects_of(&self, class_name: &str) -> Vec<ObjectHandle> {
        self.by_class
            .get(class_name)
            .map(|v| v.iter().map(|i| ObjectHandle(i.index() as u32)).collect())
            .unwrap_or_default()
    }

    /// Outgoing link targets for one association.
    pub fn linked(&self, source: ObjectHandle, association: &str) -> Vec<ObjectHandle> {
        let idx = NodeIndex::new(source.0 as usize);
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().association == association)
            .map(|e| ObjectHandle(e.target().index() as u32))
            .collect()
    }

    pub fn has_link(&self, source: ObjectHandle, target: ObjectHandle, association: &str) -> bool {
        let (s, t) = (
            NodeIndex::new(source.0 as usize),
            NodeIndex::new(target.0 as usize),
        );
        self.graph
            .edges_connecting(s, t)
            .any(|e| e.weight().association == association)
    }

    /// Per-class instance counts, classes in schema order filtered to
    /// non-empty, sorted by name.
    pub fn class_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .schema
            .classes()
            .filter_map(|c| {
                let n = self.count_instances(c);
                (n > 0).then(|| (c.to_string(), n))
            })
            .collect();
        counts.sort();
        counts
    }
}

impl ModelStore for InMemoryModelStore {
    fn create_object(&mut self, name: Option<&str>, class_name: &str) -> Result<ObjectHandle> {
        if !self.schema.has_class(class_name) {
            bail!("class {class_name} is not part of the schema");
        }
        let name = match name {
            Some(n) => {
                if self.by_name.contains_key(n) {
                    bail!("object name {n} already taken");
                }
                n.to_string()
            }
            None => {
                // Fresh store-assigned name off the class counter.
                let mut ordinal = self.count_instances(class_name) + 1;
                loop {
                    let candidate = format!("{class_name}{ordinal}");
                    if !self.by_name.contains_key(&candidate) {
                        break candidate;
                    }
                    ordinal += 1;
                }
            }
        };

        let idx = self.graph.add_node(ObjectRecord {
            name: name.clone(),
            class_name: class_name.to_string(),
            attributes: BTreeMap::new(),
        });
        self.by_name.insert(name, idx);
        self.by_class
            .entry(class_name.to_string())
            .or_default()
            .push(idx);
        Ok(ObjectHandle(idx.index() as u32))
    }

    fn object_by_name(&self, name: &str) -> Option<ObjectHandle> {
        self.by_name
            .get(name)
            .map(|idx| ObjectHandle(idx.index() as u32))
    }

    fn set_attribute(
        &mut self,
        object: ObjectHandle,
        attribute: &str,
        value: AttrValue,
    ) -> Result<()> {
        if !self.schema.has_attribute(attribute) {
            bail!("attribute {attribute} is not part of the schema");
        }
        let idx = self.index(object)?;
        let record = self
            .graph
            .node_weight_mut(idx)
            .ok_or_else(|| anyhow!("unknown object handle {}", object.0))?;
        record.attributes.insert(attribute.to_string(), value);
        Ok(())
    }

    fn create_link(&mut self, association: &str, ends: [ObjectHandle; 2]) -> Result<LinkOutcome> {
        if !self.schema.has_association(association) {
            bail!("association {association} is not part of the schema");
        }
        let source = self.index(ends[0])?;
        let target = self.index(ends[1])?;
        let exists = self
            .graph
            .edges_connecting(source, target)
            .any(|e| e.weight().association == association);
        if exists {
            return Ok(LinkOutcome::Duplicate);
        }
        self.graph.add_edge(
            source,
            target,
            LinkRecord {
                association: association.to_string(),
            },
        );
        Ok(LinkOutcome::Created)
    }

    fn count_instances(&self, class_name: &str) -> usize {
        self.by_class.get(class_name).map_or(0, Vec::len)
    }
}
