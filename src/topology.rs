// Copyright 2025 Cowboy AI, LLC.

//! Topology aggregate
//!
//! The [`Topology`] collects resource descriptors for one deployment run,
//! enforcing the construction-time invariants: logical names are unique,
//! every cross-reference points at a declared descriptor of the right kind,
//! and export keys never collide. Once built and validated it is handed to
//! the reconciliation engine, which resolves the pending outputs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{TopologyError, TopologyResult};
use crate::output::{Output, Resolver};
use crate::resources::{DependencyEdge, ResourceDescriptor, ResourceKind, ResourceName};

/// Unique identifier for one deployment run's topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopologyId(Uuid);

impl TopologyId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TopologyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TopologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one deferred attribute of one resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputKey {
    pub resource: ResourceName,
    pub attribute: String,
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.attribute)
    }
}

struct PendingOutput {
    output: Output<String>,
    resolver: Resolver<String>,
}

/// Desired-state topology for one deployment run
///
/// Descriptors are declared once and never mutated afterwards; the engine
/// owns the live resources and their destruction.
pub struct Topology {
    id: TopologyId,
    descriptors: Vec<ResourceDescriptor>,
    index: HashMap<ResourceName, usize>,
    pending: HashMap<OutputKey, PendingOutput>,
    exports: BTreeMap<String, Output<String>>,
}

impl Topology {
    /// Create an empty topology with a fresh run identity
    pub fn new() -> Self {
        Self {
            id: TopologyId::new(),
            descriptors: Vec::new(),
            index: HashMap::new(),
            pending: HashMap::new(),
            exports: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> TopologyId {
        self.id
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    /// Declare a resource descriptor
    ///
    /// Fails fast on a duplicate logical name.
    pub fn declare(&mut self, descriptor: ResourceDescriptor) -> TopologyResult<()> {
        if self.index.contains_key(&descriptor.name) {
            return Err(TopologyError::DuplicateResource(descriptor.name.clone()));
        }

        debug!(
            resource = %descriptor.name,
            kind = %descriptor.kind(),
            "declared resource"
        );

        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Register interest in a deferred attribute of a declared resource
    ///
    /// Returns a shared [`Output`] that the engine will resolve after
    /// provisioning. Asking for the same attribute twice returns the same
    /// underlying output.
    pub fn expect_output(
        &mut self,
        resource: &ResourceName,
        attribute: impl Into<String>,
    ) -> TopologyResult<Output<String>> {
        if !self.index.contains_key(resource) {
            return Err(TopologyError::Validation(format!(
                "Cannot expect output of undeclared resource '{}'",
                resource
            )));
        }

        let key = OutputKey {
            resource: resource.clone(),
            attribute: attribute.into(),
        };

        if let Some(pending) = self.pending.get(&key) {
            return Ok(pending.output.clone());
        }

        let (output, resolver) = Output::pending();
        let shared = output.clone();
        self.pending.insert(key, PendingOutput { output, resolver });
        Ok(shared)
    }

    /// Export a named output for downstream consumption
    ///
    /// A second export under the same key is an error rather than a silent
    /// overwrite.
    pub fn export(&mut self, key: impl Into<String>, output: Output<String>) -> TopologyResult<()> {
        let key = key.into();
        if self.exports.contains_key(&key) {
            return Err(TopologyError::DuplicateExport(key));
        }
        debug!(export = %key, "exported output");
        self.exports.insert(key, output);
        Ok(())
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check referential integrity of the whole topology
    ///
    /// Every dependency edge must point at a declared descriptor whose kind
    /// matches the relation.
    pub fn validate(&self) -> TopologyResult<()> {
        for edge in self.edges() {
            let target = self.get(&edge.to).ok_or_else(|| TopologyError::UnknownReference {
                from: edge.from.clone(),
                to: edge.to.clone(),
            })?;

            let expected = edge.relation.expected_target_kind();
            if target.kind() != expected {
                return Err(TopologyError::ReferenceKindMismatch {
                    from: edge.from,
                    to: edge.to,
                    expected,
                    found: target.kind(),
                });
            }
        }

        info!(
            topology = %self.id,
            resources = self.descriptors.len(),
            "topology validated"
        );
        Ok(())
    }

    // ========================================================================
    // Resolution (engine side)
    // ========================================================================

    /// Complete a deferred attribute with its provisioned value
    pub fn resolve_output(
        &self,
        resource: &ResourceName,
        attribute: &str,
        value: impl Into<String>,
    ) -> TopologyResult<()> {
        let key = OutputKey {
            resource: resource.clone(),
            attribute: attribute.to_string(),
        };

        let pending = self
            .pending
            .get(&key)
            .ok_or_else(|| TopologyError::UnknownOutput {
                resource: resource.clone(),
                attribute: attribute.to_string(),
            })?;

        pending
            .resolver
            .resolve(value.into())
            .map_err(|_| TopologyError::OutputAlreadyResolved {
                resource: resource.clone(),
                attribute: attribute.to_string(),
            })?;

        debug!(output = %key, "resolved output");
        Ok(())
    }

    /// Keys of all attributes the engine is expected to resolve
    pub fn pending_outputs(&self) -> impl Iterator<Item = &OutputKey> {
        self.pending.keys()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a descriptor by logical name
    pub fn get(&self, name: &ResourceName) -> Option<&ResourceDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// All descriptors in declaration order
    pub fn descriptors(&self) -> &[ResourceDescriptor] {
        &self.descriptors
    }

    /// All typed dependency edges implied by the descriptors
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.descriptors
            .iter()
            .flat_map(|d| d.references())
            .collect()
    }

    /// Count descriptors of one kind
    pub fn count_by_kind(&self, kind: ResourceKind) -> usize {
        self.descriptors.iter().filter(|d| d.kind() == kind).count()
    }

    /// Named exports in key order
    pub fn exports(&self) -> &BTreeMap<String, Output<String>> {
        &self.exports
    }

    /// Get one exported output by key
    pub fn get_export(&self, key: &str) -> Option<&Output<String>> {
        self.exports.get(key)
    }

    /// Serialized hand-off payload for the reconciliation engine
    pub fn manifest(&self) -> serde_json::Value {
        serde_json::json!({
            "topology": self.id,
            "resources": self.descriptors,
            "exports": self.exports.keys().collect::<Vec<_>>(),
        })
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("id", &self.id)
            .field("resources", &self.descriptors.len())
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}
