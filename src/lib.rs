//! Declarative cloud topology builder
//!
//! This crate constructs an in-memory graph of desired-state resource
//! descriptors (network, security groups, load balancers, registries,
//! Fargate services) for the web/api deployment. It performs no provisioning
//! itself: a validated [`topology::Topology`] is handed to an external
//! [`engine::ReconciliationEngine`], which diffs it against live cloud state
//! and resolves the deferred [`output::Output`] values (such as load balancer
//! DNS names) once provisioning completes.

pub mod config;
pub mod engine;
pub mod errors;
pub mod output;
pub mod resources;
pub mod stack;
pub mod tags;
pub mod topology;

// Re-export commonly used types
pub use config::DeploymentConfig;
pub use engine::{ApplyReport, ReconciliationEngine};
pub use errors::{TopologyError, TopologyResult};
pub use output::{Output, Resolver};
pub use resources::{
    CidrBlock, DependencyEdge, EdgeRelation, ResourceDescriptor, ResourceKind, ResourceName,
    ResourceSpec,
};
pub use stack::{declare_web_api_stack, default_base_tags};
pub use tags::TagSet;
pub use topology::{Topology, TopologyId};
