// Copyright 2025 Cowboy AI, LLC.

//! Resource descriptors and their value objects
//!
//! A [`ResourceDescriptor`] is the declarative specification of one desired
//! cloud resource: a logical name, a typed spec, and a tag set. Descriptors
//! are immutable once constructed and carry no live-resource state.
//!
//! Cross-references between descriptors (a service naming its cluster, a
//! security group naming its VPC) are surfaced as typed [`DependencyEdge`]s
//! so the topology can check referential integrity before hand-off.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

use crate::tags::TagSet;

/// Validation errors for resource value objects
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Invalid resource name: {0}")]
    InvalidName(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0}")]
    InvalidPrefixLength(u8),

    #[error("Invalid port range: {from}-{to}")]
    InvalidPortRange { from: u16, to: u16 },

    #[error("Invalid container image reference: {0}")]
    InvalidImage(String),
}

// ============================================================================
// Identity Value Objects
// ============================================================================

/// Logical name of a resource, unique within a topology
///
/// # Invariants
/// - Non-empty, at most 255 characters
/// - ASCII alphanumerics plus `-`, `_`, and `.`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Result<Self, ResourceError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ResourceError::InvalidName(
                "Resource name cannot be empty".into(),
            ));
        }

        if name.len() > 255 {
            return Err(ResourceError::InvalidName(
                "Resource name too long (max 255 characters)".into(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ResourceError::InvalidName(format!(
                "Resource name contains invalid characters: {}",
                name
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceName {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// Network Value Objects
// ============================================================================

/// IPv4 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CidrBlock {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl CidrBlock {
    /// The whole IPv4 address space
    pub const ANYWHERE: CidrBlock = CidrBlock {
        address: Ipv4Addr::UNSPECIFIED,
        prefix_len: 0,
    };

    /// RFC1918 10.0.0.0/8 private range
    pub const PRIVATE_10: CidrBlock = CidrBlock {
        address: Ipv4Addr::new(10, 0, 0, 0),
        prefix_len: 8,
    };

    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self, ResourceError> {
        if prefix_len > 32 {
            return Err(ResourceError::InvalidPrefixLength(prefix_len));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for CidrBlock {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = s
            .split_once('/')
            .ok_or_else(|| ResourceError::InvalidCidr(s.to_string()))?;

        let address = addr_str
            .parse::<Ipv4Addr>()
            .map_err(|_| ResourceError::InvalidCidr(s.to_string()))?;

        let prefix_len = prefix_str
            .parse::<u8>()
            .map_err(|_| ResourceError::InvalidCidr(s.to_string()))?;

        Self::new(address, prefix_len)
    }
}

/// IPv6 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv6CidrBlock {
    pub address: Ipv6Addr,
    pub prefix_len: u8,
}

impl Ipv6CidrBlock {
    /// The whole IPv6 address space
    pub const ANYWHERE: Ipv6CidrBlock = Ipv6CidrBlock {
        address: Ipv6Addr::UNSPECIFIED,
        prefix_len: 0,
    };

    pub fn new(address: Ipv6Addr, prefix_len: u8) -> Result<Self, ResourceError> {
        if prefix_len > 128 {
            return Err(ResourceError::InvalidPrefixLength(prefix_len));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }
}

impl fmt::Display for Ipv6CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Ipv6CidrBlock {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = s
            .split_once('/')
            .ok_or_else(|| ResourceError::InvalidCidr(s.to_string()))?;

        let address = addr_str
            .parse::<Ipv6Addr>()
            .map_err(|_| ResourceError::InvalidCidr(s.to_string()))?;

        let prefix_len = prefix_str
            .parse::<u8>()
            .map_err(|_| ResourceError::InvalidCidr(s.to_string()))?;

        Self::new(address, prefix_len)
    }
}

/// IP protocol for security group rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// All protocols (wire number "-1")
    All,
    /// TCP (wire number "6")
    Tcp,
    /// UDP (wire number "17")
    Udp,
}

impl Protocol {
    /// Protocol number as the cloud API expects it
    pub fn wire_number(&self) -> &'static str {
        match self {
            Protocol::All => "-1",
            Protocol::Tcp => "6",
            Protocol::Udp => "17",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_number())
    }
}

/// Inclusive port range for security group rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    pub fn new(from: u16, to: u16) -> Result<Self, ResourceError> {
        if from > to {
            return Err(ResourceError::InvalidPortRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// A single port
    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    /// Port range 0-0, used with [`Protocol::All`] to mean every port
    pub fn all() -> Self {
        Self { from: 0, to: 0 }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Inbound traffic rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: Protocol,
    pub ports: PortRange,
    pub cidr_blocks: Vec<CidrBlock>,
    pub ipv6_cidr_blocks: Vec<Ipv6CidrBlock>,
}

impl IngressRule {
    pub fn new(protocol: Protocol, ports: PortRange) -> Self {
        Self {
            protocol,
            ports,
            cidr_blocks: Vec::new(),
            ipv6_cidr_blocks: Vec::new(),
        }
    }

    pub fn with_cidr(mut self, cidr: CidrBlock) -> Self {
        self.cidr_blocks.push(cidr);
        self
    }

    pub fn with_ipv6_cidr(mut self, cidr: Ipv6CidrBlock) -> Self {
        self.ipv6_cidr_blocks.push(cidr);
        self
    }
}

/// Outbound traffic rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressRule {
    pub protocol: Protocol,
    pub ports: PortRange,
    pub cidr_blocks: Vec<CidrBlock>,
    pub ipv6_cidr_blocks: Vec<Ipv6CidrBlock>,
}

impl EgressRule {
    pub fn new(protocol: Protocol, ports: PortRange) -> Self {
        Self {
            protocol,
            ports,
            cidr_blocks: Vec::new(),
            ipv6_cidr_blocks: Vec::new(),
        }
    }

    /// Egress rule allowing all traffic to anywhere, v4 and v6
    pub fn allow_all() -> Self {
        Self {
            protocol: Protocol::All,
            ports: PortRange::all(),
            cidr_blocks: vec![CidrBlock::ANYWHERE],
            ipv6_cidr_blocks: vec![Ipv6CidrBlock::ANYWHERE],
        }
    }

    pub fn with_cidr(mut self, cidr: CidrBlock) -> Self {
        self.cidr_blocks.push(cidr);
        self
    }

    pub fn with_ipv6_cidr(mut self, cidr: Ipv6CidrBlock) -> Self {
        self.ipv6_cidr_blocks.push(cidr);
        self
    }
}

// ============================================================================
// Compute Value Objects
// ============================================================================

/// Container image reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerImage(String);

impl ContainerImage {
    pub fn new(image: impl Into<String>) -> Result<Self, ResourceError> {
        let image = image.into();
        if image.is_empty() {
            return Err(ResourceError::InvalidImage(
                "Image reference cannot be empty".into(),
            ));
        }
        Ok(Self(image))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which subnet tier a service's tasks are placed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubnetSelection {
    Public,
    Private,
}

/// Port mapping binding a container port to a load balancer target group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
    /// Load balancer whose default target group receives this traffic
    pub target_group: ResourceName,
}

/// Container definition inside a Fargate task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    pub image: ContainerImage,
    pub cpu: u32,
    pub memory: u32,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
}

// ============================================================================
// Resource Specifications
// ============================================================================

/// VPC with public and private subnets
///
/// Subnet layout is left to the provisioning engine's defaults unless an
/// explicit CIDR is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcSpec {
    pub cidr_block: Option<CidrBlock>,
}

/// Security group attached to a VPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupSpec {
    pub vpc: ResourceName,
    pub ingress: Vec<IngressRule>,
    pub egress: Vec<EgressRule>,
}

/// Compute cluster services deploy into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {}

/// Whether a load balancer faces the internet or stays internal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadBalancerScheme {
    InternetFacing,
    Internal,
}

/// Application load balancer with a default target group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    pub scheme: LoadBalancerScheme,
    pub default_target_group_port: u16,
}

/// Container image registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySpec {
    pub repository_name: String,
    pub force_delete: bool,
}

/// Fargate-style container service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FargateServiceSpec {
    pub cluster: ResourceName,
    pub vpc: ResourceName,
    pub subnets: SubnetSelection,
    pub security_groups: Vec<ResourceName>,
    pub container: ContainerDefinition,
}

/// The typed specification of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSpec {
    Network(VpcSpec),
    SecurityGroup(SecurityGroupSpec),
    Cluster(ClusterSpec),
    LoadBalancer(LoadBalancerSpec),
    Repository(RepositorySpec),
    Service(FargateServiceSpec),
}

/// Discriminant of [`ResourceSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Network,
    SecurityGroup,
    Cluster,
    LoadBalancer,
    Repository,
    Service,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::SecurityGroup => write!(f, "security group"),
            ResourceKind::Cluster => write!(f, "cluster"),
            ResourceKind::LoadBalancer => write!(f, "load balancer"),
            ResourceKind::Repository => write!(f, "repository"),
            ResourceKind::Service => write!(f, "service"),
        }
    }
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Network(_) => ResourceKind::Network,
            ResourceSpec::SecurityGroup(_) => ResourceKind::SecurityGroup,
            ResourceSpec::Cluster(_) => ResourceKind::Cluster,
            ResourceSpec::LoadBalancer(_) => ResourceKind::LoadBalancer,
            ResourceSpec::Repository(_) => ResourceKind::Repository,
            ResourceSpec::Service(_) => ResourceKind::Service,
        }
    }
}

// ============================================================================
// Dependency Edges
// ============================================================================

/// How one descriptor depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRelation {
    /// Security group belongs to a VPC
    MemberOf,
    /// Service deploys onto a cluster
    RunsOn,
    /// Service's tasks are placed into a VPC's subnets
    PlacedIn,
    /// Service traffic is filtered by a security group
    SecuredBy,
    /// Container port is registered with a load balancer's target group
    RoutesTo,
}

impl EdgeRelation {
    /// The resource kind the edge target must have
    pub fn expected_target_kind(&self) -> ResourceKind {
        match self {
            EdgeRelation::MemberOf | EdgeRelation::PlacedIn => ResourceKind::Network,
            EdgeRelation::RunsOn => ResourceKind::Cluster,
            EdgeRelation::SecuredBy => ResourceKind::SecurityGroup,
            EdgeRelation::RoutesTo => ResourceKind::LoadBalancer,
        }
    }
}

/// Typed dependency between two descriptors
///
/// Edges determine provisioning order in the external engine; here they are
/// only checked for referential integrity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: ResourceName,
    pub to: ResourceName,
    pub relation: EdgeRelation,
}

// ============================================================================
// Resource Descriptor
// ============================================================================

/// Declarative specification of one desired cloud resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: ResourceName,
    pub spec: ResourceSpec,
    pub tags: TagSet,
}

impl ResourceDescriptor {
    pub fn new(name: ResourceName, spec: ResourceSpec, tags: TagSet) -> Self {
        Self { name, spec, tags }
    }

    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    /// The typed dependency edges implied by this descriptor's references
    pub fn references(&self) -> Vec<DependencyEdge> {
        let edge = |to: &ResourceName, relation: EdgeRelation| DependencyEdge {
            from: self.name.clone(),
            to: to.clone(),
            relation,
        };

        match &self.spec {
            ResourceSpec::Network(_) | ResourceSpec::Cluster(_) => Vec::new(),
            ResourceSpec::LoadBalancer(_) | ResourceSpec::Repository(_) => Vec::new(),
            ResourceSpec::SecurityGroup(sg) => vec![edge(&sg.vpc, EdgeRelation::MemberOf)],
            ResourceSpec::Service(service) => {
                let mut edges = vec![
                    edge(&service.cluster, EdgeRelation::RunsOn),
                    edge(&service.vpc, EdgeRelation::PlacedIn),
                ];
                for group in &service.security_groups {
                    edges.push(edge(group, EdgeRelation::SecuredBy));
                }
                for mapping in &service.container.port_mappings {
                    edges.push(edge(&mapping.target_group, EdgeRelation::RoutesTo));
                }
                edges
            }
        }
    }
}
