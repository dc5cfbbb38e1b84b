// Copyright 2025 Cowboy AI, LLC.

//! The web/api deployment stack
//!
//! Declares the full desired-state topology for the two-service deployment:
//! one VPC, a public-facing and an internal security group, one cluster, two
//! application load balancers, two container registries, and the `infra-web`
//! and `infra-api` Fargate services. The endpoint URL of each load balancer
//! is exported as a deferred output.

use tracing::info;

use crate::config::DeploymentConfig;
use crate::errors::TopologyResult;
use crate::resources::{
    CidrBlock, ClusterSpec, ContainerDefinition, ContainerImage, EgressRule, FargateServiceSpec,
    IngressRule, Ipv6CidrBlock, LoadBalancerScheme, LoadBalancerSpec, PortMapping, PortRange,
    Protocol, RepositorySpec, ResourceDescriptor, ResourceName, ResourceSpec, SecurityGroupSpec,
    SubnetSelection, VpcSpec,
};
use crate::tags::TagSet;
use crate::topology::Topology;

/// Export key for the public endpoint URL
pub const PUBLIC_URL_EXPORT: &str = "publicUrl";

/// Export key for the internal endpoint URL
pub const PRIVATE_URL_EXPORT: &str = "privateUrl";

/// Deferred attribute holding a load balancer's DNS name
pub const DNS_NAME_ATTR: &str = "dns_name";

const WEB_APP: &str = "infra-web";
const API_APP: &str = "infra-api";

const WEB_IMAGE: &str = "266080322197.dkr.ecr.us-east-1.amazonaws.com/infra-web";
const API_IMAGE: &str = "266080322197.dkr.ecr.us-east-1.amazonaws.com/infra-api";

/// Base tags applied across the deployment
pub fn default_base_tags() -> TagSet {
    TagSet::from_pairs([
        ("Env", "Dev"),
        ("BU", "Development"),
        ("Owner", "SRE"),
        ("Git:repo", "http://github.com"),
    ])
}

/// Declare the complete web/api topology
///
/// The returned topology is validated and carries two exports,
/// [`PUBLIC_URL_EXPORT`] and [`PRIVATE_URL_EXPORT`], each an unresolved
/// `"http://" + <dns name>` output completed by the engine.
pub fn declare_web_api_stack(
    config: &DeploymentConfig,
    base_tags: &TagSet,
) -> TopologyResult<Topology> {
    config.validate()?;

    let mut topology = Topology::new();

    let vpc = ResourceName::new("vpc")?;
    let ext_sg = ResourceName::new("ext_alb_sg")?;
    let int_sg = ResourceName::new("int_alb_sg")?;
    let cluster = ResourceName::new("cluster")?;
    let public_alb = ResourceName::new("loadbalancer")?;
    let private_alb = ResourceName::new("private-alb")?;

    topology.declare(ResourceDescriptor::new(
        vpc.clone(),
        ResourceSpec::Network(VpcSpec::default()),
        TagSet::new(),
    ))?;

    // Public-facing group: HTTP from anywhere
    topology.declare(ResourceDescriptor::new(
        ext_sg.clone(),
        ResourceSpec::SecurityGroup(SecurityGroupSpec {
            vpc: vpc.clone(),
            ingress: vec![IngressRule::new(Protocol::Tcp, PortRange::single(80))
                .with_cidr(CidrBlock::ANYWHERE)
                .with_ipv6_cidr(Ipv6CidrBlock::ANYWHERE)],
            egress: vec![EgressRule::allow_all()],
        }),
        TagSet::new(),
    ))?;

    // Internal group: HTTP only from the private range
    topology.declare(ResourceDescriptor::new(
        int_sg.clone(),
        ResourceSpec::SecurityGroup(SecurityGroupSpec {
            vpc: vpc.clone(),
            ingress: vec![IngressRule::new(Protocol::Tcp, PortRange::single(80))
                .with_cidr(CidrBlock::PRIVATE_10)
                .with_ipv6_cidr(Ipv6CidrBlock::ANYWHERE)],
            egress: vec![EgressRule::allow_all()],
        }),
        TagSet::new(),
    ))?;

    topology.declare(ResourceDescriptor::new(
        cluster.clone(),
        ResourceSpec::Cluster(ClusterSpec::default()),
        base_tags.clone(),
    ))?;

    declare_application(
        &mut topology,
        &AppParams {
            app: WEB_APP,
            image: WEB_IMAGE,
            load_balancer: public_alb.clone(),
            scheme: LoadBalancerScheme::InternetFacing,
            security_groups: vec![ext_sg.clone()],
            vpc: vpc.clone(),
            cluster: cluster.clone(),
        },
        config,
        base_tags,
    )?;

    declare_application(
        &mut topology,
        &AppParams {
            app: API_APP,
            image: API_IMAGE,
            load_balancer: private_alb.clone(),
            scheme: LoadBalancerScheme::Internal,
            security_groups: vec![ext_sg, int_sg],
            vpc,
            cluster,
        },
        config,
        base_tags,
    )?;

    topology.validate()?;

    let public_url = topology
        .expect_output(&public_alb, DNS_NAME_ATTR)?
        .concat("http://");
    topology.export(PUBLIC_URL_EXPORT, public_url)?;

    let private_url = topology
        .expect_output(&private_alb, DNS_NAME_ATTR)?
        .concat("http://");
    topology.export(PRIVATE_URL_EXPORT, private_url)?;

    info!(
        topology = %topology.id(),
        container_port = config.container_port,
        "declared web/api stack"
    );

    Ok(topology)
}

struct AppParams {
    app: &'static str,
    image: &'static str,
    load_balancer: ResourceName,
    scheme: LoadBalancerScheme,
    security_groups: Vec<ResourceName>,
    vpc: ResourceName,
    cluster: ResourceName,
}

/// Declare one application's load balancer, registry, and service
fn declare_application(
    topology: &mut Topology,
    params: &AppParams,
    config: &DeploymentConfig,
    base_tags: &TagSet,
) -> TopologyResult<()> {
    let app_tags = base_tags.merge(&TagSet::from_pairs([("Name", params.app)]));

    topology.declare(ResourceDescriptor::new(
        params.load_balancer.clone(),
        ResourceSpec::LoadBalancer(LoadBalancerSpec {
            scheme: params.scheme,
            default_target_group_port: config.container_port,
        }),
        app_tags.clone(),
    ))?;

    topology.declare(ResourceDescriptor::new(
        ResourceName::new(format!("{}-repo", params.app))?,
        ResourceSpec::Repository(RepositorySpec {
            repository_name: params.app.to_string(),
            force_delete: true,
        }),
        app_tags.clone(),
    ))?;

    topology.declare(ResourceDescriptor::new(
        ResourceName::new(params.app)?,
        ResourceSpec::Service(FargateServiceSpec {
            cluster: params.cluster.clone(),
            vpc: params.vpc.clone(),
            subnets: SubnetSelection::Private,
            security_groups: params.security_groups.clone(),
            container: ContainerDefinition {
                image: ContainerImage::new(params.image)?,
                cpu: config.cpu,
                memory: config.memory,
                essential: true,
                port_mappings: vec![PortMapping {
                    container_port: config.container_port,
                    host_port: config.container_port,
                    target_group: params.load_balancer.clone(),
                }],
            },
        }),
        app_tags,
    ))?;

    Ok(())
}
