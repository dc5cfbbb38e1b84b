// Copyright 2025 Cowboy AI, LLC.

//! Integration tests for the web/api stack declaration
//!
//! These tests verify the complete flow:
//! 1. Configuration → topology declaration
//! 2. Referential integrity validation
//! 3. Engine apply → deferred output resolution → exported URLs

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use infra_topology::engine::{ApplyReport, ReconciliationEngine};
use infra_topology::resources::{
    CidrBlock, EdgeRelation, ResourceKind, ResourceName, ResourceSpec,
};
use infra_topology::stack::{
    declare_web_api_stack, default_base_tags, DNS_NAME_ATTR, PRIVATE_URL_EXPORT, PUBLIC_URL_EXPORT,
};
use infra_topology::topology::Topology;
use infra_topology::{DeploymentConfig, TopologyResult};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn name(s: &str) -> ResourceName {
    ResourceName::new(s).unwrap()
}

fn default_stack() -> Topology {
    declare_web_api_stack(&DeploymentConfig::default(), &default_base_tags()).unwrap()
}

/// Engine stand-in that provisions nothing and resolves every pending
/// output with a fabricated DNS name.
struct FakeEngine;

#[async_trait]
impl ReconciliationEngine for FakeEngine {
    async fn apply(&self, topology: &Topology) -> TopologyResult<ApplyReport> {
        let started_at = Utc::now();
        topology.validate()?;

        let keys: Vec<_> = topology.pending_outputs().cloned().collect();
        for key in keys {
            let value = format!("{}-1234.us-east-1.elb.amazonaws.com", key.resource);
            topology.resolve_output(&key.resource, &key.attribute, value)?;
        }

        Ok(ApplyReport {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at: Utc::now(),
            created: topology.descriptors().len(),
            updated: 0,
            unchanged: 0,
        })
    }
}

#[test]
fn default_stack_has_expected_shape() {
    init_tracing();
    let topology = default_stack();

    assert_eq!(topology.count_by_kind(ResourceKind::Network), 1);
    assert_eq!(topology.count_by_kind(ResourceKind::Cluster), 1);
    assert_eq!(topology.count_by_kind(ResourceKind::SecurityGroup), 2);
    assert_eq!(topology.count_by_kind(ResourceKind::LoadBalancer), 2);
    assert_eq!(topology.count_by_kind(ResourceKind::Repository), 2);
    assert_eq!(topology.count_by_kind(ResourceKind::Service), 2);
    assert_eq!(topology.descriptors().len(), 10);

    assert!(topology.validate().is_ok());
}

#[test]
fn public_group_allows_anywhere_internal_group_restricted() {
    let topology = default_stack();

    let ext = topology.get(&name("ext_alb_sg")).unwrap();
    let ResourceSpec::SecurityGroup(ext_spec) = &ext.spec else {
        panic!("ext_alb_sg is not a security group");
    };
    assert_eq!(ext_spec.ingress.len(), 1);
    assert_eq!(ext_spec.ingress[0].cidr_blocks, vec![CidrBlock::ANYWHERE]);

    let int = topology.get(&name("int_alb_sg")).unwrap();
    let ResourceSpec::SecurityGroup(int_spec) = &int.spec else {
        panic!("int_alb_sg is not a security group");
    };
    assert_eq!(int_spec.ingress.len(), 1);
    assert_eq!(int_spec.ingress[0].cidr_blocks, vec![CidrBlock::PRIVATE_10]);
    assert_eq!(int_spec.ingress[0].cidr_blocks[0].to_string(), "10.0.0.0/8");
}

#[test]
fn container_port_propagates_to_services_and_target_groups() {
    let config = DeploymentConfig::new(8080, 512, 128).unwrap();
    let topology = declare_web_api_stack(&config, &default_base_tags()).unwrap();

    for lb in ["loadbalancer", "private-alb"] {
        let descriptor = topology.get(&name(lb)).unwrap();
        let ResourceSpec::LoadBalancer(spec) = &descriptor.spec else {
            panic!("{} is not a load balancer", lb);
        };
        assert_eq!(spec.default_target_group_port, 8080);
    }

    for service in ["infra-web", "infra-api"] {
        let descriptor = topology.get(&name(service)).unwrap();
        let ResourceSpec::Service(spec) = &descriptor.spec else {
            panic!("{} is not a service", service);
        };
        assert_eq!(spec.container.port_mappings.len(), 1);
        assert_eq!(spec.container.port_mappings[0].container_port, 8080);
        assert_eq!(spec.container.port_mappings[0].host_port, 8080);
    }
}

#[test]
fn api_service_carries_both_security_groups() {
    let topology = default_stack();

    let api = topology.get(&name("infra-api")).unwrap();
    let ResourceSpec::Service(spec) = &api.spec else {
        panic!("infra-api is not a service");
    };
    assert_eq!(
        spec.security_groups,
        vec![name("ext_alb_sg"), name("int_alb_sg")]
    );

    let web = topology.get(&name("infra-web")).unwrap();
    let ResourceSpec::Service(spec) = &web.spec else {
        panic!("infra-web is not a service");
    };
    assert_eq!(spec.security_groups, vec![name("ext_alb_sg")]);
}

#[test]
fn dependency_edges_cover_every_reference() {
    let topology = default_stack();
    let edges = topology.edges();

    // Each service: RunsOn + PlacedIn + SecuredBy(s) + RoutesTo
    assert!(edges.iter().any(|e| e.from == name("infra-web")
        && e.to == name("loadbalancer")
        && e.relation == EdgeRelation::RoutesTo));
    assert!(edges.iter().any(|e| e.from == name("infra-api")
        && e.to == name("private-alb")
        && e.relation == EdgeRelation::RoutesTo));
    assert!(edges.iter().any(|e| e.from == name("ext_alb_sg")
        && e.to == name("vpc")
        && e.relation == EdgeRelation::MemberOf));
    assert_eq!(
        edges
            .iter()
            .filter(|e| e.relation == EdgeRelation::SecuredBy)
            .count(),
        3
    );
}

#[test]
fn exports_use_distinct_keys() {
    let topology = default_stack();

    let keys: Vec<_> = topology.exports().keys().cloned().collect();
    assert_eq!(keys, vec![PRIVATE_URL_EXPORT, PUBLIC_URL_EXPORT]);
}

#[test]
fn manifest_lists_all_resources() {
    let topology = default_stack();
    let manifest = topology.manifest();

    assert_eq!(manifest["resources"].as_array().unwrap().len(), 10);
    let kinds: Vec<_> = manifest["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["spec"]["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds.iter().filter(|k| *k == "service").count(), 2);
}

#[tokio::test]
async fn apply_resolves_exported_urls() {
    init_tracing();
    let topology = default_stack();

    let public_url = topology.get_export(PUBLIC_URL_EXPORT).unwrap().clone();
    let private_url = topology.get_export(PRIVATE_URL_EXPORT).unwrap().clone();
    assert_eq!(public_url.get(), None);
    assert_eq!(private_url.get(), None);

    let report = FakeEngine.apply(&topology).await.unwrap();
    assert_eq!(report.total(), 10);

    assert_eq!(
        public_url.get().as_deref(),
        Some("http://loadbalancer-1234.us-east-1.elb.amazonaws.com")
    );
    assert_eq!(
        private_url.get().as_deref(),
        Some("http://private-alb-1234.us-east-1.elb.amazonaws.com")
    );
}

#[tokio::test]
async fn second_apply_cannot_re_resolve_outputs() {
    let topology = default_stack();

    FakeEngine.apply(&topology).await.unwrap();
    let second = FakeEngine.apply(&topology).await;
    assert!(second.is_err());
}

#[test]
fn pending_outputs_cover_both_load_balancers() {
    let topology = default_stack();

    let mut pending: Vec<_> = topology
        .pending_outputs()
        .map(|k| (k.resource.to_string(), k.attribute.clone()))
        .collect();
    pending.sort();

    assert_eq!(
        pending,
        vec![
            ("loadbalancer".to_string(), DNS_NAME_ATTR.to_string()),
            ("private-alb".to_string(), DNS_NAME_ATTR.to_string()),
        ]
    );
}
