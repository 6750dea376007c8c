// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds the agent sidecar container from pod annotations and injector defaults.

use crate::config::InjectorConfig;
use crate::constants::{annotations, env, field_paths, sidecar};
use crate::error::{InjectorError, Result};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, EnvVar, EnvVarSource, ObjectFieldSelector,
    ResourceRequirements, SecretKeySelector, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::debug;

/// The sidecar container and the volume it needs, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Sidecar {
    pub container: Container,
    pub volume: Option<Volume>,
}

/// Build the agent sidecar for a pod.
///
/// The environment is emitted in a fixed order so the resulting pod spec is
/// reproducible. Fails when neither an API key secret annotation nor a
/// default API key is available.
pub fn build_container(
    pod_annotations: &BTreeMap<String, String>,
    existing_containers: &[Container],
    config: &InjectorConfig,
) -> Result<Sidecar> {
    let config_map_name = pod_annotations
        .get(annotations::AGENT_CONFIG_CONFIGMAP_NAME)
        .filter(|name| !name.is_empty());

    let volume = config_map_name.map(|name| agent_config_volume(name));

    // With a config map mounted, an unset path points at the mounted file.
    let agent_config_path = match pod_annotations.get(annotations::AGENT_CONFIG_ENV_PATH) {
        Some(path) if !path.is_empty() || volume.is_none() => Some(path.as_str()),
        _ if volume.is_some() => Some(sidecar::AGENT_CONFIG_MOUNT_PATH),
        _ => None,
    };

    let env = build_env(pod_annotations, agent_config_path, config)?;

    let mut volume_mounts = Vec::new();
    if let Some(mount) = find_service_account_mount(existing_containers) {
        debug!("Propagating service account token mount from volume {}", mount.name);
        volume_mounts.push(mount.clone());
    }
    if let Some(volume) = &volume {
        volume_mounts.push(VolumeMount {
            name: volume.name.clone(),
            mount_path: sidecar::AGENT_CONFIG_MOUNT_PATH.to_string(),
            sub_path: Some(sidecar::AGENT_CONFIG_SUB_PATH.to_string()),
            ..Default::default()
        });
    }

    let container = Container {
        name: sidecar::CONTAINER_NAME.to_string(),
        image: Some(config.sidecar_image.clone()),
        image_pull_policy: Some(sidecar::IMAGE_PULL_POLICY.to_string()),
        resources: Some(ResourceRequirements {
            limits: Some(BTreeMap::from([(
                "memory".to_string(),
                Quantity(sidecar::MEMORY_LIMIT.to_string()),
            )])),
            ..Default::default()
        }),
        env: Some(env),
        volume_mounts: (!volume_mounts.is_empty()).then_some(volume_mounts),
        ..Default::default()
    };

    Ok(Sidecar { container, volume })
}

fn build_env(
    pod_annotations: &BTreeMap<String, String>,
    agent_config_path: Option<&str>,
    config: &InjectorConfig,
) -> Result<Vec<EnvVar>> {
    let mut vars = vec![
        literal(env::CONTAINER_PLATFORM, env::PLATFORM_KUBERNETES),
        field_ref(env::KUBELET_HOST, field_paths::HOST_IP),
        field_ref(env::NAMESPACE, field_paths::NAMESPACE),
        field_ref(env::POD_NAME, field_paths::POD_NAME),
    ];

    // A configured read-only port replaces the default further down.
    if config.kubelet_read_only_port.is_none() {
        vars.push(literal(
            env::KUBELET_READ_ONLY_PORT,
            env::KUBELET_READ_ONLY_PORT_DISABLED,
        ));
    }

    vars.push(api_key(pod_annotations, config)?);

    if let Some(port) = config.kubelet_port {
        vars.push(literal(env::KUBELET_PORT, &port.to_string()));
    }

    if config.kubelet_insecure_tls {
        vars.push(literal(env::KUBELET_INSECURE_TLS, "true"));
    }

    if let Some(port) = config.kubelet_read_only_port {
        vars.push(literal(env::KUBELET_READ_ONLY_PORT, &port.to_string()));
    }

    if let Some(roles) = pod_annotations.get(annotations::ROLES) {
        vars.push(literal(env::ROLES, roles));
    }

    if let Some(path) = agent_config_path {
        vars.push(literal(env::AGENT_CONFIG, path));
    }

    Ok(vars)
}

/// Resolve the API key, preferring a per-pod secret over the default key
fn api_key(pod_annotations: &BTreeMap<String, String>, config: &InjectorConfig) -> Result<EnvVar> {
    if let Some(secret_name) = pod_annotations
        .get(annotations::API_KEY_SECRET_NAME)
        .filter(|name| !name.is_empty())
    {
        return Ok(secret_ref(env::API_KEY, secret_name, env::API_KEY));
    }

    if config.agent_api_key.is_empty() {
        return Err(InjectorError::Configuration(format!(
            "{} is not specified: set the {} annotation or a default API key",
            env::API_KEY,
            annotations::API_KEY_SECRET_NAME
        )));
    }

    Ok(literal(env::API_KEY, &config.agent_api_key))
}

/// Find the first service account token mount across all containers
fn find_service_account_mount(containers: &[Container]) -> Option<&VolumeMount> {
    containers
        .iter()
        .flat_map(|c| c.volume_mounts.iter().flatten())
        .find(|m| m.mount_path == sidecar::SERVICE_ACCOUNT_TOKEN_MOUNT_PATH)
}

fn agent_config_volume(config_map_name: &str) -> Volume {
    Volume {
        name: sidecar::AGENT_CONFIG_VOLUME_NAME.to_string(),
        config_map: Some(ConfigMapVolumeSource {
            name: config_map_name.to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn literal(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

fn field_ref(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: None,
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
    }
}

fn secret_ref(name: &str, secret_name: &str, key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: None,
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret_name.to_string(),
                key: key.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
    }
}
