// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Pod annotation keys read and written by the injector.
///
/// These keys are a contract with cluster operators, do not rename them.
pub mod annotations {
    /// When set to "true", requests injection of the agent sidecar
    pub const INJECT: &str = "agent-injector.contrib.mackerel.io/inject";
    /// Set to "injected" once the sidecar has been added
    pub const STATUS: &str = "agent-injector.contrib.mackerel.io/status";
    /// Host roles passed verbatim to the agent
    pub const ROLES: &str = "agent-injector.contrib.mackerel.io/roles";
    /// Name of a secret holding the API key under `MACKEREL_APIKEY`
    pub const API_KEY_SECRET_NAME: &str =
        "agent-injector.contrib.mackerel.io/mackerel_apikey.secret_name";
    /// Name of a config map holding `mackerel-agent.conf`
    pub const AGENT_CONFIG_CONFIGMAP_NAME: &str =
        "agent-injector.contrib.mackerel.io/mackere_agent_config.configmap_name";
    /// Path of the agent config file as seen by the sidecar
    pub const AGENT_CONFIG_ENV_PATH: &str =
        "agent-injector.contrib.mackerel.io/env.mackere_agent_config";

    pub const STATUS_INJECTED: &str = "injected";
    pub const INJECT_ENABLED: &str = "true";
}

/// Environment variables understood by the agent container
pub mod env {
    pub const CONTAINER_PLATFORM: &str = "MACKEREL_CONTAINER_PLATFORM";
    pub const KUBELET_HOST: &str = "MACKEREL_KUBERNETES_KUBELET_HOST";
    pub const NAMESPACE: &str = "MACKEREL_KUBERNETES_NAMESPACE";
    pub const POD_NAME: &str = "MACKEREL_KUBERNETES_POD_NAME";
    pub const KUBELET_READ_ONLY_PORT: &str = "MACKEREL_KUBERNETES_KUBELET_READ_ONLY_PORT";
    pub const KUBELET_PORT: &str = "MACKEREL_KUBERNETES_KUBELET_PORT";
    pub const KUBELET_INSECURE_TLS: &str = "MACKEREL_KUBERNETES_KUBELET_INSECURE_TLS";
    /// Also used as the key inside the API key secret
    pub const API_KEY: &str = "MACKEREL_APIKEY";
    pub const ROLES: &str = "MACKEREL_ROLES";
    pub const AGENT_CONFIG: &str = "MACKEREL_AGENT_CONFIG";

    pub const PLATFORM_KUBERNETES: &str = "kubernetes";
    /// Read-only kubelet port is disabled unless configured
    pub const KUBELET_READ_ONLY_PORT_DISABLED: &str = "0";
}

/// Downward API field paths referenced by the sidecar's environment
pub mod field_paths {
    pub const HOST_IP: &str = "status.hostIP";
    pub const NAMESPACE: &str = "metadata.namespace";
    pub const POD_NAME: &str = "metadata.name";
}

/// Shape of the injected sidecar container
pub mod sidecar {
    pub const CONTAINER_NAME: &str = "mackerel-container-agent";
    pub const DEFAULT_IMAGE: &str = "mackerel/mackerel-container-agent:plugins";
    pub const IMAGE_PULL_POLICY: &str = "Always";
    pub const MEMORY_LIMIT: &str = "128Mi";

    pub const AGENT_CONFIG_VOLUME_NAME: &str = "mackerel-agent-config-volume";
    pub const AGENT_CONFIG_MOUNT_PATH: &str = "/etc/mackerel-agent/mackerel-agent.conf";
    pub const AGENT_CONFIG_SUB_PATH: &str = "mackerel-agent.conf";

    /// Mount added to every container by the ServiceAccount admission plugin
    pub const SERVICE_ACCOUNT_TOKEN_MOUNT_PATH: &str =
        "/var/run/secrets/kubernetes.io/serviceaccount";
}

/// Namespaces that are never mutated unless overridden
pub const DEFAULT_IGNORED_NAMESPACES: &[&str] = &["kube-system", "kube-public"];

/// Webhook server defaults
pub mod webhook {
    pub const MUTATE_POD_PATH: &str = "/mutate--v1-pod";
    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9443";
    pub const DEFAULT_TLS_CERT_FILE: &str = "/tmp/k8s-webhook-server/serving-certs/tls.crt";
    pub const DEFAULT_TLS_KEY_FILE: &str = "/tmp/k8s-webhook-server/serving-certs/tls.key";
}
