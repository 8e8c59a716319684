use crate::crd::rhmi_config::{MaintenanceStatus, RHMIConfig, RHMIConfigSpec, UpgradeStatus};
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("RHMIConfig {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("API server rejected the write ({code}): {message}")]
    Rejected { code: u16, message: String },

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),
}

/// Trait for persisting RHMIConfig writes
///
/// Every call is a separate write; nothing is transactional across calls.
/// Production code uses `KubeStatusStore` which sends merge patches to the API
/// server. Tests use `MockStatusStore` which applies writes to an in-memory copy.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Overwrite `status.maintenance`
    async fn patch_maintenance(
        &self,
        namespace: &str,
        name: &str,
        maintenance: &MaintenanceStatus,
    ) -> Result<(), StoreError>;

    /// Overwrite `status.upgrade`, removing `scheduled` when it is `None`
    async fn patch_upgrade(
        &self,
        namespace: &str,
        name: &str,
        upgrade: &UpgradeStatus,
    ) -> Result<(), StoreError>;

    /// Write defaulted spec values back to the resource
    async fn patch_spec(
        &self,
        namespace: &str,
        name: &str,
        spec: &RHMIConfigSpec,
    ) -> Result<(), StoreError>;
}

/// Status store backed by the Kubernetes API
pub struct KubeStatusStore {
    client: kube::Client,
}

impl KubeStatusStore {
    pub fn new(client: kube::Client) -> Self {
        KubeStatusStore { client }
    }

    fn api(&self, namespace: &str) -> Api<RHMIConfig> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn map_api_error(namespace: &str, name: &str, error: kube::Error) -> StoreError {
    match error {
        kube::Error::Api(response) if response.code == 404 => StoreError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(response) => StoreError::Rejected {
            code: response.code,
            message: response.message.clone(),
        },
        other => StoreError::KubeError(other),
    }
}

#[async_trait]
impl StatusStore for KubeStatusStore {
    async fn patch_maintenance(
        &self,
        namespace: &str,
        name: &str,
        maintenance: &MaintenanceStatus,
    ) -> Result<(), StoreError> {
        let patch = json!({
            "status": {
                "maintenance": {
                    "applyFrom": maintenance.apply_from,
                    "duration": maintenance.duration,
                }
            }
        });
        self.api(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_api_error(namespace, name, e))?;
        Ok(())
    }

    async fn patch_upgrade(
        &self,
        namespace: &str,
        name: &str,
        upgrade: &UpgradeStatus,
    ) -> Result<(), StoreError> {
        // Explicit null so a merge patch removes a previous schedule
        let patch = json!({
            "status": {
                "upgrade": {
                    "scheduled": upgrade.scheduled,
                }
            }
        });
        self.api(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_api_error(namespace, name, e))?;
        Ok(())
    }

    async fn patch_spec(
        &self,
        namespace: &str,
        name: &str,
        spec: &RHMIConfigSpec,
    ) -> Result<(), StoreError> {
        let patch = json!({ "spec": spec });
        self.api(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_api_error(namespace, name, e))?;
        Ok(())
    }
}

/// Which write a `MockStatusStore` call was
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWrite {
    Maintenance,
    Upgrade,
    Spec,
}

/// In-memory status store for tests
///
/// Holds one resource. Writes are applied to it in order and recorded so tests
/// can assert on both the final state and the write sequence.
#[cfg(test)]
pub struct MockStatusStore {
    state: std::sync::Mutex<MockState>,
}

#[cfg(test)]
struct MockState {
    spec: RHMIConfigSpec,
    status: crate::crd::rhmi_config::RHMIConfigStatus,
    writes: Vec<StoreWrite>,
    fail_on: Option<StoreWrite>,
    not_found: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl MockStatusStore {
    pub fn new(config: &RHMIConfig) -> Self {
        MockStatusStore {
            state: std::sync::Mutex::new(MockState {
                spec: config.spec.clone(),
                status: config.status.clone().unwrap_or_default(),
                writes: Vec::new(),
                fail_on: None,
                not_found: false,
            }),
        }
    }

    /// Fail every write of the given kind with a server error
    pub fn failing_on(self, write: StoreWrite) -> Self {
        self.state.lock().unwrap().fail_on = Some(write);
        self
    }

    /// Behave as if the resource had been deleted
    pub fn deleted(self) -> Self {
        self.state.lock().unwrap().not_found = true;
        self
    }

    pub fn status(&self) -> crate::crd::rhmi_config::RHMIConfigStatus {
        self.state.lock().unwrap().status.clone()
    }

    pub fn spec(&self) -> RHMIConfigSpec {
        self.state.lock().unwrap().spec.clone()
    }

    pub fn writes(&self) -> Vec<StoreWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    fn apply(
        &self,
        namespace: &str,
        name: &str,
        write: StoreWrite,
        update: impl FnOnce(&mut MockState),
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.not_found {
            return Err(StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }
        if state.fail_on == Some(write) {
            return Err(StoreError::Rejected {
                code: 500,
                message: "injected failure".to_string(),
            });
        }
        update(&mut state);
        state.writes.push(write);
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl StatusStore for MockStatusStore {
    async fn patch_maintenance(
        &self,
        namespace: &str,
        name: &str,
        maintenance: &MaintenanceStatus,
    ) -> Result<(), StoreError> {
        self.apply(namespace, name, StoreWrite::Maintenance, |state| {
            state.status.maintenance = maintenance.clone();
        })
    }

    async fn patch_upgrade(
        &self,
        namespace: &str,
        name: &str,
        upgrade: &UpgradeStatus,
    ) -> Result<(), StoreError> {
        self.apply(namespace, name, StoreWrite::Upgrade, |state| {
            state.status.upgrade = upgrade.clone();
        })
    }

    async fn patch_spec(
        &self,
        namespace: &str,
        name: &str,
        spec: &RHMIConfigSpec,
    ) -> Result<(), StoreError> {
        self.apply(namespace, name, StoreWrite::Spec, |state| {
            state.spec = spec.clone();
        })
    }
}
