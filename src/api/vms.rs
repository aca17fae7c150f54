//! VM lifecycle endpoints.

use reqwest::Method;
use serde_json::Value;
use tracing::warn;

use super::types::{
    CreateVmRequest, CreatedVm, DeleteVmsRequest, Estimate, EstimateRequest, OsImage,
    ScaleRequest, UpdateVmsRequest, Vm, VmUpdate,
};
use super::{ApiError, FluenceClient};

const VMS: &str = "vms/v3";
const ESTIMATE: &str = "vms/v3/estimate";
const DEFAULT_IMAGES: &str = "vms/v3/default_images";

impl FluenceClient {
    /// Lists every VM owned by the account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_vms(&self) -> Result<Vec<Vm>, ApiError> {
        self.get(VMS).await
    }

    /// Fetches one VM by id. The API has no single-VM endpoint, so the full
    /// list is fetched and matched ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::VmNotFound`] when no VM carries the id.
    pub async fn get_vm(&self, vm_id: &str) -> Result<Vm, ApiError> {
        let wanted = vm_id.trim();
        self.list_vms()
            .await?
            .into_iter()
            .find(|vm| vm.id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ApiError::VmNotFound {
                vm_id: wanted.to_owned(),
            })
    }

    /// Creates VMs and returns the identifiers assigned by the API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn create_vm(&self, request: &CreateVmRequest) -> Result<Vec<CreatedVm>, ApiError> {
        self.request(Method::POST, VMS, Some(request)).await
    }

    /// Terminates a VM.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn delete_vm(&self, vm_id: &str) -> Result<Value, ApiError> {
        let body = DeleteVmsRequest {
            vm_ids: vec![vm_id.trim().to_owned()],
        };
        self.request(Method::DELETE, VMS, Some(&body)).await
    }

    /// Renames a VM and/or replaces its open ports.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn update_vm(&self, update: VmUpdate) -> Result<Value, ApiError> {
        let body = UpdateVmsRequest {
            updates: vec![update],
        };
        self.request(Method::PATCH, VMS, Some(&body)).await
    }

    /// Changes the CPU and memory allocation of a VM.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn scale_vm(&self, vm_id: &str, request: &ScaleRequest) -> Result<Value, ApiError> {
        let endpoint = format!("{VMS}/{}/scale", vm_id.trim());
        self.request(Method::PUT, &endpoint, Some(request)).await
    }

    /// Prices a configuration without creating it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn estimate_vm(&self, request: &EstimateRequest) -> Result<Estimate, ApiError> {
        self.request(Method::POST, ESTIMATE, Some(request)).await
    }

    /// Like [`Self::estimate_vm`] but yields an empty estimate on failure.
    pub async fn estimate_vm_or_default(&self, request: &EstimateRequest) -> Estimate {
        self.estimate_vm(request).await.unwrap_or_else(|err| {
            warn!(error = %err, "pricing estimate unavailable");
            Estimate::default()
        })
    }

    /// Lists the OS images offered for new VMs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn default_images(&self) -> Result<Vec<OsImage>, ApiError> {
        self.get(DEFAULT_IMAGES).await
    }

    /// Like [`Self::default_images`] but yields an empty list on failure.
    pub async fn default_images_or_empty(&self) -> Vec<OsImage> {
        self.default_images().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not fetch default images");
            Vec::new()
        })
    }
}
