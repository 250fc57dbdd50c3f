// EC2 instance controller
// reason: identity comes from IMDS so the binary needs no instance config at all
use async_trait::async_trait;
use aws_config::imds;
use aws_config::meta::region::ProvideRegion;
use aws_config::{BehaviorVersion, Region};
use tracing::{debug, info};

use atelier_core::port::instance::{HostIdentity, InstanceController, ShutdownError};

const INSTANCE_ID_PATH: &str = "/latest/meta-data/instance-id";

/// Instance controller for EC2 hosts.
///
/// Resolves the host's own identity from the instance metadata service and
/// issues `StopInstances` against the regional EC2 endpoint. Only ever
/// called for the instance the process runs on.
pub struct Ec2InstanceController {
    imds: imds::Client,
}

impl Ec2InstanceController {
    pub fn new() -> Self {
        Self {
            imds: imds::Client::builder().build(),
        }
    }
}

impl Default for Ec2InstanceController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceController for Ec2InstanceController {
    async fn resolve_identity(&self) -> Result<HostIdentity, ShutdownError> {
        let instance_id = self
            .imds
            .get(INSTANCE_ID_PATH)
            .await
            .map_err(|e| ShutdownError::Identity(e.to_string()))?;

        let region = imds::region::ImdsRegionProvider::builder()
            .build()
            .region()
            .await
            .ok_or_else(|| {
                ShutdownError::Identity("region missing from instance metadata".to_string())
            })?;

        let identity = HostIdentity {
            instance_id: instance_id.as_ref().to_string(),
            region: region.to_string(),
        };

        debug!(
            instance_id = %identity.instance_id,
            region = %identity.region,
            "Host identity resolved"
        );

        Ok(identity)
    }

    async fn stop(&self, identity: &HostIdentity) -> Result<(), ShutdownError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(identity.region.clone()))
            .load()
            .await;
        let client = aws_sdk_ec2::Client::new(&config);

        client
            .stop_instances()
            .instance_ids(&identity.instance_id)
            .send()
            .await
            .map_err(|e| ShutdownError::StopFailed {
                instance_id: identity.instance_id.clone(),
                reason: aws_sdk_ec2::error::DisplayErrorContext(e).to_string(),
            })?;

        info!(instance_id = %identity.instance_id, "StopInstances accepted");

        Ok(())
    }
}
