use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_iam::types::AssignmentStatusType;
use tracing::debug;

use crate::aws::AwsSdkSession;
use crate::identity::{MfaDevice, ResolveIdentity};

#[async_trait]
impl ResolveIdentity for AwsSdkSession {
    async fn caller_arn(&self) -> anyhow::Result<String> {
        let output = self
            .sts()
            .get_caller_identity()
            .send()
            .await
            .context("get-caller-identity failed")?;

        output
            .arn
            .ok_or_else(|| anyhow::anyhow!("get-caller-identity didn't return an ARN"))
    }

    async fn assigned_mfa_devices(&self) -> anyhow::Result<Vec<MfaDevice>> {
        let client = self.iam();
        let mut devices = Vec::new();
        let mut marker = None;

        loop {
            let output = client
                .list_virtual_mfa_devices()
                .assignment_status(AssignmentStatusType::Assigned)
                .set_marker(marker.take())
                .send()
                .await
                .context("list-virtual-mfa-devices failed")?;

            devices.extend(output.virtual_mfa_devices.into_iter().map(|d| MfaDevice {
                serial_number: d.serial_number,
                owner_arn: d.user.map(|u| u.arn),
            }));

            if !output.is_truncated {
                break;
            }
            marker = output.marker;
            if marker.is_none() {
                break;
            }
        }

        debug!("{} assigned MFA devices", devices.len());
        Ok(devices)
    }
}
