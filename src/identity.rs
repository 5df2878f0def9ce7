use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Error;

pub mod aws_sdk;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaDevice {
    pub serial_number: String,
    pub owner_arn: Option<String>,
}

/// The caller and the one MFA device bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub caller_arn: String,
    pub mfa_serial: String,
}

impl ResolvedIdentity {
    pub fn mfa_serial(&self) -> &str {
        &self.mfa_serial
    }
}

/// Read-only lookups made with the profile's long-term credentials.
#[async_trait]
pub trait ResolveIdentity {
    async fn caller_arn(&self) -> anyhow::Result<String>;

    /// Devices whose assignment status is "Assigned".
    async fn assigned_mfa_devices(&self) -> anyhow::Result<Vec<MfaDevice>>;
}

pub async fn resolve_mfa_device<I>(identity: &I) -> anyhow::Result<ResolvedIdentity>
where
    I: ResolveIdentity + Sync + ?Sized,
{
    let caller_arn = identity.caller_arn().await?;
    debug!("caller arn:{}", caller_arn);

    let devices = identity.assigned_mfa_devices().await?;
    let mfa_serial = select_device(&caller_arn, &devices)?.serial_number.clone();
    info!("using MFA device {}", mfa_serial);

    Ok(ResolvedIdentity {
        caller_arn,
        mfa_serial,
    })
}

fn select_device<'a>(caller_arn: &str, devices: &'a [MfaDevice]) -> Result<&'a MfaDevice, Error> {
    let matches = devices
        .iter()
        .filter(|d| d.owner_arn.as_deref() == Some(caller_arn))
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [device] => Ok(*device),
        _ => Err(Error::UnresolvedDevice {
            caller_arn: caller_arn.to_string(),
            matches: matches.len(),
        }),
    }
}
