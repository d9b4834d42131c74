//! Provisioning workflow steps and outcome.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// One step of the provisioning workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CheckPorts,
    InstallPackages,
    ActivatePlain,
    IssueCertificate,
    VerifyCertificate,
    ActivateTls,
}

impl WorkflowStep {
    /// Every step, in the order the workflow runs them.
    pub const ALL: [Self; 6] = [
        Self::CheckPorts,
        Self::InstallPackages,
        Self::ActivatePlain,
        Self::IssueCertificate,
        Self::VerifyCertificate,
        Self::ActivateTls,
    ];

    /// 1-based position, used in progress lines (`[3/6]`).
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }

    /// Whether re-running the step on an already-provisioned host is a no-op.
    #[must_use]
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Self::IssueCertificate)
    }

    /// Short description shown while the step runs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CheckPorts => "checking required ports are free",
            Self::InstallPackages => "installing nginx and certbot",
            Self::ActivatePlain => "activating plain HTTP site",
            Self::IssueCertificate => "requesting certificate",
            Self::VerifyCertificate => "verifying certificate",
            Self::ActivateTls => "activating HTTPS site",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.number(), Self::ALL.len(), self.label())
    }
}

/// Result of a successful provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    /// Domain now served over HTTPS.
    pub domain: String,
    /// Certificate chain the TLS site points at.
    pub certificate: PathBuf,
    /// Number of nginx reloads issued during the run.
    pub reloads: u32,
}
