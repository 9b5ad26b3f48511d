use std::fmt;
use std::time::Duration;

use crate::intent::DEFAULT_SYSTEM;

/// Systems the simulated engine knows how to deactivate.
pub const SUPPORTED_SYSTEMS: &[&str] = &["jira", "azure_devops", "confluence"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `SystemStatus` values.
pub enum SystemStatus {
    Success,
    Failed,
    UnsupportedSystem,
}

impl SystemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::UnsupportedSystem => "UnsupportedSystem",
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Outcome policy of the simulated deactivation.
pub enum ExecutionPolicy {
    /// Success iff the system is in [`SUPPORTED_SYSTEMS`].
    #[default]
    AllowList,
    /// Allow-list first, then success with the given probability.
    Probabilistic { success_probability: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Per-system statuses keyed by lower-cased system id, in first-seen order.
pub struct ExecutionResults {
    entries: Vec<(String, SystemStatus)>,
}

impl ExecutionResults {
    /// Records `status` for `system` unless the system is already present.
    pub fn record(&mut self, system: &str, status: SystemStatus) -> bool {
        let key = system.trim().to_ascii_lowercase();
        if self.entries.iter().any(|(existing, _)| *existing == key) {
            return false;
        }
        self.entries.push((key, status));
        true
    }

    pub fn get(&self, system: &str) -> Option<SystemStatus> {
        let key = system.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, status)| *status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SystemStatus)> {
        self.entries
            .iter()
            .map(|(system, status)| (system.as_str(), *status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, status)| *status == SystemStatus::Success)
    }

    pub fn any_unsupported(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, status)| *status == SystemStatus::UnsupportedSystem)
    }
}

impl FromIterator<(String, SystemStatus)> for ExecutionResults {
    fn from_iter<I: IntoIterator<Item = (String, SystemStatus)>>(iter: I) -> Self {
        let mut results = Self::default();
        for (system, status) in iter {
            results.record(&system, status);
        }
        results
    }
}

pub fn is_supported_system(system: &str) -> bool {
    let normalized = system.trim().to_ascii_lowercase();
    SUPPORTED_SYSTEMS.contains(&normalized.as_str())
}

#[derive(Debug, Clone, Default)]
/// Simulated deactivation engine.
pub struct ActionExecutor {
    policy: ExecutionPolicy,
    delay: Duration,
}

impl ActionExecutor {
    pub fn new(policy: ExecutionPolicy, delay: Duration) -> Self {
        let policy = match policy {
            ExecutionPolicy::Probabilistic {
                success_probability,
            } => ExecutionPolicy::Probabilistic {
                success_probability: if success_probability.is_nan() {
                    0.0
                } else {
                    success_probability.clamp(0.0, 1.0)
                },
            },
            ExecutionPolicy::AllowList => ExecutionPolicy::AllowList,
        };
        Self { policy, delay }
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    pub async fn execute(&self, email: &str, system: &str) -> SystemStatus {
        tracing::info!(email, system, "processing deactivation");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if !is_supported_system(system) {
            return SystemStatus::UnsupportedSystem;
        }
        match self.policy {
            ExecutionPolicy::AllowList => SystemStatus::Success,
            ExecutionPolicy::Probabilistic {
                success_probability,
            } => {
                if rand::random::<f64>() < success_probability {
                    SystemStatus::Success
                } else {
                    SystemStatus::Failed
                }
            }
        }
    }

    /// Runs [`Self::execute`] once per distinct system, in order. An empty
    /// list means the default system.
    pub async fn execute_all(&self, email: &str, systems: &[String]) -> ExecutionResults {
        let mut results = ExecutionResults::default();
        if systems.is_empty() {
            let status = self.execute(email, DEFAULT_SYSTEM).await;
            results.record(DEFAULT_SYSTEM, status);
            return results;
        }

        for system in systems {
            if results.get(system).is_some() || system.trim().is_empty() {
                continue;
            }
            let status = self.execute(email, system).await;
            results.record(system, status);
        }
        results
    }
}
