use super::{
    DashboardCounters, DashboardGrain, GrainError, GrainFactory, GrainTracing, ManagementGrain,
    Membership, SiloAddress, SiloGrain, SiloProperties, SiloRuntimeStatistics, SiloStatus,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Recorded state of a cluster.
///
/// Per-silo tables are keyed by the silo's parsable address string, the
/// tracing table by grain type name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSnapshot {
    pub counters: DashboardCounters,
    pub membership: Membership,
    pub runtime_statistics: BTreeMap<String, SiloRuntimeStatistics>,
    pub historical_statistics: BTreeMap<String, Vec<SiloRuntimeStatistics>>,
    pub silo_properties: BTreeMap<String, SiloProperties>,
    pub grain_tracing: BTreeMap<String, GrainTracing>,
}

/// [`GrainFactory`] answering every grain call from a [`ClusterSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotCluster {
    snapshot: Arc<ClusterSnapshot>,
}

impl SnapshotCluster {
    #[must_use]
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    /// Parse a YAML (or JSON) snapshot document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match [`ClusterSnapshot`].
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let snapshot: ClusterSnapshot =
            serde_yaml::from_str(source).context("Failed to parse cluster snapshot")?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cluster snapshot {}", path.display()))?;
        let cluster = Self::from_yaml_str(&source)
            .with_context(|| format!("Invalid cluster snapshot {}", path.display()))?;
        info!(
            path = %path.display(),
            silos = cluster.snapshot.membership.len(),
            grain_types = cluster.snapshot.grain_tracing.len(),
            "Cluster snapshot loaded"
        );
        Ok(cluster)
    }

    #[must_use]
    pub fn snapshot(&self) -> &ClusterSnapshot {
        &self.snapshot
    }
}

impl DashboardGrain for SnapshotCluster {
    fn get_counters(&self) -> Result<DashboardCounters, GrainError> {
        Ok(self.snapshot.counters.clone())
    }

    fn get_grain_tracing(&self, grain_type: &str) -> Result<GrainTracing, GrainError> {
        Ok(self
            .snapshot
            .grain_tracing
            .get(grain_type)
            .cloned()
            .unwrap_or_default())
    }
}

impl ManagementGrain for SnapshotCluster {
    fn get_hosts(&self, only_active: bool) -> Result<Membership, GrainError> {
        Ok(self
            .snapshot
            .membership
            .iter()
            .filter(|(_, status)| !only_active || **status == SiloStatus::Active)
            .map(|(addr, status)| (addr.clone(), *status))
            .collect())
    }

    fn get_runtime_statistics(
        &self,
        silos: &[SiloAddress],
    ) -> Result<Vec<SiloRuntimeStatistics>, GrainError> {
        silos
            .iter()
            .map(|silo| {
                self.snapshot
                    .runtime_statistics
                    .get(&silo.to_string())
                    .cloned()
                    .ok_or_else(|| GrainError::Remote {
                        grain: "ManagementGrain".to_string(),
                        method: "GetRuntimeStatistics".to_string(),
                        message: format!("silo {silo} has not reported statistics"),
                    })
            })
            .collect()
    }
}

struct SnapshotSiloGrain {
    snapshot: Arc<ClusterSnapshot>,
    silo: String,
}

impl SiloGrain for SnapshotSiloGrain {
    fn get_runtime_statistics(&self) -> Result<Vec<SiloRuntimeStatistics>, GrainError> {
        Ok(self
            .snapshot
            .historical_statistics
            .get(&self.silo)
            .cloned()
            .unwrap_or_default())
    }

    fn get_extended_properties(&self) -> Result<SiloProperties, GrainError> {
        Ok(self
            .snapshot
            .silo_properties
            .get(&self.silo)
            .cloned()
            .unwrap_or_default())
    }
}

impl GrainFactory for SnapshotCluster {
    fn dashboard_grain(&self) -> Arc<dyn DashboardGrain> {
        Arc::new(self.clone())
    }

    fn management_grain(&self) -> Arc<dyn ManagementGrain> {
        Arc::new(self.clone())
    }

    fn silo_grain(&self, silo: &str) -> Arc<dyn SiloGrain> {
        Arc::new(SnapshotSiloGrain {
            snapshot: Arc::clone(&self.snapshot),
            silo: silo.to_string(),
        })
    }
}
