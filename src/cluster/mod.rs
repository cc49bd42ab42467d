//! # Cluster Module
//!
//! Boundary to the actor runtime hosting the cluster. The dashboard never
//! computes statistics itself; it resolves grain references through a
//! [`GrainFactory`] and calls their query methods.
//!
//! Every method on the grain traits must be invoked from inside a unit passed
//! to [`crate::dispatcher::Dispatcher::dispatch`], never directly from a
//! request coroutine. Resolving a reference is cheap and may happen outside.
//!
//! [`SnapshotCluster`] is a file-backed implementation used by the `serve`
//! command and by tests.

mod address;
mod model;
mod snapshot;

pub use address::{AddressParseError, SiloAddress};
pub use model::{
    DashboardCounters, GrainTraceEntry, GrainTracing, Membership, SiloDetails, SiloProperties,
    SiloRuntimeStatistics, SiloStatus, SimpleGrainStatistic,
};
pub use snapshot::{ClusterSnapshot, SnapshotCluster};

use std::fmt;
use std::sync::Arc;

/// Failure reported by a grain call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrainError {
    /// The grain could not be reached or activated
    Unavailable { grain: String, reason: String },
    /// The grain method ran and returned an error
    Remote {
        grain: String,
        method: String,
        message: String,
    },
}

impl fmt::Display for GrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrainError::Unavailable { grain, reason } => {
                write!(f, "grain '{grain}' unavailable: {reason}")
            }
            GrainError::Remote {
                grain,
                method,
                message,
            } => write!(f, "grain '{grain}' failed in {method}: {message}"),
        }
    }
}

impl std::error::Error for GrainError {}

/// Cluster-wide dashboard aggregator (a singleton grain).
pub trait DashboardGrain: Send + Sync {
    fn get_counters(&self) -> Result<DashboardCounters, GrainError>;
    fn get_grain_tracing(&self, grain_type: &str) -> Result<GrainTracing, GrainError>;
}

/// The runtime's management grain.
pub trait ManagementGrain: Send + Sync {
    /// Current membership; `only_active` restricts it to active silos.
    fn get_hosts(&self, only_active: bool) -> Result<Membership, GrainError>;

    /// Runtime statistics for each requested silo, in request order.
    fn get_runtime_statistics(
        &self,
        silos: &[SiloAddress],
    ) -> Result<Vec<SiloRuntimeStatistics>, GrainError>;
}

/// Per-silo grain keyed by the silo's address string.
pub trait SiloGrain: Send + Sync {
    /// Historical statistics series, oldest first.
    fn get_runtime_statistics(&self) -> Result<Vec<SiloRuntimeStatistics>, GrainError>;
    fn get_extended_properties(&self) -> Result<SiloProperties, GrainError>;
}

/// Resolves grain references by identity.
pub trait GrainFactory: Send + Sync {
    fn dashboard_grain(&self) -> Arc<dyn DashboardGrain>;
    fn management_grain(&self) -> Arc<dyn ManagementGrain>;
    fn silo_grain(&self, silo: &str) -> Arc<dyn SiloGrain>;
}
