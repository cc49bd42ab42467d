//! Values returned by the cluster grains.
//!
//! These are produced by the actor runtime and only passed through to the
//! JSON response; nothing here is computed by the dashboard.

use super::address::SiloAddress;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Liveness status of a silo in the membership table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiloStatus {
    None,
    Created,
    Joining,
    Active,
    ShuttingDown,
    Stopping,
    Dead,
}

/// Membership mapping as returned by the management grain.
pub type Membership = HashMap<SiloAddress, SiloStatus>;

/// One row of the host table on the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiloDetails {
    pub silo_address: SiloAddress,
    pub status: SiloStatus,
    #[serde(default)]
    pub fault_zone: Option<i32>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// Per grain-type activation count on one silo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleGrainStatistic {
    pub grain_type: String,
    pub silo_address: SiloAddress,
    pub activation_count: u64,
    #[serde(default)]
    pub total_awaiting_requests: u64,
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub calls_per_second: f64,
    #[serde(default)]
    pub total_seconds: f64,
    #[serde(default)]
    pub total_exceptions: u64,
}

/// Aggregate counters served by `/DashboardCounters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardCounters {
    pub total_active_host_count: u32,
    pub total_active_grain_count: u64,
    pub hosts: Vec<SiloDetails>,
    pub simple_grain_stats: Vec<SimpleGrainStatistic>,
    pub total_active_host_count_history: Vec<u32>,
    pub total_active_grain_count_history: Vec<u64>,
}

/// Point-in-time runtime statistics of one silo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiloRuntimeStatistics {
    pub activation_count: u64,
    pub recently_used_activation_count: u64,
    pub cpu_usage: Option<f32>,
    pub available_memory: Option<u64>,
    pub memory_usage: u64,
    pub total_physical_memory: Option<u64>,
    pub is_overloaded: bool,
    pub client_count: u64,
    pub received_messages: u64,
    pub sent_messages: u64,
    pub date_time: Option<String>,
}

/// Call statistics of one grain method over one sampling period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrainTraceEntry {
    pub period_key: String,
    #[serde(default)]
    pub period: Option<String>,
    pub silo_address: SiloAddress,
    pub grain: String,
    pub method: String,
    pub count: u64,
    #[serde(default)]
    pub exception_count: u64,
    #[serde(default)]
    pub elapsed_time: f64,
}

/// Tracing series for one grain type, keyed by method.
pub type GrainTracing = BTreeMap<String, Vec<GrainTraceEntry>>;

/// Free-form extended properties reported by a silo.
pub type SiloProperties = BTreeMap<String, String>;
