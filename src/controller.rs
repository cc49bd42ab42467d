//! # Dashboard Controller
//!
//! The seven dashboard endpoints. Each handler resolves grain references
//! through the [`GrainFactory`], runs the grain calls on the designated
//! context via the [`Dispatcher`], and writes the result with one of the
//! `return_*` operations.
//!
//! | Pattern                     | Handler            |
//! |-----------------------------|--------------------|
//! | `/`                         | embedded page      |
//! | `/index.min.js`             | embedded script    |
//! | `/DashboardCounters`        | counters           |
//! | `/RuntimeStats/:address`    | runtime statistics |
//! | `/HistoricalStats/:address` | history series     |
//! | `/GrainStats/:grain`        | grain tracing      |
//! | `/SiloProperties/:address`  | silo properties    |
//!
//! Grain failures propagate to the service boundary unchanged; handlers
//! never produce a partial response.

use crate::cluster::{GrainFactory, ManagementGrain, SiloAddress, SiloRuntimeStatistics};
use crate::dispatcher::Dispatcher;
use crate::error::DashboardError;
use crate::router::{param, ParamVec, RouteError, RouteTable};
use crate::server::response::{
    return_file, return_json, HttpContext, HTML_CONTENT_TYPE, JAVASCRIPT_CONTENT_TYPE,
};
use crate::static_files::AssetLoader;
use std::fmt;
use std::sync::Arc;

/// Route handler signature stored in the route table.
pub type Handler =
    fn(&DashboardController, &mut HttpContext, &ParamVec) -> Result<(), DashboardError>;

/// Dependencies shared by every dashboard endpoint.
#[derive(Clone)]
pub struct DashboardController {
    factory: Arc<dyn GrainFactory>,
    dispatcher: Dispatcher,
    assets: Arc<dyn AssetLoader>,
}

impl DashboardController {
    pub fn new(
        factory: Arc<dyn GrainFactory>,
        dispatcher: Dispatcher,
        assets: Arc<dyn AssetLoader>,
    ) -> Self {
        Self {
            factory,
            dispatcher,
            assets,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Build the dashboard route table, in registration order.
    ///
    /// # Errors
    ///
    /// Only if one of the built-in patterns is malformed.
    pub fn routes() -> Result<RouteTable<Handler>, RouteError> {
        let mut table: RouteTable<Handler> = RouteTable::new();
        table.register("/", index)?;
        table.register("/index.min.js", index_js)?;
        table.register("/DashboardCounters", counters)?;
        table.register("/RuntimeStats/:address", runtime_stats)?;
        table.register("/HistoricalStats/:address", historical_stats)?;
        table.register("/GrainStats/:grain", grain_stats)?;
        table.register("/SiloProperties/:address", silo_properties)?;
        Ok(table)
    }
}

impl fmt::Debug for DashboardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardController")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

fn required<'a>(params: &'a ParamVec, name: &'static str) -> Result<&'a str, DashboardError> {
    param(params, name).ok_or(DashboardError::MissingParameter(name))
}

fn index(
    c: &DashboardController,
    ctx: &mut HttpContext,
    _params: &ParamVec,
) -> Result<(), DashboardError> {
    return_file(ctx, c.assets.as_ref(), "Index.html", HTML_CONTENT_TYPE)
}

fn index_js(
    c: &DashboardController,
    ctx: &mut HttpContext,
    _params: &ParamVec,
) -> Result<(), DashboardError> {
    return_file(ctx, c.assets.as_ref(), "index.min.js", JAVASCRIPT_CONTENT_TYPE)
}

fn counters(
    c: &DashboardController,
    ctx: &mut HttpContext,
    _params: &ParamVec,
) -> Result<(), DashboardError> {
    let grain = c.factory.dashboard_grain();
    let counters = c
        .dispatcher
        .dispatch(move || grain.get_counters().map_err(DashboardError::from))?;
    return_json(ctx, &counters)
}

/// Latest statistics for one silo, or `null` when it is not an active member.
fn runtime_stats(
    c: &DashboardController,
    ctx: &mut HttpContext,
    params: &ParamVec,
) -> Result<(), DashboardError> {
    let address: SiloAddress = required(params, "address")?.parse()?;
    let management = c.factory.management_grain();
    let stats = c
        .dispatcher
        .dispatch(move || active_silo_statistics(management.as_ref(), &address))?;
    return_json(ctx, &stats)
}

/// Runs on the designated context.
fn active_silo_statistics(
    management: &dyn ManagementGrain,
    address: &SiloAddress,
) -> Result<Option<SiloRuntimeStatistics>, DashboardError> {
    let hosts = management.get_hosts(true)?;
    if !hosts.contains_key(address) {
        return Ok(None);
    }
    let stats = management.get_runtime_statistics(std::slice::from_ref(address))?;
    // A member that reports nothing answers `null`, same as a non-member.
    Ok(stats.into_iter().next())
}

fn historical_stats(
    c: &DashboardController,
    ctx: &mut HttpContext,
    params: &ParamVec,
) -> Result<(), DashboardError> {
    let grain = c.factory.silo_grain(required(params, "address")?);
    let history = c
        .dispatcher
        .dispatch(move || grain.get_runtime_statistics().map_err(DashboardError::from))?;
    return_json(ctx, &history)
}

fn grain_stats(
    c: &DashboardController,
    ctx: &mut HttpContext,
    params: &ParamVec,
) -> Result<(), DashboardError> {
    let grain_type = required(params, "grain")?.to_string();
    let grain = c.factory.dashboard_grain();
    let tracing = c.dispatcher.dispatch(move || {
        grain
            .get_grain_tracing(&grain_type)
            .map_err(DashboardError::from)
    })?;
    return_json(ctx, &tracing)
}

fn silo_properties(
    c: &DashboardController,
    ctx: &mut HttpContext,
    params: &ParamVec,
) -> Result<(), DashboardError> {
    let grain = c.factory.silo_grain(required(params, "address")?);
    let properties = c
        .dispatcher
        .dispatch(move || grain.get_extended_properties().map_err(DashboardError::from))?;
    return_json(ctx, &properties)
}
