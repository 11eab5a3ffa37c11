//! Strategist chain driver

use crate::config::BottleConfig;
use crate::execution::strategies::{
    BaseStrategist, GamescopeStrategist, GpuStrategist, GraphicsStrategist, RunnerStrategist,
    RuntimeStrategist, SyncStrategist, ToolWrapperStrategist, UmuStrategist, WaylandStrategist,
};
use crate::execution::types::{ExecutionContext, Strategist};
use crate::host::LaunchHost;

/// Ordered strategists, fixed at construction
pub struct ExecutionPipeline<'h> {
    strategists: Vec<Box<dyn Strategist + 'h>>,
}

impl<'h> ExecutionPipeline<'h> {
    /// The standard chain for launching a bottle program on `host`
    pub fn new(host: &'h LaunchHost) -> Self {
        Self::with_strategists(vec![
            Box::new(BaseStrategist::new(host)),
            Box::new(RunnerStrategist::new(host)),
            Box::new(WaylandStrategist::new(host)),
            Box::new(GraphicsStrategist::new(host)),
            Box::new(GpuStrategist::new(host)),
            Box::new(SyncStrategist::new(host)),
            Box::new(RuntimeStrategist::new(host)),
            Box::new(UmuStrategist::new(host)),
            Box::new(GamescopeStrategist::new(host)),
            Box::new(ToolWrapperStrategist::new(host)),
        ])
    }

    pub fn with_strategists(strategists: Vec<Box<dyn Strategist + 'h>>) -> Self {
        Self { strategists }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategists.iter().map(|s| s.name()).collect()
    }

    /// Apply every strategist in order
    ///
    /// A failing strategist is logged and skipped; the rest still run.
    /// Returns the names of the strategists that failed.
    pub fn run(&self, ctx: &mut ExecutionContext, config: &BottleConfig) -> Vec<&'static str> {
        let mut failed = Vec::new();
        for strategist in &self.strategists {
            if let Err(e) = strategist.apply(ctx, config) {
                tracing::error!("execution - strategist {} failed: {}", strategist.name(), e);
                failed.push(strategist.name());
            }
        }
        tracing::debug!(
            "execution - resolved {} env vars for {}",
            ctx.env().len(),
            config.name
        );
        failed
    }
}
