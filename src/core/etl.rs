use crate::domain::model::RunOutcome;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::StageMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: StageMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: StageMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting candidate pipeline");

        // Extract
        tracing::info!("🔍 Resolving template...");
        let template = self.pipeline.extract().await?;
        self.monitor.mark("Extract");

        // Transform
        tracing::info!("🧬 Generating candidates...");
        let candidates = self.pipeline.transform(template).await?;
        tracing::info!(
            "🔄 {} candidates scored, {} rejected",
            candidates.candidates.len(),
            candidates.failed.len()
        );
        self.monitor.mark("Transform");

        // Load
        tracing::info!("💾 Writing artifacts...");
        let outcome = self.pipeline.load(candidates).await?;
        self.monitor.mark("Load");
        self.monitor.log_final_stats();

        tracing::info!(
            "✅ {} finished: {} candidates written to {}",
            outcome.run_id,
            outcome.candidates_written,
            outcome.output_dir.display()
        );

        Ok(outcome)
    }
}
