use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub elapsed: Duration,
    pub memory_usage_mb: Option<u64>,
    pub peak_memory_mb: Option<u64>,
}

/// Times pipeline stages and, with the `cli` feature, samples process memory.
pub struct StageMonitor {
    enabled: bool,
    started: Instant,
    last_mark: Mutex<Instant>,
    #[cfg(feature = "cli")]
    system: Mutex<System>,
    #[cfg(feature = "cli")]
    pid: Option<Pid>,
    #[cfg(feature = "cli")]
    peak_memory_mb: Mutex<u64>,
}

impl StageMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            last_mark: Mutex::new(now),
            #[cfg(feature = "cli")]
            system: Mutex::new(System::new()),
            #[cfg(feature = "cli")]
            pid: sysinfo::get_current_pid().ok(),
            #[cfg(feature = "cli")]
            peak_memory_mb: Mutex::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Closes the current stage and returns its stats; `None` when disabled.
    pub fn mark(&self, stage: &str) -> Option<StageStats> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        let elapsed = {
            let mut last = self.last_mark.lock().ok()?;
            let elapsed = now.duration_since(*last);
            *last = now;
            elapsed
        };

        let (memory_usage_mb, peak_memory_mb) = self.sample_memory();

        let stats = StageStats {
            stage: stage.to_string(),
            elapsed,
            memory_usage_mb,
            peak_memory_mb,
        };

        match stats.memory_usage_mb {
            Some(memory) => tracing::info!(
                "📊 {} - Time: {:?}, Memory: {}MB, Peak: {}MB",
                stats.stage,
                stats.elapsed,
                memory,
                stats.peak_memory_mb.unwrap_or(memory)
            ),
            None => tracing::info!("📊 {} - Time: {:?}", stats.stage, stats.elapsed),
        }

        Some(stats)
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let (_, peak) = self.sample_memory();
        match peak {
            Some(peak) => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                self.started.elapsed(),
                peak
            ),
            None => tracing::info!("📊 Final Stats - Total Time: {:?}", self.started.elapsed()),
        }
    }

    #[cfg(feature = "cli")]
    fn sample_memory(&self) -> (Option<u64>, Option<u64>) {
        let Some(pid) = self.pid else {
            return (None, None);
        };
        let Ok(mut system) = self.system.lock() else {
            return (None, None);
        };
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let Some(process) = system.process(pid) else {
            return (None, None);
        };
        let memory_mb = process.memory() / 1024 / 1024;

        let Ok(mut peak) = self.peak_memory_mb.lock() else {
            return (Some(memory_mb), None);
        };
        if memory_mb > *peak {
            *peak = memory_mb;
        }
        (Some(memory_mb), Some(*peak))
    }

    #[cfg(not(feature = "cli"))]
    fn sample_memory(&self) -> (Option<u64>, Option<u64>) {
        (None, None)
    }
}

impl Default for StageMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
