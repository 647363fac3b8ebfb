/// Снимок состояния пула. Только для наблюдения, не для управления.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    pub num_threads: usize,
    pub active_tasks: usize,
    pub queued_tasks: usize,
    pub total_spawned: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.num_threads == 0 {
            return 0.0;
        }
        self.active_tasks as f64 / self.num_threads as f64
    }

    pub fn queue_pressure(&self) -> f64 {
        if self.num_threads == 0 {
            return 0.0;
        }
        self.queued_tasks as f64 / self.num_threads as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed_tasks + self.failed_tasks;
        if total == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / total as f64
    }
}
