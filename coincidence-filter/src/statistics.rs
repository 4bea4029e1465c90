use listmode_common::ModuleId;
use tracing::info;

/// Per-run counters, owned and mutated only by the engine, reported
/// once at shutdown.
#[derive(Debug)]
pub(crate) struct RunStatistics {
    pub(crate) lines_read: u64,
    pub(crate) coincidences_found: u64,
    events_seen: Vec<u64>,
    events_in_coincidence: Vec<u64>,
}

impl RunStatistics {
    pub(crate) fn new(module_count: usize) -> Self {
        Self {
            lines_read: 0,
            coincidences_found: 0,
            events_seen: vec![0; module_count],
            events_in_coincidence: vec![0; module_count],
        }
    }

    pub(crate) fn record_seen(&mut self, module: ModuleId) {
        if let Some(count) = self.events_seen.get_mut(module as usize) {
            *count += 1;
        }
    }

    pub(crate) fn record_matched(&mut self, module: usize) {
        if let Some(count) = self.events_in_coincidence.get_mut(module) {
            *count += 1;
        }
    }

    pub(crate) fn events_seen(&self, module: ModuleId) -> u64 {
        self.events_seen
            .get(module as usize)
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn events_in_coincidence(&self, module: ModuleId) -> u64 {
        self.events_in_coincidence
            .get(module as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Logs the final tallies. Modules that never appeared in the
    /// input are omitted.
    pub(crate) fn report(&self) {
        info!(
            "{} lines read, {} coincidences found",
            self.lines_read, self.coincidences_found
        );
        for (module, (&seen, &matched)) in self
            .events_seen
            .iter()
            .zip(&self.events_in_coincidence)
            .enumerate()
        {
            if seen > 0 {
                let percent = 100.0 * matched as f64 / seen as f64;
                info!("module {module}: {seen} events, {matched} in coincidences ({percent:.1}%)");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_per_module() {
        let mut stats = RunStatistics::new(2);
        stats.record_seen(0);
        stats.record_seen(0);
        stats.record_seen(1);
        stats.record_matched(1);
        assert_eq!(stats.events_seen(0), 2);
        assert_eq!(stats.events_seen(1), 1);
        assert_eq!(stats.events_in_coincidence(0), 0);
        assert_eq!(stats.events_in_coincidence(1), 1);
    }

    #[test]
    fn out_of_range_modules_are_ignored() {
        let mut stats = RunStatistics::new(2);
        stats.record_seen(9);
        stats.record_matched(9);
        assert_eq!(stats.events_seen(9), 0);
        assert_eq!(stats.events_in_coincidence(9), 0);
    }
}
