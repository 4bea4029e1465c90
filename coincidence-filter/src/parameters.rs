use crate::error::ConfigError;
use anyhow::{Error, anyhow};
use clap::ValueEnum;
use listmode_common::{MAX_MODULES, ModuleId, TimeDiff};
use std::str::FromStr;

/// Selects which field(s) each module contributes to an output row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, strum::Display)]
pub(crate) enum OutputMode {
    /// Channel per module
    #[default]
    #[strum(to_string = "raw")]
    Raw,
    /// Timestamp per module
    #[strum(to_string = "timestamps")]
    Timestamps,
    /// Channel and timestamp per module
    #[strum(to_string = "channel-and-time")]
    ChannelAndTime,
    /// Channel and signed tick offset from the trigger timestamp
    #[strum(to_string = "channel-and-timediff")]
    ChannelAndTimediff,
}

/// The validated configuration the engine consumes. Built by the CLI
/// layer, checked once before the run starts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    pub(crate) module_count: usize,
    pub(crate) trigger_module: ModuleId,
    pub(crate) capacity: usize,
    pub(crate) output_mode: OutputMode,
    /// Stop after this many rows; zero means unbounded.
    pub(crate) max_output_rows: u64,
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity <= 1 {
            return Err(ConfigError::TableTooSmall(self.capacity));
        }
        if !(2..MAX_MODULES - 1).contains(&self.module_count) {
            return Err(ConfigError::ModuleCountOutOfBounds {
                got: self.module_count,
            });
        }
        if self.trigger_module as usize >= self.module_count {
            return Err(ConfigError::TriggerOutOfRange {
                trigger: self.trigger_module,
                module_count: self.module_count,
            });
        }
        Ok(())
    }
}

/// Per-module inclusive `[low, high]` tick offsets relative to the
/// trigger timestamp. Unconfigured modules default to `[0, 0]`.
pub(crate) struct TimingWindows {
    low: Vec<TimeDiff>,
    high: Vec<TimeDiff>,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self {
            low: vec![0; MAX_MODULES],
            high: vec![0; MAX_MODULES],
        }
    }
}

impl TimingWindows {
    pub(crate) fn set_low(
        &mut self,
        module: ModuleId,
        ticks: TimeDiff,
    ) -> Result<(), ConfigError> {
        let entry = self
            .low
            .get_mut(module as usize)
            .ok_or(ConfigError::WindowModuleOutOfRange(module))?;
        *entry = ticks;
        Ok(())
    }

    pub(crate) fn set_high(
        &mut self,
        module: ModuleId,
        ticks: TimeDiff,
    ) -> Result<(), ConfigError> {
        let entry = self
            .high
            .get_mut(module as usize)
            .ok_or(ConfigError::WindowModuleOutOfRange(module))?;
        *entry = ticks;
        Ok(())
    }

    pub(crate) fn contains(&self, module: ModuleId, diff: TimeDiff) -> bool {
        match (self.low.get(module as usize), self.high.get(module as usize)) {
            (Some(low), Some(high)) => (*low..=*high).contains(&diff),
            _ => false,
        }
    }
}

/// A `MODULE,TICKS` pair from the command line, setting one edge of a
/// module's timing window.
#[derive(Debug, Clone)]
pub(crate) struct WindowBound {
    pub(crate) module: ModuleId,
    pub(crate) ticks: TimeDiff,
}

impl FromStr for WindowBound {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals: Vec<_> = s.split(',').collect();
        if vals.len() == 2 {
            Ok(WindowBound {
                module: ModuleId::from_str(vals[0])?,
                ticks: TimeDiff::from_str(vals[1])?,
            })
        } else {
            Err(anyhow!(
                "Incorrect number of parameters in window bound, expected pattern '*,*', got '{s}'"
            ))
        }
    }
}
