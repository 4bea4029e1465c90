use listmode_common::{MAX_MODULES, ModuleId};
use thiserror::Error;

/// Fatal pre-run validation failures. The engine never starts and no
/// output rows are produced.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("coincidence table size must be larger than 1, got {0}")]
    TableTooSmall(usize),
    #[error("module count must be higher than 1 but lower than {max}, got {got}", max = MAX_MODULES - 1)]
    ModuleCountOutOfBounds { got: usize },
    #[error("trigger module {trigger} is not below the module count {module_count}")]
    TriggerOutOfRange {
        trigger: ModuleId,
        module_count: usize,
    },
    #[error("timing window set for module {0}, which is not below {MAX_MODULES}")]
    WindowModuleOutOfRange(ModuleId),
}
