pub type ModuleId = u32;
pub type Channel = u32;
pub type Timestamp = u64;
pub type TimeDiff = i64;

/// Hard ceiling on addressable modules. Timing window tables are sized
/// to this, and module ids read from data must stay below the
/// configured module count, which itself must stay below this.
pub const MAX_MODULES: usize = 128;

pub const DEFAULT_MODULE_COUNT: usize = 8;
pub const DEFAULT_TABLE_SIZE: usize = 20;
