//! EBVM Configuration
//!
//! Runtime knobs for the engine. Nothing here changes instruction
//! semantics; it only controls paging, randomness and diagnostics.

use crate::loader::reader::PAGE_SIZE;

/// VM Configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Bytes loaded per reader page (clamped to `1..=MAX_PAGE_SIZE`)
    pub page_size: usize,

    /// Fixed seed for the random generator (`None` = OS entropy)
    pub rng_seed: Option<u64>,

    /// Write the machine state to the output before returning a
    /// decode or stack error
    pub dump_on_fatal: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            page_size: PAGE_SIZE,
            rng_seed: None,
            dump_on_fatal: true,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Same configuration with a fixed random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
