/// Engine configuration constants and tunable parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Upper bound on repeat-body executions unrolled inside one tick for one
    /// bullet. When reached, the pattern yields and resumes on the next tick.
    pub max_iterations_per_tick: usize,

    /// Upper bound on action nesting while a step tree is built. Guards
    /// against actions that reference themselves.
    pub max_nesting_depth: usize,

    /// Speed used by a fire with no speed of its own and nothing to inherit.
    pub default_speed: f32,
}

impl EngineConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ITERATIONS_PER_TICK: usize = 4096;
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;
    pub const DEFAULT_SPEED: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            max_iterations_per_tick: Self::DEFAULT_MAX_ITERATIONS_PER_TICK,
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
            default_speed: Self::DEFAULT_SPEED,
        }
    }

    pub fn with_max_iterations_per_tick(mut self, max_iterations_per_tick: usize) -> Self {
        self.max_iterations_per_tick = max_iterations_per_tick;
        self
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    pub fn with_default_speed(mut self, default_speed: f32) -> Self {
        self.default_speed = default_speed;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
