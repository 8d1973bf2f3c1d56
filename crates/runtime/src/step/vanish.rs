//! Bullet removal.

/// Requests removal of the owning bullet. Done as soon as it runs.
#[derive(Debug, Default)]
pub struct VanishStep {
    triggered: bool,
}

impl VanishStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.triggered
    }

    pub(crate) fn trigger(&mut self) {
        self.triggered = true;
    }

    pub fn reset(&mut self) {
        self.triggered = false;
    }
}
