use autotheme_app::ports::PowerStatus;

/// Energy-saver flag fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPowerStatus {
    energy_saver: bool,
}

impl FixedPowerStatus {
    #[must_use]
    pub fn new(energy_saver: bool) -> Self {
        Self { energy_saver }
    }
}

impl PowerStatus for FixedPowerStatus {
    fn energy_saver_active(&self) -> bool {
        self.energy_saver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_configured_flag() {
        assert!(FixedPowerStatus::new(true).energy_saver_active());
        assert!(!FixedPowerStatus::default().energy_saver_active());
    }
}
