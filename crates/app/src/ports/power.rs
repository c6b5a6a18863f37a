//! Power port: battery/energy-saver state of the device.

/// Reports whether the device runs on battery with the energy saver on.
pub trait PowerStatus {
    fn energy_saver_active(&self) -> bool;
}
