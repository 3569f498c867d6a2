pub mod capture_buffer;
pub mod corrector;
pub mod key_classifier;
pub mod keyboard_listener;
pub mod switcher;
pub mod trigger_detector;
pub mod virtual_device;

pub use keyboard_listener::KeyboardListener;
pub use switcher::Switcher;
pub use virtual_device::VirtualDevice;
