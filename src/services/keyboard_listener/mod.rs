mod keyboard_listener;
mod modifier_state;

pub use self::keyboard_listener::KeyboardListener;
