pub mod handlers;
pub mod keysyms;

pub use handlers::{
    Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding, handle_button_press, handle_key_press,
};
