pub mod header;
pub mod missed;
pub mod next_prayer;
pub mod prayers;
pub mod statusbar;
