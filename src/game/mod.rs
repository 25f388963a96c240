pub mod play;
pub mod settings;
