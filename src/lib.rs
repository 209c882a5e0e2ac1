pub mod app;
pub mod audio;
pub mod command;
pub mod config;
pub mod display;
pub mod kiosk;
pub mod library;
pub mod overlay;
pub mod playback;
pub mod stt;
