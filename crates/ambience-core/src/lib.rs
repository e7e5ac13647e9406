pub mod analysis;
pub mod config;
pub mod error;
pub mod events;
pub mod library;
pub mod output;
pub mod player;
pub mod playlist;
pub mod status;
