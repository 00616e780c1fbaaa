pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod render;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONFIG_FILE: &str = "config.toml";
pub const POSTS_DIR: &str = "_posts";
pub const SITE_DIR: &str = "_site";
pub const INCLUDES_DIR: &str = "_includes";
pub const LAYOUTS_DIR: &str = "_layouts";
