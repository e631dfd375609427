//! CLI command implementations

pub mod collection;
pub mod completions;
pub mod config;
pub mod discover;
pub mod fetch;
pub mod install;
pub mod reset;
pub mod show;
pub mod status;

pub use collection::execute as collection;
pub use completions::execute as completions;
pub use config::execute as config;
pub use discover::execute as discover;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use reset::execute as reset;
pub use show::execute as show;
pub use status::execute as status;
