//! Build information attached to every log record.

pub const NAME: &str = "recipes";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REVISION: Option<&str> = option_env!("RECIPES_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("RECIPES_BUILD_TIMESTAMP");
