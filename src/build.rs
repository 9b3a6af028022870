mod assets;
mod builder;
mod paths;
mod source;

pub use builder::Builder;
pub use paths::base_path_from_config;
