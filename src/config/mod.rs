mod loader;

pub use loader::{ChecksConfig, Config, HelperPattern};
