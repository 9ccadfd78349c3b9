//! Unified configuration layer.
//!
//! All environment variable reads are centralised here; the rest of the
//! workspace goes through the typed structs instead of calling `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `BootstrapConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants (with legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{BootstrapConfig, ObservabilityConfig};
