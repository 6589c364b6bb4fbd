//! # keel-config
//!
//! Compiler settings and network profiles for Keel. The static literals live
//! in `keel.toml`, compiled into the binary; signing keys come from the
//! environment and are copied once, when the configuration is loaded.
//!
//! Loading checks structure (known profiles, well-formed endpoints, a
//! compiler that supports the EVM target). Credential presence is checked
//! only when a profile is resolved for deployment, so compile-only work runs
//! without any keys set.

pub mod env;
pub mod loader;
pub mod schema;

pub use env::{EnvProvider, MapEnv, ProcessEnv, load_dotenv, load_dotenv_from_dir};
pub use loader::ConfigLoader;
pub use schema::{
    CompilerSettings, ConfigWarning, Configuration, CredentialSlot, DeploymentTarget, EvmVersion,
    NetworkProfile, OptimizerSettings, WarningSeverity,
};
