use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use url::Url;

use keel_core::{KeelError, ProfileName, Secret};

use crate::env::{EnvProvider, ProcessEnv};
use crate::schema::{
    CompilerSettings, Configuration, CredentialSlot, Manifest, NetworkManifest, NetworkProfile,
    WarningSeverity,
};

/// The manifest compiled into the program.
pub const MANIFEST: &str = include_str!("../keel.toml");

const ENDPOINT_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

static GLOBAL: OnceCell<Configuration> = OnceCell::new();

/// Builds a [`Configuration`] from the manifest and an environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the built-in manifest against `env`.
    ///
    /// Missing credentials are not an error here; they surface when a
    /// profile is resolved for deployment.
    pub fn load(env: &dyn EnvProvider) -> keel_core::Result<Configuration> {
        Self::from_manifest(MANIFEST, env)
    }

    /// Resolve an explicit manifest source against `env`.
    pub fn from_manifest(source: &str, env: &dyn EnvProvider) -> keel_core::Result<Configuration> {
        let manifest = Manifest::parse(source)?;
        let compiler = Self::check_compiler(manifest.compiler)?;

        let mut declared: BTreeMap<ProfileName, NetworkManifest> = BTreeMap::new();
        for (name, network) in manifest.networks {
            declared.insert(name.parse()?, network);
        }

        let mut profiles = BTreeMap::new();
        for name in ProfileName::ALL {
            let network = declared.remove(&name).ok_or_else(|| KeelError::ConfigValidation {
                field: format!("networks.{name}"),
                reason: "profile is not declared".into(),
            })?;
            profiles.insert(name, Self::resolve_network(name, network, env)?);
        }

        let config = Configuration::new(compiler, profiles);
        for w in config.validate() {
            match w.severity {
                WarningSeverity::Warning => warn!("{}", w),
                WarningSeverity::Info => debug!("{}", w),
            }
        }
        info!(
            compiler = %config.compiler().language_version,
            evm = config.compiler().evm_version.as_str(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn check_compiler(compiler: CompilerSettings) -> keel_core::Result<CompilerSettings> {
        if compiler.optimizer.runs == 0 {
            return Err(KeelError::ConfigValidation {
                field: "compiler.optimizer.runs".into(),
                reason: "runs must be a positive integer".into(),
            });
        }
        if !compiler.evm_version.supported_by(&compiler.language_version) {
            return Err(KeelError::ConfigValidation {
                field: "compiler.evm_version".into(),
                reason: format!(
                    "{} requires compiler {} or newer, configured {}",
                    compiler.evm_version.as_str(),
                    compiler.evm_version.min_compiler(),
                    compiler.language_version
                ),
            });
        }
        Ok(compiler)
    }

    fn resolve_network(
        name: ProfileName,
        network: NetworkManifest,
        env: &dyn EnvProvider,
    ) -> keel_core::Result<NetworkProfile> {
        let endpoint = Self::parse_endpoint(name, &network.url)?;

        if network.accounts.is_empty() {
            return Err(KeelError::ConfigValidation {
                field: format!("networks.{name}.accounts"),
                reason: "at least one account variable must be declared".into(),
            });
        }

        let mut credentials = Vec::with_capacity(network.accounts.len());
        for var in network.accounts {
            if var.trim().is_empty() {
                return Err(KeelError::ConfigValidation {
                    field: format!("networks.{name}.accounts"),
                    reason: "account variable name is empty".into(),
                });
            }
            // An empty value cannot sign anything.
            let value = env.var(&var).filter(|v| !v.is_empty()).map(Secret::from);
            debug!(profile = %name, env = %var, present = value.is_some(), "credential slot");
            credentials.push(CredentialSlot::new(var, value));
        }

        Ok(NetworkProfile {
            name,
            chain: network.chain,
            chain_id: network.chain_id,
            endpoint,
            credentials,
        })
    }

    fn parse_endpoint(name: ProfileName, raw: &str) -> keel_core::Result<Url> {
        let malformed = |reason: String| KeelError::MalformedEndpoint {
            profile: name.to_string(),
            url: raw.to_string(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| malformed(e.to_string()))?;
        if !ENDPOINT_SCHEMES.contains(&url.scheme()) {
            return Err(malformed(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(malformed("missing host".into()));
        }
        Ok(url)
    }
}

impl Configuration {
    /// The process-wide configuration, loaded from the process environment
    /// on first use.
    ///
    /// Concurrent first callers block until one of them finishes, so the
    /// environment is read once and every caller gets the same instance. A
    /// failed load is returned to the caller that attempted it and the next
    /// call tries again.
    pub fn global() -> keel_core::Result<&'static Configuration> {
        GLOBAL.get_or_try_init(|| ConfigLoader::load(&ProcessEnv))
    }
}
