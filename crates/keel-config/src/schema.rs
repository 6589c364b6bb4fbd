use keel_core::{KeelError, ProfileName, Secret};
use semver::Version;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use url::Url;

// ── Manifest ───────────────────────────────────────────────────

/// Root of `keel.toml`, the declarative literals compiled into the program.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub compiler: CompilerSettings,
    /// Keyed by profile name; names are checked against [`ProfileName`] when
    /// the manifest is resolved.
    pub networks: BTreeMap<String, NetworkManifest>,
}

/// One `[networks.<name>]` table as written in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkManifest {
    /// Chain label, e.g. "baobab".
    pub chain: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// RPC endpoint. Kept as a string here so a bad literal surfaces as
    /// `MalformedEndpoint` instead of a parse error.
    pub url: String,
    /// Environment variables holding the signing keys, in order.
    pub accounts: Vec<String>,
}

impl Manifest {
    pub fn parse(source: &str) -> keel_core::Result<Self> {
        toml::from_str::<Manifest>(source)
            .map_err(|e| KeelError::Config(format!("failed to parse manifest: {e}")))
    }
}

// ── Compiler ───────────────────────────────────────────────────

/// Settings handed to the contract compiler. One instance per configuration,
/// shared by every network profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSettings {
    /// Solidity compiler version.
    #[serde(rename = "version")]
    pub language_version: Version,
    /// EVM semantics to compile against.
    pub evm_version: EvmVersion,
    pub optimizer: OptimizerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerSettings {
    pub enabled: bool,
    /// Expected number of calls per contract over its lifetime.
    pub runs: u32,
}

impl CompilerSettings {
    /// The `settings` fragment of a solc standard-JSON input.
    pub fn solc_settings(&self) -> serde_json::Value {
        serde_json::json!({
            "evmVersion": self.evm_version.as_str(),
            "optimizer": {
                "enabled": self.optimizer.enabled,
                "runs": self.optimizer.runs,
            },
        })
    }
}

/// EVM hard fork targets, spelled the way solc spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvmVersion {
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    Paris,
    Shanghai,
    Cancun,
}

impl EvmVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvmVersion::Homestead => "homestead",
            EvmVersion::TangerineWhistle => "tangerineWhistle",
            EvmVersion::SpuriousDragon => "spuriousDragon",
            EvmVersion::Byzantium => "byzantium",
            EvmVersion::Constantinople => "constantinople",
            EvmVersion::Petersburg => "petersburg",
            EvmVersion::Istanbul => "istanbul",
            EvmVersion::Berlin => "berlin",
            EvmVersion::London => "london",
            EvmVersion::Paris => "paris",
            EvmVersion::Shanghai => "shanghai",
            EvmVersion::Cancun => "cancun",
        }
    }

    /// Oldest solc release that accepts this target.
    pub fn min_compiler(&self) -> Version {
        let (minor, patch) = match self {
            EvmVersion::Homestead
            | EvmVersion::TangerineWhistle
            | EvmVersion::SpuriousDragon
            | EvmVersion::Byzantium
            | EvmVersion::Constantinople => (4, 21),
            EvmVersion::Petersburg => (5, 5),
            EvmVersion::Istanbul => (5, 13),
            EvmVersion::Berlin => (8, 5),
            EvmVersion::London => (8, 7),
            EvmVersion::Paris => (8, 18),
            EvmVersion::Shanghai => (8, 20),
            EvmVersion::Cancun => (8, 24),
        };
        Version::new(0, minor, patch)
    }

    pub fn supported_by(&self, compiler: &Version) -> bool {
        *compiler >= self.min_compiler()
    }
}

// ── Network profiles ───────────────────────────────────────────

/// A resolved deployment target: endpoint plus the credentials copied from
/// the environment at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    pub name: ProfileName,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub endpoint: Url,
    pub credentials: Vec<CredentialSlot>,
}

/// A signing credential reference. `env` names the variable; the value is
/// whatever that variable held when the configuration was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSlot {
    pub env: String,
    value: Option<Secret>,
}

impl CredentialSlot {
    pub fn new(env: impl Into<String>, value: Option<Secret>) -> Self {
        Self {
            env: env.into(),
            value,
        }
    }

    pub fn value(&self) -> Option<&Secret> {
        self.value.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

// The value itself is never written out.
impl Serialize for CredentialSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CredentialSlot", 2)?;
        s.serialize_field("env", &self.env)?;
        s.serialize_field("present", &self.is_present())?;
        s.end()
    }
}

/// What the deployment side needs from a profile. Only obtainable once every
/// credential slot is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget<'a> {
    pub name: ProfileName,
    pub endpoint: &'a Url,
    pub chain_id: Option<u64>,
    pub credentials: Vec<&'a Secret>,
}

impl NetworkProfile {
    /// Check the profile for deploy-style use.
    ///
    /// Fails with `MissingCredential` naming the first variable that was not
    /// set when the configuration was loaded.
    pub fn deployment_target(&self) -> keel_core::Result<DeploymentTarget<'_>> {
        let mut credentials = Vec::with_capacity(self.credentials.len());
        for slot in &self.credentials {
            match slot.value() {
                Some(secret) => credentials.push(secret),
                None => {
                    return Err(KeelError::MissingCredential {
                        profile: self.name.to_string(),
                        env: slot.env.clone(),
                    });
                }
            }
        }
        Ok(DeploymentTarget {
            name: self.name,
            endpoint: &self.endpoint,
            chain_id: self.chain_id,
            credentials,
        })
    }
}

// ── Configuration ──────────────────────────────────────────────

/// The resolved configuration: one set of compiler settings and every known
/// network profile. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    compiler: CompilerSettings,
    #[serde(serialize_with = "serialize_profiles")]
    profiles: BTreeMap<ProfileName, NetworkProfile>,
}

fn serialize_profiles<S: Serializer>(
    profiles: &BTreeMap<ProfileName, NetworkProfile>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let by_name: BTreeMap<&str, &NetworkProfile> =
        profiles.iter().map(|(k, v)| (k.as_str(), v)).collect();
    by_name.serialize(serializer)
}

impl Configuration {
    pub(crate) fn new(
        compiler: CompilerSettings,
        profiles: BTreeMap<ProfileName, NetworkProfile>,
    ) -> Self {
        Self { compiler, profiles }
    }

    /// Compiler settings. The same value whichever profile is in use.
    pub fn compiler(&self) -> &CompilerSettings {
        &self.compiler
    }

    pub fn profiles(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.values()
    }

    /// Look up a profile by exact name without checking credentials.
    pub fn profile(&self, name: &str) -> keel_core::Result<&NetworkProfile> {
        let key: ProfileName = name.parse()?;
        self.profiles.get(&key).ok_or_else(|| KeelError::UnknownProfile {
            name: name.to_string(),
            known: ProfileName::known(),
        })
    }

    /// Look up a profile and check it is ready for deployment.
    pub fn resolve_profile(&self, name: &str) -> keel_core::Result<DeploymentTarget<'_>> {
        self.profile(name)?.deployment_target()
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single advisory config issue. Structural problems never get this far:
/// they abort loading.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl Configuration {
    /// Advisory diagnostics for a loaded configuration.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // ── Optimizer ───
        if !self.compiler.optimizer.enabled {
            warnings.push(ConfigWarning {
                field: "compiler.optimizer.enabled".into(),
                message: format!(
                    "optimizer is disabled, runs = {} has no effect",
                    self.compiler.optimizer.runs
                ),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }

        let mut seen_endpoints: BTreeMap<&str, ProfileName> = BTreeMap::new();
        for profile in self.profiles.values() {
            let prefix = format!("networks.{}", profile.name);

            // ── Credentials ───
            for (i, slot) in profile.credentials.iter().enumerate() {
                if !slot.is_present() {
                    warnings.push(ConfigWarning {
                        field: format!("{prefix}.accounts[{i}]"),
                        message: format!(
                            "{} is not set, deploying to '{}' will fail",
                            slot.env, profile.name
                        ),
                        severity: WarningSeverity::Warning,
                        hint: Some(format!("Export {} or add it to .env", slot.env)),
                    });
                }
            }

            // ── Transport ───
            if matches!(profile.endpoint.scheme(), "http" | "ws") {
                warnings.push(ConfigWarning {
                    field: format!("{prefix}.url"),
                    message: format!(
                        "endpoint {} is not encrypted, signed transactions travel in the clear",
                        profile.endpoint
                    ),
                    severity: WarningSeverity::Warning,
                    hint: Some("Use an https:// or wss:// endpoint".into()),
                });
            }

            // ── Shared endpoints ───
            if let Some(other) = seen_endpoints.insert(profile.endpoint.as_str(), profile.name) {
                warnings.push(ConfigWarning {
                    field: format!("{prefix}.url"),
                    message: format!("same endpoint as profile '{other}'"),
                    severity: WarningSeverity::Warning,
                    hint: Some("Each profile should target its own network".into()),
                });
            }

            // ── Chain id ───
            if profile.chain_id.is_none() {
                warnings.push(ConfigWarning {
                    field: format!("{prefix}.chain_id"),
                    message: "no chain id declared".into(),
                    severity: WarningSeverity::Info,
                    hint: Some("Declaring it lets deploy tooling refuse a mismatched endpoint".into()),
                });
            }
        }

        warnings
    }
}
