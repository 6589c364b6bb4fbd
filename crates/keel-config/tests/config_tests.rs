#[cfg(test)]
mod tests {
    use keel_config::schema::*;
    use keel_config::{ConfigLoader, EnvProvider, MapEnv};
    use keel_core::{KeelError, ProfileName};
    use std::io::Write;

    const KEY: &str = "0xABCDEF0123456789abcdef0123456789ABCDEF0123456789abcdef01234567";

    fn with_key() -> MapEnv {
        MapEnv::new().with("PRIVATE_KEY", KEY)
    }

    fn manifest_with_urls(test_url: &str, production_url: &str) -> String {
        format!(
            r#"
[compiler]
version = "0.6.12"
evm_version = "constantinople"

[compiler.optimizer]
enabled = true
runs = 999999

[networks.test]
chain = "baobab"
chain_id = 1001
url = "{test_url}"
accounts = ["PRIVATE_KEY"]

[networks.production]
chain = "cypress"
chain_id = 8217
url = "{production_url}"
accounts = ["PRIVATE_KEY"]
"#
        )
    }

    // ── Built-in manifest ──────────────────────────────────────

    #[test]
    fn test_builtin_compiler_settings() {
        let config = ConfigLoader::load(&MapEnv::new()).unwrap();
        let compiler = config.compiler();
        assert_eq!(compiler.language_version, semver::Version::new(0, 6, 12));
        assert_eq!(compiler.evm_version, EvmVersion::Constantinople);
        assert!(compiler.optimizer.enabled);
        assert_eq!(compiler.optimizer.runs, 999_999);
    }

    #[test]
    fn test_builtin_profiles() {
        let config = ConfigLoader::load(&MapEnv::new()).unwrap();
        let test = config.profile("test").unwrap();
        assert_eq!(test.chain, "baobab");
        assert_eq!(test.chain_id, Some(1001));
        assert_eq!(
            test.endpoint.as_str(),
            "https://kaikas.baobab.klaytn.net:8651/"
        );
        let production = config.profile("production").unwrap();
        assert_eq!(production.chain, "cypress");
        assert_eq!(production.chain_id, Some(8217));
        assert_eq!(
            production.endpoint.as_str(),
            "https://public-node-api.klaytnapi.com/v1/cypress/"
        );
        assert_eq!(config.profiles().count(), 2);
    }

    // ── Profile resolution ─────────────────────────────────────

    #[test]
    fn test_resolve_both_profiles_distinct() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        let test = config.resolve_profile("test").unwrap();
        let production = config.resolve_profile("production").unwrap();
        assert_eq!(test.name, ProfileName::Test);
        assert_eq!(production.name, ProfileName::Production);
        assert_ne!(test.name, production.name);
        assert_ne!(test.endpoint, production.endpoint);
    }

    #[test]
    fn test_resolve_unknown_profile() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        for name in ["unknown", "baobab", "Test", ""] {
            match config.resolve_profile(name) {
                Err(KeelError::UnknownProfile { name: got, .. }) => assert_eq!(got, name),
                other => panic!("expected UnknownProfile for {name:?}, got {other:?}"),
            }
            assert!(matches!(
                config.profile(name),
                Err(KeelError::UnknownProfile { .. })
            ));
        }
    }

    #[test]
    fn test_missing_key_loads_but_deploy_fails() {
        let config = ConfigLoader::load(&MapEnv::new()).unwrap();
        for name in ["test", "production"] {
            // Read-only access still works.
            let profile = config.profile(name).unwrap();
            assert!(!profile.credentials[0].is_present());

            match profile.deployment_target() {
                Err(KeelError::MissingCredential { profile, env }) => {
                    assert_eq!(profile, name);
                    assert_eq!(env, "PRIVATE_KEY");
                }
                other => panic!("expected MissingCredential, got {other:?}"),
            }
            assert!(matches!(
                config.resolve_profile(name),
                Err(KeelError::MissingCredential { .. })
            ));
        }
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let config = ConfigLoader::load(&MapEnv::new().with("PRIVATE_KEY", "")).unwrap();
        assert!(matches!(
            config.resolve_profile("test"),
            Err(KeelError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_credential_is_verbatim() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        let target = config.resolve_profile("test").unwrap();
        assert_eq!(target.credentials.len(), 1);
        assert_eq!(target.credentials[0].expose(), KEY);
        let target = config.resolve_profile("production").unwrap();
        assert_eq!(target.credentials[0].expose(), KEY);
    }

    #[test]
    fn test_credentials_copied_at_load() {
        let mut env = with_key();
        let config = ConfigLoader::load(&env).unwrap();
        env.insert("PRIVATE_KEY", "0xchanged");
        let target = config.resolve_profile("test").unwrap();
        assert_eq!(target.credentials[0].expose(), KEY);
    }

    #[test]
    fn test_compiler_settings_independent_of_profile() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        let before = config.compiler().clone();
        for name in ["test", "production"] {
            config.resolve_profile(name).unwrap();
            assert_eq!(config.compiler(), &before);
            assert_eq!(config.compiler().optimizer.runs, 999_999);
            assert!(config.compiler().optimizer.enabled);
        }
    }

    // ── Idempotence ────────────────────────────────────────────

    #[test]
    fn test_load_twice_is_equal() {
        let env = with_key();
        let a = ConfigLoader::load(&env).unwrap();
        let b = ConfigLoader::load(&env).unwrap();
        assert_eq!(a, b);

        let a = ConfigLoader::load(&MapEnv::new()).unwrap();
        let b = ConfigLoader::load(&MapEnv::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_reads_each_variable() {
        use std::sync::Mutex;

        struct Recording(Mutex<Vec<String>>);
        impl EnvProvider for Recording {
            fn var(&self, key: &str) -> Option<String> {
                self.0.lock().unwrap().push(key.to_string());
                None
            }
        }

        let env = Recording(Mutex::new(Vec::new()));
        ConfigLoader::load(&env).unwrap();
        let reads = env.0.into_inner().unwrap();
        assert_eq!(reads, vec!["PRIVATE_KEY", "PRIVATE_KEY"]);
    }

    // ── Global configuration ───────────────────────────────────

    #[test]
    fn test_global_is_single_instance() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    Configuration::global().unwrap() as *const Configuration as usize
                })
            })
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(
            Configuration::global().unwrap().compiler().optimizer.runs,
            999_999
        );
    }

    // ── Structural validation ──────────────────────────────────

    #[test]
    fn test_malformed_endpoint_fails_load() {
        let source = manifest_with_urls("not a url", "https://example.com/");
        match ConfigLoader::from_manifest(&source, &with_key()) {
            Err(KeelError::MalformedEndpoint { profile, url, .. }) => {
                assert_eq!(profile, "test");
                assert_eq!(url, "not a url");
            }
            other => panic!("expected MalformedEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_scheme_fails_load() {
        let source = manifest_with_urls("https://example.com/", "ftp://example.com/");
        match ConfigLoader::from_manifest(&source, &MapEnv::new()) {
            Err(KeelError::MalformedEndpoint { profile, reason, .. }) => {
                assert_eq!(profile, "production");
                assert!(reason.contains("ftp"));
            }
            other => panic!("expected MalformedEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_manifest_loads() {
        let source = manifest_with_urls("wss://test.example.com/ws", "https://prod.example.com/");
        let config = ConfigLoader::from_manifest(&source, &with_key()).unwrap();
        assert_eq!(
            config.resolve_profile("test").unwrap().endpoint.scheme(),
            "wss"
        );
    }

    #[test]
    fn test_missing_profile_fails_load() {
        let source = r#"
[compiler]
version = "0.6.12"
evm_version = "constantinople"
optimizer = { enabled = true, runs = 200 }

[networks.test]
chain = "baobab"
url = "https://example.com/"
accounts = ["PRIVATE_KEY"]
"#;
        match ConfigLoader::from_manifest(source, &MapEnv::new()) {
            Err(KeelError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "networks.production");
            }
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_profile_key_fails_load() {
        let mut source = manifest_with_urls("https://a.example.com/", "https://b.example.com/");
        source.push_str(
            r#"
[networks.staging]
chain = "baobab"
url = "https://c.example.com/"
accounts = ["PRIVATE_KEY"]
"#,
        );
        assert!(matches!(
            ConfigLoader::from_manifest(&source, &MapEnv::new()),
            Err(KeelError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn test_zero_runs_fails_load() {
        let source = manifest_with_urls("https://a.example.com/", "https://b.example.com/")
            .replace("runs = 999999", "runs = 0");
        assert!(matches!(
            ConfigLoader::from_manifest(&source, &MapEnv::new()),
            Err(KeelError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_evm_target_too_new_for_compiler() {
        let source = manifest_with_urls("https://a.example.com/", "https://b.example.com/")
            .replace("evm_version = \"constantinople\"", "evm_version = \"london\"");
        match ConfigLoader::from_manifest(&source, &MapEnv::new()) {
            Err(KeelError::ConfigValidation { field, reason }) => {
                assert_eq!(field, "compiler.evm_version");
                assert!(reason.contains("0.8.7"));
            }
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_accounts_fails_load() {
        let source = manifest_with_urls("https://a.example.com/", "https://b.example.com/")
            .replacen("accounts = [\"PRIVATE_KEY\"]", "accounts = []", 1);
        assert!(matches!(
            ConfigLoader::from_manifest(&source, &MapEnv::new()),
            Err(KeelError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_unparseable_manifest() {
        let err = ConfigLoader::from_manifest("[compiler", &MapEnv::new()).unwrap_err();
        assert!(matches!(err, KeelError::Config(_)));
    }

    // ── Secret handling ────────────────────────────────────────

    #[test]
    fn test_debug_output_hides_key() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains(KEY));
        let target = config.resolve_profile("test").unwrap();
        assert!(!format!("{target:?}").contains(KEY));
    }

    #[test]
    fn test_json_output_hides_key() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert!(!json.to_string().contains(KEY));
        let slot = &json["profiles"]["test"]["credentials"][0];
        assert_eq!(slot["env"], "PRIVATE_KEY");
        assert_eq!(slot["present"], true);
        assert_eq!(json["compiler"]["version"], "0.6.12");
        assert_eq!(json["compiler"]["evm_version"], "constantinople");
    }

    #[test]
    fn test_toml_output_hides_key() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        let out = toml::to_string_pretty(&config).unwrap();
        assert!(!out.contains(KEY));
        assert!(out.contains("PRIVATE_KEY"));
    }

    // ── Compiler invoker ───────────────────────────────────────

    #[test]
    fn test_solc_settings_shape() {
        let config = ConfigLoader::load(&MapEnv::new()).unwrap();
        let settings = config.compiler().solc_settings();
        assert_eq!(
            settings,
            serde_json::json!({
                "evmVersion": "constantinople",
                "optimizer": { "enabled": true, "runs": 999999 }
            })
        );
    }

    #[test]
    fn test_evm_version_spelling() {
        let v: EvmVersion = serde_json::from_str("\"tangerineWhistle\"").unwrap();
        assert_eq!(v, EvmVersion::TangerineWhistle);
        assert_eq!(v.as_str(), "tangerineWhistle");
        assert!(EvmVersion::Istanbul.supported_by(&semver::Version::new(0, 5, 13)));
        assert!(!EvmVersion::Istanbul.supported_by(&semver::Version::new(0, 5, 12)));
    }

    // ── Diagnostics ────────────────────────────────────────────

    #[test]
    fn test_validate_flags_missing_key() {
        let config = ConfigLoader::load(&MapEnv::new()).unwrap();
        let warnings = config.validate();
        let missing: Vec<_> = warnings
            .iter()
            .filter(|w| w.field.ends_with("accounts[0]"))
            .collect();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|w| w.severity == WarningSeverity::Warning));
        assert!(missing[0].to_string().contains("PRIVATE_KEY"));
    }

    #[test]
    fn test_validate_clean_with_key() {
        let config = ConfigLoader::load(&with_key()).unwrap();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_plaintext_and_shared_endpoint() {
        let source = manifest_with_urls("http://node.example.com/", "http://node.example.com/");
        let config = ConfigLoader::from_manifest(&source, &with_key()).unwrap();
        let warnings = config.validate();
        assert!(
            warnings
                .iter()
                .any(|w| w.message.contains("not encrypted"))
        );
        assert!(
            warnings
                .iter()
                .any(|w| w.message.contains("same endpoint as profile 'test'"))
        );
    }

    // ── .env files ─────────────────────────────────────────────

    #[test]
    fn test_map_env_from_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "# deploy key").unwrap();
        writeln!(f, "PRIVATE_KEY={KEY}").unwrap();

        let env = MapEnv::from_dotenv(&path).unwrap();
        let config = ConfigLoader::load(&env).unwrap();
        assert_eq!(
            config.resolve_profile("production").unwrap().credentials[0].expose(),
            KEY
        );
    }
}
