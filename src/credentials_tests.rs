//! Unit tests for the credential resolver chain.

#[cfg(test)]
mod credentials_tests {
    use crate::credentials::*;
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;

    /// Fresh directory under the system temp dir.
    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("omega-creds-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_secrets(contents: &str) -> PathBuf {
        let path = temp_dir().join(".env");
        fs::write(&path, contents).unwrap();
        path
    }

    /// Env var names unique to one test so tests can run in parallel.
    fn unique_var(tag: &str) -> String {
        format!("OMEGA_TEST_{}_{}", tag, Uuid::new_v4().simple()).to_uppercase()
    }

    fn file_resolver(path: PathBuf) -> FileResolver {
        FileResolver::new(SecretsLocation::Path(path), ["GROQ_API_KEY", "GROK_API_KEY"])
    }

    // ============= ApiKey Tests =============

    #[test]
    fn test_api_key_rejects_blank() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" gsk_abc ").unwrap().expose(), "gsk_abc");
    }

    #[test]
    fn test_api_key_never_printed() {
        let key = ApiKey::new("gsk_supersecretvalue").unwrap();

        assert_eq!(key.masked(), "gsk_****");
        assert!(!format!("{:?}", key).contains("supersecret"));
        assert!(!format!("{}", key).contains("supersecret"));
    }

    #[test]
    fn test_api_key_short_values_fully_masked() {
        assert_eq!(ApiKey::new("abc123").unwrap().masked(), "****");
        assert_eq!(ApiKey::new("abcd").unwrap().masked(), "****");
        assert_eq!(ApiKey::new("abcdefgh").unwrap().masked(), "****");
        assert_eq!(ApiKey::new("abcdefghi").unwrap().masked(), "abcd****");
        assert_eq!(format!("{}", ApiKey::new("abc123").unwrap()), "****");
    }

    // ============= Resolver Tests =============

    #[test]
    fn test_explicit_resolver() {
        let found = ExplicitResolver::new(Some("explicit-key".to_string())).resolve().unwrap();
        assert_eq!(found.key.expose(), "explicit-key");
        assert_eq!(found.source, CredentialSource::Explicit);

        assert!(ExplicitResolver::new(None).resolve().is_none());
        assert!(ExplicitResolver::new(Some(String::new())).resolve().is_none());
    }

    #[test]
    fn test_env_resolver_order() {
        let canonical = unique_var("CANON");
        let legacy = unique_var("LEGACY");
        std::env::set_var(&legacy, "legacy-key");

        let resolver = EnvResolver::new([canonical.clone(), legacy.clone()]);
        let found = resolver.resolve().unwrap();
        assert_eq!(found.key.expose(), "legacy-key");
        assert_eq!(found.source, CredentialSource::Environment(legacy.clone()));

        std::env::set_var(&canonical, "canonical-key");
        let found = resolver.resolve().unwrap();
        assert_eq!(found.key.expose(), "canonical-key");

        std::env::remove_var(&canonical);
        std::env::remove_var(&legacy);
    }

    #[test]
    fn test_env_resolver_skips_empty() {
        let name = unique_var("EMPTY");
        std::env::set_var(&name, "");

        assert!(EnvResolver::new([name.clone()]).resolve().is_none());
        std::env::remove_var(&name);
    }

    #[test]
    fn test_file_resolver_strips_single_quotes() {
        let path = write_secrets("GROQ_API_KEY='abc123'\n");
        let found = file_resolver(path.clone()).resolve().unwrap();

        assert_eq!(found.key.expose(), "abc123");
        assert_eq!(found.source, CredentialSource::SecretsFile(path));
    }

    #[test]
    fn test_file_resolver_strips_double_quotes() {
        let path = write_secrets("GROQ_API_KEY=\"abc123\"\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "abc123");
    }

    #[test]
    fn test_file_resolver_unquoted_and_legacy() {
        let path = write_secrets("# secrets\nOTHER=1\nGROK_API_KEY=legacy-value\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "legacy-value");
    }

    #[test]
    fn test_file_resolver_first_match_wins() {
        let path = write_secrets("GROK_API_KEY=first\nGROQ_API_KEY=second\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "first");
    }

    #[test]
    fn test_file_resolver_case_sensitive() {
        let path = write_secrets("groq_api_key=lowercase\n");
        assert!(file_resolver(path).resolve().is_none());
    }

    #[test]
    fn test_file_resolver_keeps_value_literal() {
        let path = write_secrets("GROQ_API_KEY=gsk_ab$cd12\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "gsk_ab$cd12");

        let path = write_secrets("GROQ_API_KEY=gsk_${HOME}x # not a comment\n");
        assert_eq!(
            file_resolver(path).resolve().unwrap().key.expose(),
            "gsk_${HOME}x # not a comment"
        );
    }

    #[test]
    fn test_file_resolver_survives_unbalanced_quote() {
        let path = write_secrets("NOTE=\"unterminated\nGROQ_API_KEY=abc123\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "abc123");
    }

    #[test]
    fn test_file_resolver_export_prefix_and_mismatched_quotes() {
        let path = write_secrets("export GROQ_API_KEY='abc123\"\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "'abc123\"");
    }

    #[test]
    fn test_file_resolver_skips_empty_and_prefixed_names() {
        let path = write_secrets("GROQ_API_KEY=\nMY_GROQ_API_KEY=nope\nGROQ_API_KEY_OLD=nope\nGROK_API_KEY=later\n");
        assert_eq!(file_resolver(path).resolve().unwrap().key.expose(), "later");
    }

    #[test]
    fn test_file_resolver_missing_file() {
        let path = temp_dir().join("does-not-exist.env");
        assert!(file_resolver(path).resolve().is_none());
    }

    #[test]
    fn test_find_secrets_file_walks_upward() {
        let root = temp_dir();
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(".env"), "GROQ_API_KEY=found\n").unwrap();

        assert_eq!(find_secrets_file(&nested), Some(root.join(".env")));
    }

    #[test]
    fn test_find_secrets_file_prefers_nearest() {
        let root = temp_dir();
        let nested = root.join("svc");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(".env"), "GROQ_API_KEY=outer\n").unwrap();
        fs::write(nested.join(".env"), "GROQ_API_KEY=inner\n").unwrap();

        assert_eq!(find_secrets_file(&nested), Some(nested.join(".env")));
    }

    #[test]
    fn test_secrets_location_from_config() {
        assert_eq!(SecretsLocation::from_config(None), SecretsLocation::Discover);
        let p = PathBuf::from("/tmp/x.env");
        assert_eq!(SecretsLocation::from_config(Some(p.clone())), SecretsLocation::Path(p.clone()));
        assert_eq!(SecretsLocation::Path(p.clone()).locate(), p);
    }

    #[test]
    fn test_fallback_path_is_crate_relative() {
        let fallback = fallback_secrets_path();
        assert!(fallback.ends_with(".env"));
        assert!(fallback.starts_with(env!("CARGO_MANIFEST_DIR")));
    }

    // ============= Chain Tests =============

    #[test]
    fn test_chain_explicit_beats_env_and_file() {
        let var = unique_var("PRECEDENCE");
        std::env::set_var(&var, "env-key");
        let path = write_secrets("GROQ_API_KEY=file-key\n");

        let chain = CredentialChain::new()
            .with(ExplicitResolver::new(Some("explicit-key".to_string())))
            .with(EnvResolver::new([var.clone()]))
            .with(file_resolver(path));

        let found = chain.resolve().unwrap();
        assert_eq!(found.key.expose(), "explicit-key");
        assert_eq!(found.source, CredentialSource::Explicit);
        std::env::remove_var(&var);
    }

    #[test]
    fn test_chain_env_used_without_file() {
        let var = unique_var("ENV_ONLY");
        std::env::set_var(&var, "env-key");

        let chain = CredentialChain::new()
            .with(ExplicitResolver::new(None))
            .with(EnvResolver::new([var.clone()]))
            .with(file_resolver(temp_dir().join(".env")));

        let found = chain.resolve().unwrap();
        assert_eq!(found.key.expose(), "env-key");
        assert_eq!(found.source, CredentialSource::Environment(var.clone()));
        std::env::remove_var(&var);
    }

    #[test]
    fn test_chain_env_beats_file() {
        let var = unique_var("ENV_FILE");
        std::env::set_var(&var, "env-key");
        let path = write_secrets("GROQ_API_KEY=file-key\n");

        let chain = CredentialChain::new()
            .with(EnvResolver::new([var.clone()]))
            .with(file_resolver(path));

        assert_eq!(chain.resolve().unwrap().key.expose(), "env-key");
        std::env::remove_var(&var);
    }

    #[test]
    fn test_chain_all_tiers_empty() {
        let chain = CredentialChain::new()
            .with(ExplicitResolver::new(None))
            .with(EnvResolver::new([unique_var("NONE")]))
            .with(file_resolver(temp_dir().join(".env")));

        assert_eq!(chain.len(), 3);
        assert!(chain.resolve().is_none());
    }

    #[test]
    fn test_standard_chain_shape() {
        let chain = CredentialChain::standard(
            Some("k".to_string()),
            &[unique_var("STD")],
            SecretsLocation::Discover,
        );
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.resolve().unwrap().source, CredentialSource::Explicit);
        assert!(CredentialChain::new().is_empty());
    }
}
