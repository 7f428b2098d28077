// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, env-backed secrets, defaults, and discovery.

use deployprobe::config::*;
use deployprobe::error::Error;
use deployprobe::lifecycle::{RunSettings, topology};
use std::fs;
use std::time::Duration;

const TOKEN_CONFIG: &str = r#"
connection:
  api_url: https://api.cluster.example.com:6443/
  app_url: check.apps.cluster.example.com
  namespace: health-check
authentication:
  token: sha256~literal
behaviour:
  delete_ns: true
  max_attempts_between_deletes: 5
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = Config::from_yaml(TOKEN_CONFIG).unwrap();
        assert_eq!(config.connection.namespace.as_str(), "health-check");
        assert_eq!(config.api_url(), "https://api.cluster.example.com:6443");
        assert!(config.behaviour.delete_ns);
        assert_eq!(config.behaviour.max_attempts_between_deletes, 5);
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_yaml(TOKEN_CONFIG).unwrap();
        assert!(!config.connection.tls_verify);
        assert_eq!(config.behaviour.slow_run_threshold, Duration::from_secs(300));
        assert_eq!(config.deploy_key.to_str(), Some("health-check-deploy"));
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
connection:
  api_url: https://api.cluster.example.com:6443
  app_url: check.apps.cluster.example.com
  namespace: probe-01
  tls_verify: true
authentication:
  username: probe
  password: hunter2
behaviour:
  delete_ns: false
  max_attempts_between_deletes: 0
  slow_run_threshold: 10m
deploy_key: /etc/deployprobe/id_ed25519
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.connection.tls_verify);
        assert_eq!(config.behaviour.max_attempts_between_deletes, 0);
        assert_eq!(config.behaviour.slow_run_threshold, Duration::from_secs(600));
        assert_eq!(
            config.authentication.credentials().unwrap(),
            Credentials::Password {
                username: "probe".to_string(),
                password: "hunter2".to_string(),
            }
        );
    }

    #[test]
    fn missing_behaviour_key_names_it() {
        let yaml = TOKEN_CONFIG.replace("  max_attempts_between_deletes: 5\n", "");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("max_attempts_between_deletes"));
    }

    #[test]
    fn invalid_namespace_is_rejected() {
        let yaml = TOKEN_CONFIG.replace("namespace: health-check", "namespace: Health_Check");
        assert!(Config::from_yaml(&yaml).is_err());
    }
}

mod validation {
    use super::*;

    #[test]
    fn empty_api_url_is_rejected() {
        let yaml = TOKEN_CONFIG.replace("https://api.cluster.example.com:6443/", "\"\"");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg == "No API URL given."));
    }

    #[test]
    fn empty_app_url_is_rejected() {
        let yaml = TOKEN_CONFIG.replace("check.apps.cluster.example.com", "\"  \"");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg == "No app URL given."));
    }

    #[test]
    fn app_url_scheme_and_trailing_slash_are_stripped() {
        let yaml = TOKEN_CONFIG.replace(
            "app_url: check.apps.cluster.example.com",
            "app_url: \"  http://check.apps.cluster.example.com/ \"",
        );
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.app_host(), "check.apps.cluster.example.com");

        let settings = RunSettings::from_config(&config, String::new());
        assert_eq!(settings.app_host, "check.apps.cluster.example.com");
        let route = topology::route(&settings.app_host);
        assert_eq!(route.body()["spec"]["host"], "check.apps.cluster.example.com");
    }

    #[test]
    fn app_url_with_path_is_rejected() {
        let yaml = TOKEN_CONFIG.replace(
            "check.apps.cluster.example.com",
            "https://check.apps.cluster.example.com/status",
        );
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("not a hostname")));
    }

    #[test]
    fn app_url_with_inner_whitespace_or_port_is_rejected() {
        for bad in ["\"check apps.example.com\"", "check.apps.example.com:8080"] {
            let yaml = TOKEN_CONFIG.replace("check.apps.cluster.example.com", bad);
            assert!(
                matches!(Config::from_yaml(&yaml), Err(Error::InvalidConfig(_))),
                "{bad} was accepted"
            );
        }
    }

    #[test]
    fn missing_authentication_is_rejected() {
        let yaml = TOKEN_CONFIG.replace("  token: sha256~literal\n", "  username: probe\n");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::NoAuthentication));
    }
}

mod credentials {
    use super::*;

    #[test]
    fn token_wins_over_password() {
        let auth = AuthenticationConfig {
            token: Some(EnvValue::Literal("sha256~tok".to_string())),
            username: Some("probe".to_string()),
            password: Some(EnvValue::Literal("secret".to_string())),
        };
        assert_eq!(
            auth.credentials().unwrap(),
            Credentials::Token("sha256~tok".to_string())
        );
    }

    #[test]
    fn token_from_environment() {
        let yaml = TOKEN_CONFIG.replace("token: sha256~literal", "token: { env: DEPLOYPROBE_TEST_TOKEN }");
        let config = Config::from_yaml(&yaml).unwrap();

        temp_env::with_var("DEPLOYPROBE_TEST_TOKEN", Some("sha256~from-env"), || {
            assert_eq!(
                config.authentication.credentials().unwrap(),
                Credentials::Token("sha256~from-env".to_string())
            );
        });
    }

    #[test]
    fn unset_variable_uses_default() {
        let value = EnvValue::FromEnv {
            var: "DEPLOYPROBE_TEST_UNSET".to_string(),
            default: Some("fallback".to_string()),
        };
        temp_env::with_var_unset("DEPLOYPROBE_TEST_UNSET", || {
            assert_eq!(value.resolve().unwrap(), "fallback");
        });
    }

    #[test]
    fn unset_variable_without_default_is_an_error() {
        let value = EnvValue::FromEnv {
            var: "DEPLOYPROBE_TEST_MISSING".to_string(),
            default: None,
        };
        temp_env::with_var_unset("DEPLOYPROBE_TEST_MISSING", || {
            assert!(matches!(value.resolve(), Err(Error::MissingEnvVar(ref v)) if v == "DEPLOYPROBE_TEST_MISSING"));
        });
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::Password {
            username: "probe".to_string(),
            password: "hunter2".to_string(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("probe"));
        assert!(!shown.contains("hunter2"));
        assert!(!format!("{:?}", Credentials::Token("sha256~x".into())).contains("sha256~x"));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn finds_config_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), TOKEN_CONFIG).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.connection.namespace.as_str(), "health-check");
    }

    #[test]
    fn finds_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".deployprobe")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), TOKEN_CONFIG).unwrap();

        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
