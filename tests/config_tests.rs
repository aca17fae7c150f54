//! Tests for configuration validation and layered loading.

use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use fvm_cli::config::{ConfigError, DEFAULT_OPEN_PORTS, DEFAULT_OS_IMAGE};
use fvm_cli::test_support::EnvGuard;
use fvm_cli::{FluenceConfig, Port};
use rstest::*;
use tempfile::TempDir;

const ED25519: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIGtestkeymaterial user@host";

#[fixture]
fn valid_config() -> FluenceConfig {
    FluenceConfig {
        api_key: Some(String::from("key")),
        ssh_public_key: Some(String::from(ED25519)),
        api_url: String::from("https://api.fluence.dev"),
        cpu_count: 2,
        memory_gb: 4,
        storage_gb: 25,
        region: String::from("US"),
        name_prefix: String::from("fvm-"),
        os_image: String::from(DEFAULT_OS_IMAGE),
        cpu_manufacturer: None,
        cpu_architecture: None,
        storage_type: None,
        open_ports: String::from(DEFAULT_OPEN_PORTS),
        default_timeout_secs: 300,
        poll_interval_secs: 10,
    }
}

#[rstest]
fn valid_config_passes(valid_config: FluenceConfig) {
    assert_eq!(valid_config.validate(), Ok(()));
    assert_eq!(
        valid_config
            .open_ports()
            .unwrap_or_else(|err| panic!("ports: {err}")),
        vec![Port::tcp(22), Port::tcp(80), Port::tcp(443)]
    );
}

#[rstest]
fn missing_api_key_names_env_var_and_yaml_key(valid_config: FluenceConfig) {
    let cfg = FluenceConfig {
        api_key: Some(String::from("   ")),
        ..valid_config
    };

    let error = cfg.require_api_key().expect_err("api key is required");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error");
    };
    assert!(message.contains("FLUENCE_API_KEY"), "message: {message}");
    assert!(message.contains("api_key"), "message: {message}");
    assert!(message.contains("config.yaml"), "message: {message}");
}

#[rstest]
fn missing_ssh_key_mentions_the_fallback_variable(valid_config: FluenceConfig) {
    let cfg = FluenceConfig {
        ssh_public_key: None,
        ..valid_config
    };
    let message = cfg
        .require_ssh_public_key()
        .expect_err("ssh key is required")
        .to_string();
    assert!(message.contains("SSH_PUBLIC_KEY"), "message: {message}");
    assert!(message.contains("ssh_public_key"), "message: {message}");
}

#[rstest]
fn bare_ssh_key_payload_is_normalised(valid_config: FluenceConfig) {
    let cfg = FluenceConfig {
        ssh_public_key: Some(String::from("AAAAC3NzaC1lZDI1NTE5AAAAIGtestkeymaterial")),
        ..valid_config
    };
    assert_eq!(
        cfg.require_ssh_public_key().as_deref(),
        Ok("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIGtestkeymaterial")
    );
}

/// Every required field produces an error naming its variable and key.
#[rstest]
#[case::api_url(|cfg: &mut FluenceConfig| cfg.api_url.clear(), "FLUENCE_API_URL", "api_url")]
#[case::region(|cfg: &mut FluenceConfig| cfg.region.clear(), "FLUENCE_REGION", "region")]
#[case::os_image(|cfg: &mut FluenceConfig| cfg.os_image.clear(), "FLUENCE_OS_IMAGE", "os_image")]
#[case::cpu(|cfg: &mut FluenceConfig| cfg.cpu_count = 0, "FLUENCE_CPU_COUNT", "cpu_count")]
#[case::memory(|cfg: &mut FluenceConfig| cfg.memory_gb = 0, "FLUENCE_MEMORY_GB", "memory_gb")]
#[case::storage(|cfg: &mut FluenceConfig| cfg.storage_gb = 0, "FLUENCE_STORAGE_GB", "storage_gb")]
#[case::timeout(
    |cfg: &mut FluenceConfig| cfg.default_timeout_secs = 0,
    "FLUENCE_DEFAULT_TIMEOUT_SECS",
    "default_timeout_secs"
)]
#[case::interval(
    |cfg: &mut FluenceConfig| cfg.poll_interval_secs = 0,
    "FLUENCE_POLL_INTERVAL_SECS",
    "poll_interval_secs"
)]
fn validation_errors_are_actionable(
    valid_config: FluenceConfig,
    #[case] mutate: fn(&mut FluenceConfig),
    #[case] env_var: &str,
    #[case] yaml_key: &str,
) {
    let mut cfg = valid_config;
    mutate(&mut cfg);
    let message = cfg.validate().expect_err("validation should fail").to_string();
    assert!(message.contains(env_var), "missing {env_var}: {message}");
    assert!(message.contains(yaml_key), "missing {yaml_key}: {message}");
    assert!(message.contains("config.yaml"), "missing file: {message}");
}

#[rstest]
fn malformed_ports_fail_validation(valid_config: FluenceConfig) {
    let cfg = FluenceConfig {
        open_ports: String::from("22/tcp,http"),
        ..valid_config
    };
    assert!(matches!(cfg.validate(), Err(ConfigError::Ports(_))));
}

#[rstest]
fn summary_hides_secrets(valid_config: FluenceConfig) {
    let summary = valid_config.summary();
    let rendered =
        serde_json::to_string(&summary).unwrap_or_else(|err| panic!("summary json: {err}"));
    assert!(summary.api_key_set);
    assert!(summary.ssh_key_set);
    assert!(!rendered.contains("AAAAC3"), "summary leaked key: {rendered}");
    assert_eq!(summary.open_ports, ["22/tcp", "80/tcp", "443/tcp"]);
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> Utf8PathBuf {
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temp dir should be utf8: {}", path.display()));
    Dir::open_ambient_dir(&root, ambient_authority())
        .unwrap_or_else(|err| panic!("open temp dir: {err}"))
        .write(name, contents)
        .unwrap_or_else(|err| panic!("write {name}: {err}"));
    root.join(name)
}

#[tokio::test]
async fn environment_overrides_file_and_dotenv_supplies_secrets() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let config_path = write_file(&tmp, "config.yaml", "region: DE\ncpu_count: 4\nmemory_gb: 8\n");
    let dotenv_path = write_file(&tmp, "secrets.env", "FLUENCE_API_KEY=from-dotenv\n");

    let _guard = EnvGuard::apply(
        &[
            ("FVM_CONFIG_PATH", config_path.as_str()),
            ("DOTENV_PATH", dotenv_path.as_str()),
            ("FLUENCE_MEMORY_GB", "16"),
        ],
        &[
            "FLUENCE_API_KEY",
            "FLUENCE_SSH_PUBLIC_KEY",
            "SSH_PUBLIC_KEY",
            "FLUENCE_REGION",
            "FLUENCE_CPU_COUNT",
        ],
    )
    .await;

    let cfg = FluenceConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));

    assert_eq!(cfg.region, "DE");
    assert_eq!(cfg.cpu_count, 4);
    assert_eq!(cfg.memory_gb, 16);
    assert_eq!(cfg.storage_gb, 25);
    assert_eq!(cfg.require_api_key(), Ok("from-dotenv"));
    assert_eq!(cfg.ssh_public_key, None);
}

#[tokio::test]
async fn unprefixed_ssh_key_is_used_as_fallback() {
    let _guard = EnvGuard::apply(
        &[("SSH_PUBLIC_KEY", ED25519)],
        &["FLUENCE_SSH_PUBLIC_KEY", "DOTENV_PATH"],
    )
    .await;

    let cfg = FluenceConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));
    assert_eq!(cfg.ssh_public_key.as_deref(), Some(ED25519));
}
