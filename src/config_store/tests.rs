//! Tests for configuration template writers.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct StoreFixture {
    _tmp: TempDir,
    root: Utf8PathBuf,
    store: ConfigStore,
}

#[fixture]
fn store_fixture() -> StoreFixture {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|err| panic!("temp path should be utf8: {}", err.display()));
    let discovery = ConfigDiscovery::builder(APP_NAME)
        .env_var(CONFIG_ENV_VAR)
        .config_file_name(CONFIG_FILE_NAME)
        .dotfile_name(DOTFILE_NAME)
        .project_file_name(PROJECT_FILE_NAME)
        .clear_project_roots()
        .add_project_root(root.as_path())
        .build();
    StoreFixture {
        _tmp: tmp,
        store: ConfigStore::with_discovery(discovery, root.clone()),
        root,
    }
}

fn read_file(path: &Utf8Path) -> String {
    let (parent, file_name) = split_path(path).unwrap_or_else(|err| panic!("split: {err}"));
    Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name))
        .unwrap_or_else(|err| panic!("read {path}: {err}"))
}

#[rstest]
fn config_template_lands_in_project_root(store_fixture: StoreFixture) {
    let path = store_fixture
        .store
        .write_config_template(false)
        .unwrap_or_else(|err| panic!("write template: {err}"));

    assert_eq!(path, store_fixture.root.join(PROJECT_FILE_NAME));
    let contents = read_file(&path);
    assert!(contents.contains("cpu_count: 2"), "{contents}");
    assert!(contents.contains("open_ports: \"22/tcp,80/tcp,443/tcp\""), "{contents}");
    assert!(contents.contains("# api_key:"), "secrets stay commented: {contents}");
}

#[rstest]
fn config_template_refuses_overwrite_without_force(store_fixture: StoreFixture) {
    let store = &store_fixture.store;
    store
        .write_config_template(false)
        .unwrap_or_else(|err| panic!("seed template: {err}"));

    let Err(err) = store.write_config_template(false) else {
        panic!("second write should fail without force");
    };
    let ConfigStoreError::AlreadyExists { path } = err else {
        panic!("expected AlreadyExists error");
    };
    assert_eq!(path, store_fixture.root.join(PROJECT_FILE_NAME));

    store
        .write_config_template(true)
        .unwrap_or_else(|err| panic!("forced write: {err}"));
}

#[rstest]
fn env_template_lists_secret_variables(store_fixture: StoreFixture) {
    let path = store_fixture
        .store
        .write_env_template(false)
        .unwrap_or_else(|err| panic!("write env template: {err}"));

    assert_eq!(path, store_fixture.root.join(ENV_TEMPLATE_NAME));
    let contents = read_file(&path);
    assert!(contents.contains("FLUENCE_API_KEY="));
    assert!(contents.contains("SSH_PUBLIC_KEY="));
    assert!(matches!(
        store_fixture.store.write_env_template(false),
        Err(ConfigStoreError::AlreadyExists { .. })
    ));
}

#[rstest]
fn missing_parent_directory_reads_as_absent(store_fixture: StoreFixture) {
    let missing = store_fixture.root.join("missing").join("nested").join("config.yaml");
    let exists = path_exists(&missing).unwrap_or_else(|err| panic!("path check: {err}"));
    assert!(!exists);
}

#[test]
fn bare_file_names_resolve_against_working_directory() {
    let (parent, file_name) =
        split_path(Utf8Path::new("config.yaml")).unwrap_or_else(|err| panic!("split: {err}"));
    assert_eq!(parent, Utf8Path::new("."));
    assert_eq!(file_name, "config.yaml");
}
