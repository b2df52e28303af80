//! Unit tests for configuration loading.

use super::*;
use rstest::rstest;
use tempfile::TempDir;

#[test]
fn defaults_match_repository_layout() {
    let config = DeployConfig::default();
    assert_eq!(config.resource_path(), Utf8PathBuf::from("src/DSpellCheck.rc"));
    assert_eq!(
        config.release_dir(VersionTuple::new(1, 4, 0, 1)),
        Utf8PathBuf::from("out/1.4.0.1")
    );
    assert_eq!(config.build_config, "RelWithDebInfo");
    assert_eq!(config.identity(), None);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let config = DeployConfig::parse(
        Utf8Path::new("deploy.toml"),
        "product = \"NppSpell\"\nauthor_name = \"Release Bot\"\nauthor_email = \"bot@example.org\"\n",
    )
    .expect("valid configuration");

    assert_eq!(config.product, "NppSpell");
    assert_eq!(config.resource_path(), Utf8PathBuf::from("src/NppSpell.rc"));
    assert_eq!(config.output_dir, Utf8PathBuf::from("out"));
    assert_eq!(
        config.identity(),
        Some(GitIdentity {
            name: "Release Bot".to_owned(),
            email: "bot@example.org".to_owned(),
        })
    );
}

#[test]
fn rooting_resolves_relative_paths() {
    let config = DeployConfig::default().rooted_at(Utf8Path::new("/work/plugin"));

    assert_eq!(
        config.resource_path(),
        Utf8PathBuf::from("/work/plugin/src/DSpellCheck.rc")
    );
    assert_eq!(config.changelog_file, Utf8PathBuf::from("/work/plugin/changelog.txt"));
    assert_eq!(config.source_dir, Utf8PathBuf::from("/work/plugin"));
    assert_eq!(config.build_dir_prefix, "/work/plugin/build-msvc2017");
    assert_eq!(
        config.release_dir(VersionTuple::new(1, 4, 0, 1)),
        Utf8PathBuf::from("/work/plugin/out/1.4.0.1")
    );
}

#[test]
fn rooting_keeps_absolute_paths() {
    let config = DeployConfig {
        output_dir: Utf8PathBuf::from("/srv/releases"),
        ..DeployConfig::default()
    }
    .rooted_at(Utf8Path::new("/work/plugin"));

    assert_eq!(config.output_dir, Utf8PathBuf::from("/srv/releases"));
    assert_eq!(config.product, "DSpellCheck");
}

#[test]
fn sample_file_spells_out_the_defaults() {
    let text = include_str!("../deploy.example.toml");
    let config = DeployConfig::parse(Utf8Path::new("deploy.example.toml"), text)
        .expect("sample configuration parses");
    assert_eq!(config, DeployConfig::default());
}

#[rstest]
#[case::unknown_key("produkt = \"x\"\n")]
#[case::wrong_type("build_config = 3\n")]
#[case::syntax("product = \n")]
fn malformed_file_is_config_error(#[case] text: &str) {
    let err = DeployConfig::parse(Utf8Path::new("deploy.toml"), text).expect_err("invalid");
    assert!(matches!(err, DeployError::Config { .. }));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().expect("temp dir creation succeeds");
    let path = Utf8PathBuf::try_from(dir.path().join("deploy.toml")).expect("utf-8 path");
    assert_eq!(DeployConfig::load(&path).expect("defaults"), DeployConfig::default());
}

#[test]
fn load_reads_existing_file() {
    let dir = TempDir::new().expect("temp dir creation succeeds");
    let path = Utf8PathBuf::try_from(dir.path().join("deploy.toml")).expect("utf-8 path");
    fs::write(&path, "build_dir_prefix = \"build-msvc2022\"\n").expect("write config");
    let config = DeployConfig::load(&path).expect("load");
    assert_eq!(config.build_settings(true).build_dir_prefix, "build-msvc2022");
    assert!(config.build_settings(true).verbose);
}

#[rstest]
#[case::x64(Architecture::X64, "https://example.org/v1.4.0.1/DSpellCheck_x64.zip")]
#[case::x86(Architecture::X86, "https://example.org/v1.4.0.1/DSpellCheck_x86.zip")]
fn download_url_fills_placeholders(#[case] arch: Architecture, #[case] expected: &str) {
    let config = DeployConfig {
        download_url_template: "https://example.org/v{version}/{product}_{arch}.zip".to_owned(),
        ..DeployConfig::default()
    };
    assert_eq!(config.download_url(VersionTuple::new(1, 4, 0, 1), arch), expected);
}

#[test]
fn checkout_comes_from_named_variable() {
    temp_env::with_var("DEPLOYER_TEST_PM_REPO", Some("/repos/pm"), || {
        let config = DeployConfig {
            plugin_manager_env: "DEPLOYER_TEST_PM_REPO".to_owned(),
            ..DeployConfig::default()
        };
        assert_eq!(config.plugin_manager_repo(), Some(Utf8PathBuf::from("/repos/pm")));
    });
}

#[rstest]
#[case::unset(None)]
#[case::blank(Some("   "))]
fn unset_or_blank_variable_skips_checkout(#[case] value: Option<&str>) {
    temp_env::with_var("DEPLOYER_TEST_LIST_REPO", value, || {
        let config = DeployConfig {
            plugin_list_env: "DEPLOYER_TEST_LIST_REPO".to_owned(),
            ..DeployConfig::default()
        };
        assert_eq!(config.plugin_list_repo(), None);
    });
}
