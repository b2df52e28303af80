//! Tests for deployer CLI parsing and flag interplay.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["plugin-deployer"]);
    assert!(!cli.new_minor);
    assert!(!cli.new_major);
    assert!(!cli.update_pm);
    assert!(!cli.update_only_rc);
    assert!(!cli.add_tag);
    assert!(!cli.verbose);
    assert!(!cli.no_color);
    assert_eq!(cli.config, Utf8PathBuf::from("deploy.toml"));
}

#[test]
fn cli_parses_config_path() {
    let cli = Cli::parse_from(["plugin-deployer", "-c", "release/deploy.toml"]);
    assert_eq!(cli.config, Utf8PathBuf::from("release/deploy.toml"));
}

#[test]
fn cli_parses_short_verbose() {
    let cli = Cli::parse_from(["plugin-deployer", "-v"]);
    assert!(cli.verbose);
}

#[rstest]
#[case::none(&[], None)]
#[case::minor(&["--new-minor"], Some(BumpKind::Minor))]
#[case::major(&["--new-major"], Some(BumpKind::Major))]
#[case::major_wins(&["--new-minor", "--new-major"], Some(BumpKind::Major))]
fn bump_follows_flags(#[case] flags: &[&str], #[case] expected: Option<BumpKind>) {
    let cli = Cli::parse_from(std::iter::once("plugin-deployer").chain(flags.iter().copied()));
    assert_eq!(cli.bump(), expected);
}

#[rstest]
#[case::plain_rebuild(&[], false)]
#[case::bump(&["--new-minor"], true)]
#[case::explicit(&["--update-pm"], true)]
#[case::tag_only(&["--add-tag"], false)]
fn registries_update_on_bump_or_request(#[case] flags: &[&str], #[case] expected: bool) {
    let cli = Cli::parse_from(std::iter::once("plugin-deployer").chain(flags.iter().copied()));
    assert_eq!(cli.updates_registries(), expected);
}

#[test]
fn unknown_flag_is_rejected() {
    assert!(Cli::try_parse_from(["plugin-deployer", "--new-patch"]).is_err());
}

#[test]
fn default_matches_parsed_defaults() {
    let parsed = Cli::parse_from(["plugin-deployer"]);
    let built = Cli::default();
    assert_eq!(parsed.config, built.config);
    assert_eq!(parsed.bump(), built.bump());
    assert_eq!(parsed.updates_registries(), built.updates_registries());
}
