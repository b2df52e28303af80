//! Git operations for recording a release.
//!
//! The deployer commits everything pending in a working copy and tags
//! release commits. When an identity is configured it is passed through the
//! environment as author and committer (git uses the committer identity for
//! tags), leaving the user's git configuration untouched.

use crate::error::{DeployError, Result};
use crate::process::{CommandExecutor, CommandRequest, failure_reason};
use crate::version::VersionTuple;
use camino::Utf8Path;
use log::debug;
use std::fmt;

/// The identity recorded on commits and tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
}

/// A full commit hash as printed by `git rev-parse`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    /// Wrap a commit hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Return the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs git in one working copy, optionally with a fixed identity.
pub struct Git<'a> {
    repo: &'a Utf8Path,
    identity: Option<&'a GitIdentity>,
    executor: &'a dyn CommandExecutor,
}

impl<'a> Git<'a> {
    /// Create a git driver for the working copy at `repo`.
    #[must_use]
    pub fn new(
        repo: &'a Utf8Path,
        identity: Option<&'a GitIdentity>,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            repo,
            identity,
            executor,
        }
    }

    /// Stage every pending change, commit it with `message` and return the
    /// new commit.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Git`] naming the first git command that failed.
    pub fn commit_all(&self, message: &str) -> Result<CommitId> {
        self.run("add", &["add", "--all"])?;
        self.run("commit", &["commit", "-m", message])?;
        let commit = self.head()?;
        debug!("committed {commit} in {}: {message}", self.repo);
        Ok(commit)
    }

    /// Create the annotated tag `v<version>` on `commit`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Git`] if the tag cannot be created, for
    /// instance because it already exists.
    pub fn tag(&self, version: VersionTuple, commit: &CommitId) -> Result<String> {
        let name = version.tag_name();
        self.run("tag", &["tag", "-a", &name, "-m", &name, commit.as_str()])?;
        debug!("tagged {commit} as {name}");
        Ok(name)
    }

    /// Resolve the current `HEAD` commit.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Git`] if `HEAD` cannot be resolved.
    pub fn head(&self) -> Result<CommitId> {
        let stdout = self.run("rev-parse", &["rev-parse", "HEAD"])?;
        let hash = stdout.trim();
        if hash.is_empty() {
            return Err(DeployError::Git {
                operation: "rev-parse",
                message: "empty output".to_owned(),
            });
        }
        Ok(CommitId::new(hash))
    }

    fn run(&self, operation: &'static str, args: &[&str]) -> Result<String> {
        let mut request = CommandRequest::new("git")
            .args(args.iter().copied())
            .current_dir(self.repo);
        if let Some(identity) = self.identity {
            request = request
                .env("GIT_AUTHOR_NAME", &identity.name)
                .env("GIT_AUTHOR_EMAIL", &identity.email)
                .env("GIT_COMMITTER_NAME", &identity.name)
                .env("GIT_COMMITTER_EMAIL", &identity.email);
        }

        let output = self.executor.run(&request).map_err(|e| DeployError::Git {
            operation,
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(DeployError::Git {
                operation,
                message: failure_reason(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubExecutor};
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    const HASH: &str = "3f2a9c1d0e8b7a6f5e4d3c2b1a0f9e8d7c6b5a49";

    #[fixture]
    fn identity() -> GitIdentity {
        GitIdentity {
            name: "Release Bot".to_owned(),
            email: "release@example.org".to_owned(),
        }
    }

    #[rstest]
    fn commit_all_stages_commits_and_resolves_head(identity: GitIdentity) {
        let executor = StubExecutor::new(vec![
            ExpectedCall::ok("git", &["add", "--all"], ""),
            ExpectedCall::ok("git", &["commit", "-m", "Version 1.4.0.13"], ""),
            ExpectedCall::ok("git", &["rev-parse", "HEAD"], &format!("{HASH}\n")),
        ]);
        let repo = Utf8PathBuf::from("/work/DSpellCheck");

        let commit = Git::new(&repo, Some(&identity), &executor)
            .commit_all("Version 1.4.0.13")
            .expect("commit succeeds");

        executor.assert_finished();
        assert_eq!(commit.as_str(), HASH);
        for request in executor.received() {
            assert_eq!(request.working_dir.as_deref(), Some(repo.as_path()));
            assert!(request
                .env
                .contains(&("GIT_COMMITTER_EMAIL".to_owned(), "release@example.org".to_owned())));
            assert!(request
                .env
                .contains(&("GIT_AUTHOR_NAME".to_owned(), "Release Bot".to_owned())));
        }
    }

    #[rstest]
    fn commit_failure_stops_before_rev_parse(identity: GitIdentity) {
        let executor = StubExecutor::new(vec![
            ExpectedCall::ok("git", &["add", "--all"], ""),
            ExpectedCall::failing("git", &["commit", "-m", "Version 1.0.0.1"], "nothing to commit"),
        ]);
        let repo = Utf8PathBuf::from(".");

        let err = Git::new(&repo, Some(&identity), &executor)
            .commit_all("Version 1.0.0.1")
            .expect_err("commit fails");

        executor.assert_finished();
        assert!(matches!(
            err,
            DeployError::Git { operation: "commit", ref message } if message == "nothing to commit"
        ));
    }

    #[rstest]
    fn tag_is_annotated_with_version_name(identity: GitIdentity) {
        let executor = StubExecutor::new(vec![ExpectedCall::ok(
            "git",
            &["tag", "-a", "v1.4.0.13", "-m", "v1.4.0.13", HASH],
            "",
        )]);
        let repo = Utf8PathBuf::from(".");

        let name = Git::new(&repo, Some(&identity), &executor)
            .tag(VersionTuple::new(1, 4, 0, 13), &CommitId::new(HASH))
            .expect("tag succeeds");

        executor.assert_finished();
        assert_eq!(name, "v1.4.0.13");
    }

    #[test]
    fn without_identity_git_config_applies() {
        let executor = StubExecutor::new(vec![ExpectedCall::ok("git", &["rev-parse", "HEAD"], HASH)]);
        let repo = Utf8PathBuf::from(".");

        Git::new(&repo, None, &executor).head().expect("head resolves");

        assert!(executor.received()[0].env.is_empty());
    }

    #[test]
    fn empty_rev_parse_output_is_an_error() {
        let executor = StubExecutor::new(vec![ExpectedCall::ok("git", &["rev-parse", "HEAD"], "\n")]);
        let repo = Utf8PathBuf::from(".");

        let err = Git::new(&repo, None, &executor).head().expect_err("no hash");

        assert!(matches!(err, DeployError::Git { operation: "rev-parse", .. }));
    }
}
