// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mkrepo create` command implementation.
//!
//! Prepares a local directory with an initial commit, then asks `gh` to
//! create a private remote from it and push. A failing `gh` invocation is
//! most often a revoked or expired token, so the stored token is cleared
//! before the error is surfaced, unless the token `gh` saw came from the
//! environment override.

use std::path::{Path, PathBuf};

use colored::Colorize;
use mkrepo_config::model::RepoConfig;
use mkrepo_core::MkrepoError;
use mkrepo_vault::{CredentialAcquirer, CredentialStore, Prompt};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::runner::CommandRunner;

/// Environment variable `gh` reads its token from.
pub const GH_TOKEN_ENV: &str = "GH_TOKEN";

/// Arguments of `mkrepo create`.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub name: String,
    pub path: Option<PathBuf>,
    pub description: Option<String>,
    pub push: bool,
}

/// Everything the create workflow talks to.
pub struct CreateContext<'a> {
    pub repo: &'a RepoConfig,
    pub runner: &'a dyn CommandRunner,
    pub store: &'a CredentialStore,
    pub acquirer: &'a CredentialAcquirer<'a>,
    pub prompt: &'a mut dyn Prompt,
}

/// Run the create workflow, returning the local repository directory.
pub fn run_create(
    opts: &CreateOptions,
    base_dir: &Path,
    ctx: CreateContext<'_>,
) -> Result<PathBuf, MkrepoError> {
    validate_repo_name(&opts.name)?;

    let dir = match &opts.path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => base_dir.join(path),
        None => base_dir.join(&opts.name),
    };
    std::fs::create_dir_all(&dir)
        .map_err(|e| MkrepoError::io(format!("creating {}", dir.display()), e))?;
    step(&format!("Using directory {}", dir.display()));

    write_readme(&dir, &opts.name, opts.description.as_deref())?;
    commit_initial(ctx.repo, ctx.runner, &dir)?;

    if !opts.push {
        step("Skipping remote creation (--no-push)");
        return Ok(dir);
    }

    let (token, source) = ctx.acquirer.acquire(ctx.prompt)?;

    let mut args = owned(&[
        "repo",
        "create",
        opts.name.as_str(),
        "--private",
        "--source",
        ".",
        "--remote",
        "origin",
        "--push",
    ]);
    if let Some(description) = &opts.description {
        args.push("--description".to_string());
        args.push(description.clone());
    }

    step(&format!("Creating private repository {}", opts.name));
    let envs = [(GH_TOKEN_ENV, token.expose_secret())];
    if let Err(err) = ctx.runner.run_checked(&ctx.repo.gh_binary, &args, &dir, &envs) {
        if source.is_persisted() {
            warn!(error = %err, "repository creation failed; clearing stored token");
            ctx.store.clear()?;
        } else {
            warn!(
                error = %err,
                ?source,
                "repository creation failed; stored token left untouched"
            );
        }
        return Err(err);
    }

    info!(name = %opts.name, "repository created and pushed");
    println!(
        "{} {} is live and pushed",
        "done:".green().bold(),
        opts.name.bold()
    );
    Ok(dir)
}

/// Accept names `gh` would accept: ASCII letters, digits, `-`, `_` and `.`.
pub fn validate_repo_name(name: &str) -> Result<(), MkrepoError> {
    let well_formed = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if well_formed {
        Ok(())
    } else {
        Err(MkrepoError::Config(format!(
            "invalid repository name `{name}`: use letters, digits, `-`, `_` or `.`"
        )))
    }
}

fn write_readme(dir: &Path, name: &str, description: Option<&str>) -> Result<(), MkrepoError> {
    let readme = dir.join("README.md");
    if readme.exists() {
        return Ok(());
    }
    let mut content = format!("# {name}\n");
    if let Some(description) = description {
        content.push_str(&format!("\n{description}\n"));
    }
    std::fs::write(&readme, content)
        .map_err(|e| MkrepoError::io(format!("writing {}", readme.display()), e))?;
    step("Wrote README.md");
    Ok(())
}

/// `git init` if needed, then commit everything if the tree has changes.
fn commit_initial(
    repo: &RepoConfig,
    runner: &dyn CommandRunner,
    dir: &Path,
) -> Result<(), MkrepoError> {
    let git = repo.git_binary.as_str();
    if !dir.join(".git").exists() {
        runner.run_checked(git, &owned(&["init", "-b", repo.default_branch.as_str()]), dir, &[])?;
        step(&format!("Initialized git repository on {}", repo.default_branch));
    }

    let status = runner.run_checked(git, &owned(&["status", "--porcelain"]), dir, &[])?;
    if status.stdout.trim().is_empty() {
        step("Nothing new to commit");
        return Ok(());
    }

    runner.run_checked(git, &owned(&["add", "-A"]), dir, &[])?;
    runner.run_checked(git, &owned(&["commit", "-m", repo.commit_message.as_str()]), dir, &[])?;
    step(&format!("Committed \"{}\"", repo.commit_message));
    Ok(())
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn step(message: &str) {
    println!("{} {message}", "==>".cyan().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandOutput;
    use mkrepo_vault::{IdentityProbe, LinePrompt, MachineId, MachineIdentityResolver, TokenFormat};
    use secrecy::SecretString;
    use serial_test::serial;
    use std::cell::RefCell;
    use std::io::Cursor;

    struct Host;

    impl IdentityProbe for Host {
        fn name(&self) -> &str {
            "test-host"
        }

        fn probe(&self) -> Option<MachineId> {
            MachineId::new("c0ffee00c0ffee00c0ffee00c0ffee00")
        }
    }

    #[derive(Debug, Clone)]
    struct Invocation {
        program: String,
        args: Vec<String>,
        envs: Vec<(String, String)>,
    }

    /// Records invocations; `gh` exits with `gh_code`, everything else succeeds.
    struct RecordingRunner {
        calls: RefCell<Vec<Invocation>>,
        gh_code: i32,
        porcelain: &'static str,
    }

    impl RecordingRunner {
        fn new(gh_code: i32) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                gh_code,
                porcelain: "?? README.md\n",
            }
        }

        fn programs_and_first_args(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|c| format!("{} {}", c.program, c.args[0]))
                .collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(
            &self,
            program: &str,
            args: &[String],
            _cwd: &Path,
            envs: &[(&str, &str)],
        ) -> Result<CommandOutput, MkrepoError> {
            self.calls.borrow_mut().push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
                envs: envs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
            let code = if program == "gh" { self.gh_code } else { 0 };
            let stdout = if args.first().map(String::as_str) == Some("status") {
                self.porcelain.to_string()
            } else {
                String::new()
            };
            Ok(CommandOutput {
                success: code == 0,
                code: Some(code),
                stdout,
                stderr: if code == 0 {
                    String::new()
                } else {
                    "HTTP 401: Bad credentials".to_string()
                },
            })
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        store: CredentialStore,
        repo: RepoConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(
            dir.path().join("home/.mr_token"),
            MachineIdentityResolver::with_probes(vec![Box::new(Host)]),
        );
        Fixture {
            dir,
            store,
            repo: RepoConfig::default(),
        }
    }

    fn options(push: bool) -> CreateOptions {
        CreateOptions {
            name: "demo-repo".to_string(),
            path: None,
            description: Some("A demo".to_string()),
            push,
        }
    }

    fn run(
        fx: &Fixture,
        runner: &RecordingRunner,
        opts: &CreateOptions,
        input: &str,
    ) -> Result<PathBuf, MkrepoError> {
        let acquirer = CredentialAcquirer::new(&fx.store, TokenFormat::default());
        run_with(fx, runner, opts, input, acquirer)
    }

    fn run_with(
        fx: &Fixture,
        runner: &RecordingRunner,
        opts: &CreateOptions,
        input: &str,
        acquirer: CredentialAcquirer<'_>,
    ) -> Result<PathBuf, MkrepoError> {
        let mut prompt = LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        run_create(
            opts,
            fx.dir.path(),
            CreateContext {
                repo: &fx.repo,
                runner,
                store: &fx.store,
                acquirer: &acquirer,
                prompt: &mut prompt,
            },
        )
    }

    #[test]
    fn creates_commits_and_pushes_with_token() {
        let fx = fixture();
        let runner = RecordingRunner::new(0);

        let dir = run(&fx, &runner, &options(true), "ghp_abc123\n").unwrap();

        assert_eq!(dir, fx.dir.path().join("demo-repo"));
        let readme = std::fs::read_to_string(dir.join("README.md")).unwrap();
        assert_eq!(readme, "# demo-repo\n\nA demo\n");
        assert_eq!(
            runner.programs_and_first_args(),
            vec!["git init", "git status", "git add", "git commit", "gh repo"]
        );

        let calls = runner.calls.borrow();
        let gh = calls.last().unwrap();
        assert!(gh.args.contains(&"--private".to_string()));
        assert!(gh.args.contains(&"--push".to_string()));
        assert!(gh.args.ends_with(&["--description".to_string(), "A demo".to_string()]));
        assert_eq!(
            gh.envs,
            vec![(GH_TOKEN_ENV.to_string(), "ghp_abc123".to_string())]
        );
        // git never sees the token.
        assert!(calls[..calls.len() - 1].iter().all(|c| c.envs.is_empty()));
        assert!(fx.store.exists());
    }

    #[test]
    fn gh_failure_clears_stored_token() {
        let fx = fixture();
        fx.store
            .save(&SecretString::from("ghp_revoked1".to_string()))
            .unwrap();
        let runner = RecordingRunner::new(1);

        let err = run(&fx, &runner, &options(true), "").unwrap_err();

        assert!(matches!(
            err,
            MkrepoError::ExternalCommand { ref program, code: Some(1), .. } if program == "gh"
        ));
        assert!(!fx.store.exists());
    }

    #[test]
    #[serial]
    fn gh_failure_with_env_token_keeps_stored_token() {
        const VAR: &str = "MKREPO_TEST_CREATE_TOKEN";
        let fx = fixture();
        fx.store
            .save(&SecretString::from("ghp_goodstored1".to_string()))
            .unwrap();
        let runner = RecordingRunner::new(1);
        let acquirer =
            CredentialAcquirer::new(&fx.store, TokenFormat::default()).env_override(VAR);

        // SAFETY: test-only env mutation, serialized with other env tests.
        unsafe { std::env::set_var(VAR, "ghp_badenv9") };
        let result = run_with(&fx, &runner, &options(true), "", acquirer);
        unsafe { std::env::remove_var(VAR) };

        assert!(matches!(result, Err(MkrepoError::ExternalCommand { .. })));
        let calls = runner.calls.borrow();
        assert_eq!(
            calls.last().unwrap().envs,
            vec![(GH_TOKEN_ENV.to_string(), "ghp_badenv9".to_string())]
        );
        assert_eq!(
            fx.store.load().unwrap().unwrap().expose_secret(),
            "ghp_goodstored1"
        );
    }

    #[test]
    fn gh_failure_clears_freshly_prompted_token() {
        let fx = fixture();
        let runner = RecordingRunner::new(1);

        let err = run(&fx, &runner, &options(true), "ghp_typo1\n").unwrap_err();

        assert!(matches!(err, MkrepoError::ExternalCommand { .. }));
        assert!(!fx.store.exists());
    }

    #[test]
    fn no_push_skips_token_and_gh() {
        let fx = fixture();
        let runner = RecordingRunner::new(0);

        run(&fx, &runner, &options(false), "").unwrap();

        assert!(runner.calls.borrow().iter().all(|c| c.program == "git"));
        assert!(!fx.store.exists());
    }

    #[test]
    fn token_acquisition_failure_stops_before_gh() {
        let fx = fixture();
        let runner = RecordingRunner::new(0);

        let err = run(&fx, &runner, &options(true), "bad\nworse\nnope\n").unwrap_err();

        assert!(matches!(err, MkrepoError::MaxAttemptsExceeded { attempts: 3 }));
        assert!(runner.calls.borrow().iter().all(|c| c.program == "git"));
    }

    #[test]
    fn clean_tree_is_not_recommitted() {
        let fx = fixture();
        let mut runner = RecordingRunner::new(0);
        runner.porcelain = "";
        std::fs::create_dir_all(fx.dir.path().join("demo-repo/.git")).unwrap();

        run(&fx, &runner, &options(false), "").unwrap();

        assert_eq!(runner.programs_and_first_args(), vec!["git status"]);
    }

    #[test]
    fn existing_readme_is_kept() {
        let fx = fixture();
        let repo_dir = fx.dir.path().join("demo-repo");
        std::fs::create_dir_all(&repo_dir).unwrap();
        std::fs::write(repo_dir.join("README.md"), "custom\n").unwrap();

        run(&fx, &RecordingRunner::new(0), &options(false), "").unwrap();

        assert_eq!(
            std::fs::read_to_string(repo_dir.join("README.md")).unwrap(),
            "custom\n"
        );
    }

    #[test]
    fn explicit_relative_path_is_under_base_dir() {
        let fx = fixture();
        let mut opts = options(false);
        opts.path = Some(PathBuf::from("work/elsewhere"));

        let dir = run(&fx, &RecordingRunner::new(0), &opts, "").unwrap();
        assert_eq!(dir, fx.dir.path().join("work/elsewhere"));
    }

    #[test]
    fn repo_name_rules() {
        assert!(validate_repo_name("my-repo_2.0").is_ok());
        assert!(validate_repo_name("").is_err());
        assert!(validate_repo_name("..").is_err());
        assert!(validate_repo_name("owner/repo").is_err());
        assert!(validate_repo_name("has space").is_err());
    }
}
