use anyhow::{Context, Result};
use git2::Repository as GitRepository;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::cli::CliArgs;

/// Raw bytes of the commit object `rev` resolves to, exactly as stored
/// (the same content `git cat-file commit <rev>` prints).
pub fn read_raw_commit<P: AsRef<Path>>(repo_path: P, rev: &str) -> Result<Vec<u8>> {
    let repo_path = repo_path.as_ref();
    let git_repo = GitRepository::discover(repo_path)
        .with_context(|| format!("Failed to open git repository at {}", repo_path.display()))?;

    let commit = git_repo
        .revparse_single(rev)
        .and_then(|object| object.peel_to_commit())
        .with_context(|| format!("Failed to resolve {} to a commit", rev))?;

    let odb = git_repo.odb().context("Failed to open object database")?;
    let object = odb
        .read(commit.id())
        .with_context(|| format!("Failed to read commit object {}", commit.id()))?;

    debug!(commit = %commit.id(), bytes = object.len(), "Read raw commit object");
    Ok(object.data().to_vec())
}

/// Raw commit object from a file, or from stdin when the path is `-`
pub fn read_raw_commit_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        let mut raw = Vec::new();
        std::io::stdin()
            .read_to_end(&mut raw)
            .context("Failed to read commit object from stdin")?;
        return Ok(raw);
    }

    fs::read(path).with_context(|| format!("Failed to read commit object from {}", path.display()))
}

/// Reads the commit the command line points at
pub fn read_input(cli_args: &CliArgs) -> Result<Vec<u8>> {
    match &cli_args.input {
        Some(path) => read_raw_commit_file(path),
        None => read_raw_commit(&cli_args.repo, &cli_args.rev),
    }
}
