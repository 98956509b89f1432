use anyhow::Result;
use git2::{ObjectType, Repository, Signature, Time};
use hashwish::{CommitRecord, PrefixSet, Search, SearchOutcome, object_id};
use std::fs;
use tempfile::TempDir;

// Builds a repository with one commit whose signatures carry fixed timestamps
fn setup_repo_with_commit() -> Result<(TempDir, git2::Oid)> {
    let temp_dir = TempDir::new()?;
    let repo = Repository::init(temp_dir.path())?;

    let author = Signature::new("A Name", "a.email@mail.me", &Time::new(1649669622, 120))?;
    let committer = Signature::new(
        "Another Name",
        "other.mail@mail.mw",
        &Time::new(1649669623, 120),
    )?;

    let tree_id = repo.index()?.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let oid = repo.commit(
        Some("HEAD"),
        &author,
        &committer,
        "initial commit\nehy!\n",
        &tree,
        &[],
    )?;

    Ok((temp_dir, oid))
}

#[test]
fn test_raw_commit_digest_matches_commit_id() -> Result<()> {
    let (temp_dir, oid) = setup_repo_with_commit()?;

    let raw = hashwish::git::read_raw_commit(temp_dir.path(), "HEAD")?;
    assert_eq!(object_id(&raw), oid.to_string());

    let record = CommitRecord::parse(raw.clone())?;
    assert_eq!(record.original_timestamps(), (1649669622, 1649669623));
    assert_eq!(record.author_timezone(), "+0200");
    assert_eq!(record.render(), raw);
    assert_eq!(record.digest(), oid.to_string());

    Ok(())
}

#[test]
fn test_found_record_is_a_valid_commit_object() -> Result<()> {
    let (temp_dir, _) = setup_repo_with_commit()?;
    let repo = Repository::open(temp_dir.path())?;

    let raw = hashwish::git::read_raw_commit(temp_dir.path(), "HEAD")?;
    let mut record = CommitRecord::parse(raw)?;
    let wished = PrefixSet::new(["0"])?;

    let solution = match Search::new(600).run(&mut record, &wished) {
        SearchOutcome::Found(solution) => solution,
        SearchOutcome::NotFound { attempts } => panic!("no match after {} attempts", attempts),
    };
    assert!(solution.digest.starts_with('0'));

    // Writing the rewritten record must produce exactly the digest we found
    let written = repo.odb()?.write(ObjectType::Commit, &solution.record)?;
    assert_eq!(written.to_string(), solution.digest);

    let commit = repo.find_commit(written)?;
    assert_eq!(commit.author().when().seconds(), solution.author_timestamp);
    assert_eq!(commit.committer().when().seconds(), solution.committer_timestamp);
    assert!(solution.committer_timestamp - 1649669623 >= solution.author_timestamp - 1649669622);
    assert_eq!(commit.message(), Some("initial commit\nehy!\n"));

    Ok(())
}

#[test]
fn test_read_raw_commit_from_subdirectory() -> Result<()> {
    let (temp_dir, oid) = setup_repo_with_commit()?;
    let nested = temp_dir.path().join("some").join("dir");
    fs::create_dir_all(&nested)?;

    let raw = hashwish::git::read_raw_commit(&nested, "HEAD")?;
    assert_eq!(object_id(&raw), oid.to_string());
    Ok(())
}

#[test]
fn test_read_raw_commit_outside_repository_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let not_a_repo = temp_dir.path().join("plain");
    fs::create_dir_all(&not_a_repo)?;

    // Guard against a surrounding repository being discovered
    if Repository::discover(&not_a_repo).is_ok() {
        return Ok(());
    }

    let err = hashwish::git::read_raw_commit(&not_a_repo, "HEAD").unwrap_err();
    assert!(err.to_string().contains("Failed to open git repository"));
    Ok(())
}

#[test]
fn test_read_raw_commit_unknown_revision_fails() -> Result<()> {
    let (temp_dir, _) = setup_repo_with_commit()?;

    let err = hashwish::git::read_raw_commit(temp_dir.path(), "no-such-branch").unwrap_err();
    assert!(err.to_string().contains("no-such-branch"));
    Ok(())
}

#[test]
fn test_read_input_prefers_file() -> Result<()> {
    use clap::Parser;

    let (temp_dir, oid) = setup_repo_with_commit()?;
    let raw = hashwish::git::read_raw_commit(temp_dir.path(), "HEAD")?;
    let input = temp_dir.path().join("commit.raw");
    fs::write(&input, &raw)?;

    let cli_args = hashwish::cli::CliArgs::parse_from([
        "hashwish".to_string(),
        "--input".to_string(),
        input.display().to_string(),
        "ca".to_string(),
    ]);
    let from_file = hashwish::git::read_input(&cli_args)?;
    assert_eq!(object_id(&from_file), oid.to_string());

    Ok(())
}
