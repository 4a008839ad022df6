//! The git working tree holding committed snapshot files.

use std::path::Path;

use git2::{Commit, ErrorCode, Oid, Repository, Signature};
use tracing::info;

use crate::error::BranchResult;

pub struct SnapshotRepo {
    repo: Repository,
    bot_name: String,
    bot_email: String,
}

fn unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

impl SnapshotRepo {
    /// Open the repository at `path`, initialising it if there is none.
    pub fn open_or_init(path: &Path, bot_name: &str, bot_email: &str) -> BranchResult<Self> {
        std::fs::create_dir_all(path)?;
        let repo = match Repository::open(path) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => {
                info!(path = %path.display(), "initialising snapshot repository");
                Repository::init(path)?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            repo,
            bot_name: bot_name.to_string(),
            bot_email: bot_email.to_string(),
        })
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Content of `rel_path` at `HEAD`; empty when there are no commits yet
    /// or the file was never committed.
    pub fn committed(&self, rel_path: &str) -> BranchResult<String> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if unborn(&e) => return Ok(String::new()),
            Err(e) => return Err(e.into()),
        };
        let tree = head.peel_to_tree()?;
        let entry = match tree.get_path(Path::new(rel_path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(String::new()),
            Err(e) => return Err(e.into()),
        };
        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Stage `files` (relative to the working tree) and commit them as the
    /// bot identity.
    pub fn commit(&self, files: &[String], message: &str) -> BranchResult<Oid> {
        let mut index = self.repo.index()?;
        for file in files {
            index.add_path(Path::new(file))?;
        }
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = Signature::now(&self.bot_name, &self.bot_email)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if unborn(&e) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        info!(%oid, message, "snapshot committed");
        Ok(oid)
    }

    /// Message of the commit at `HEAD`, if any.
    pub fn head_message(&self) -> BranchResult<Option<String>> {
        match self.repo.head() {
            Ok(head) => Ok(head.peel_to_commit()?.message().map(str::to_string)),
            Err(e) if unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SnapshotRepo::open_or_init(dir.path(), "bot", "bot@example.org").unwrap();
        assert_eq!(repo.committed("concepts.ttl").unwrap(), "");
        assert_eq!(repo.head_message().unwrap(), None);

        std::fs::write(dir.path().join("concepts.ttl"), "# h\n\n").unwrap();
        repo.commit(&["concepts.ttl".to_string()], "TICKET-1").unwrap();
        assert_eq!(repo.committed("concepts.ttl").unwrap(), "# h\n\n");
        assert_eq!(repo.committed("mappings.ttl").unwrap(), "");
        assert_eq!(repo.head_message().unwrap().as_deref(), Some("TICKET-1"));

        std::fs::write(dir.path().join("concepts.ttl"), "# h\n\n<a>\n").unwrap();
        repo.commit(&["concepts.ttl".to_string()], "TICKET-2").unwrap();
        assert_eq!(repo.committed("concepts.ttl").unwrap(), "# h\n\n<a>\n");
    }

    #[test]
    fn reopens_existing_repository() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = SnapshotRepo::open_or_init(dir.path(), "bot", "bot@example.org").unwrap();
            std::fs::write(dir.path().join("mappings.ttl"), "x\n").unwrap();
            repo.commit(&["mappings.ttl".to_string()], "first").unwrap();
        }
        let repo = SnapshotRepo::open_or_init(dir.path(), "bot", "bot@example.org").unwrap();
        assert_eq!(repo.committed("mappings.ttl").unwrap(), "x\n");
    }
}
