use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Show the history from HEAD back to the root commit
    ///
    /// Returns the ids shown, newest first.
    pub fn log(&self) -> anyhow::Result<Vec<ObjectId>> {
        let head_oid = self.refs().current_oid()?;
        let mut shown = Vec::new();

        for entry in RevList::new(self.commits(), head_oid) {
            let (commit_oid, commit) = entry?;
            self.display_commit(&commit_oid, &commit)?;
            shown.push(commit_oid);
        }

        Ok(shown)
    }

    /// Show every commit in the store, in no particular order
    pub fn global_log(&self) -> anyhow::Result<Vec<ObjectId>> {
        let commit_oids = self.commits().list_objects()?;

        for commit_oid in &commit_oids {
            let commit = self.load_commit(commit_oid)?;
            self.display_commit(commit_oid, &commit)?;
        }

        Ok(commit_oids)
    }

    /// Print the ids of all commits whose message is exactly `message`
    pub fn find(&self, message: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut found = Vec::new();

        for commit_oid in self.commits().list_objects()? {
            if self.load_commit(&commit_oid)?.message() == message {
                writeln!(self.writer(), "{}", commit_oid)?;
                found.push(commit_oid);
            }
        }

        if found.is_empty() {
            return Err(TwigError::NotFound("found no commit with that message".to_string()).into());
        }

        Ok(found)
    }

    fn display_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(self.writer(), "===")?;
        writeln!(self.writer(), "{}", format!("commit {}", commit_oid).yellow())?;
        writeln!(self.writer(), "Date: {}", commit.readable_timestamp())?;
        writeln!(self.writer(), "{}", commit.message())?;
        writeln!(self.writer())?;

        Ok(())
    }
}
