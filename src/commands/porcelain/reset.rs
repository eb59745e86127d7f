use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Move the current branch (or detached HEAD) to a commit
    ///
    /// The working directory is reconciled to the commit first and the
    /// staging index is cleared afterwards.
    pub fn reset(&self, revision: &str) -> anyhow::Result<ObjectId> {
        let target_oid = Revision::new(revision.to_string()).resolve(self.refs(), self.commits())?;

        let target = self.reconcile(&target_oid)?;
        self.refs().update_head(target_oid.clone())?;
        self.index().clear()?;

        tracing::info!(oid = %target_oid, "reset");
        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target_oid.to_short_oid(),
            target.short_message()
        )?;

        Ok(target_oid)
    }
}
