use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Create a branch at the current commit; HEAD does not move
    pub fn branch(&self, branch_name: &str) -> anyhow::Result<ObjectId> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let source_oid = self.refs().current_oid()?;

        self.refs().create_branch(&branch_name, source_oid.clone())?;

        Ok(source_oid)
    }

    /// Delete a branch pointer; its commits stay in the store
    pub fn delete_branch(&self, branch_name: &str) -> anyhow::Result<ObjectId> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let oid = self.refs().delete_branch(&branch_name)?;

        writeln!(
            self.writer(),
            "Deleted branch {} (was {})",
            branch_name,
            oid.to_short_oid()
        )?;

        Ok(oid)
    }
}
