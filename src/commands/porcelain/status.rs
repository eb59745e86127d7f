use crate::areas::repository::Repository;
use crate::artifacts::branch::head::Head;
use crate::artifacts::status::status_info::{Status, StatusInfo};
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print branches, staged and removed files, unstaged modifications and
    /// untracked files
    pub fn status(&self) -> anyhow::Result<StatusInfo> {
        let info = Status::new(self).initialize()?;

        self.print_branches(&info)?;

        writeln!(self.writer(), "=== Staged Files ===")?;
        for file in &info.staged_files {
            writeln!(self.writer(), "{}", file.display().to_string().green())?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Removed Files ===")?;
        for file in &info.removed_files {
            writeln!(self.writer(), "{}", file.display().to_string().red())?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Modifications Not Staged For Commit ===")?;
        for (file, change) in &info.workspace_changeset {
            writeln!(
                self.writer(),
                "{} ({})",
                file.display(),
                change.to_colored_label()
            )?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Untracked Files ===")?;
        for file in &info.untracked_files {
            writeln!(self.writer(), "{}", file.display().to_string().red())?;
        }
        writeln!(self.writer())?;

        Ok(info)
    }

    fn print_branches(&self, info: &StatusInfo) -> anyhow::Result<()> {
        writeln!(self.writer(), "=== Branches ===")?;

        if let Head::Detached(_) = info.head {
            writeln!(self.writer(), "*{}", info.head.to_string().green())?;
        }

        for branch in &info.branches {
            if info.head.branch() == Some(branch) {
                writeln!(self.writer(), "*{}", branch.to_string().green())?;
            } else {
                writeln!(self.writer(), "{}", branch)?;
            }
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
