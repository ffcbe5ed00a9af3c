use crate::areas::controller::Role;
use crate::areas::filter::FilteredTree;
use crate::areas::session::Session;
use crate::areas::workspace::Workspace;
use crate::artifacts::align::match_factor;
use derive_new::new;
use std::path::PathBuf;

#[derive(Debug, Clone, new)]
pub struct AlignOptions {
    pub old: PathBuf,
    pub new: PathBuf,
    #[new(default)]
    pub exclude: Vec<String>,
}

/// What automatic alignment would do with two trees
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentReport {
    pub offset: isize,
    pub match_factor: f64,
    pub aligned_match_factor: f64,
    pub old_root: String,
    pub new_root: String,
}

impl Session {
    pub fn align(&mut self, options: &AlignOptions) -> anyhow::Result<AlignmentReport> {
        let old = FilteredTree::with_patterns(Workspace::new(&options.old), &options.exclude)?;
        let new = FilteredTree::with_patterns(Workspace::new(&options.new), &options.exclude)?;
        self.load(&old, &new)?;

        let offset = self
            .controller_mut()
            .align()
            .ok_or_else(|| anyhow::anyhow!("both trees must be loaded before aligning"))?;

        let controller = self.controller();
        let (Some(old), Some(new), Some(old_root), Some(new_root)) = (
            controller.root(Role::Old),
            controller.root(Role::New),
            controller.compare_root(Role::Old),
            controller.compare_root(Role::New),
        ) else {
            anyhow::bail!("both trees must be loaded before aligning");
        };

        let report = AlignmentReport {
            offset,
            match_factor: match_factor(old, new),
            aligned_match_factor: match_factor(old_root, new_root),
            old_root: controller.compare_label(Role::Old).unwrap_or_default(),
            new_root: controller.compare_label(Role::New).unwrap_or_default(),
        };

        writeln!(self.writer(), "offset: {}", report.offset)?;
        writeln!(self.writer(), "match factor: {:.2}", report.match_factor)?;
        writeln!(self.writer(), "aligned match factor: {:.2}", report.aligned_match_factor)?;
        writeln!(self.writer(), "old root: {}", report.old_root)?;
        writeln!(self.writer(), "new root: {}", report.new_root)?;

        Ok(report)
    }
}
