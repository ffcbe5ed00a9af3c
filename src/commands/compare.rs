use crate::areas::controller::Role;
use crate::areas::filter::FilteredTree;
use crate::areas::session::Session;
use crate::areas::workspace::Workspace;
use crate::artifacts::nodes::{ComparisonEntry, ComparisonSummary, EntryKind, EntryStatus};
use derive_new::new;
use std::path::PathBuf;
use std::str::FromStr;

/// Compare root pinned from the command line, written `old=a/b` or `new=c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedRoot {
    pub role: Role,
    pub path: Vec<String>,
}

impl FromStr for ForcedRoot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (role, path) = s
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected SIDE=PATH, got '{s}'"))?;

        Ok(ForcedRoot {
            role: role.parse()?,
            path: path
                .split('/')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, new)]
pub struct CompareOptions {
    pub old: PathBuf,
    pub new: PathBuf,
    #[new(default)]
    pub exclude: Vec<String>,
    #[new(default)]
    pub forced: Vec<ForcedRoot>,
    #[new(default)]
    pub show_all: bool,
}

impl Session {
    pub fn compare(&mut self, options: &CompareOptions) -> anyhow::Result<ComparisonSummary> {
        let old = FilteredTree::with_patterns(Workspace::new(&options.old), &options.exclude)?;
        let new = FilteredTree::with_patterns(Workspace::new(&options.new), &options.exclude)?;
        self.load(&old, &new)?;

        for forced in options.forced.iter() {
            self.controller_mut().force_root(forced.role, &forced.path)?;
        }

        let result = self
            .run_comparison()?
            .ok_or_else(|| anyhow::anyhow!("both trees must be loaded before comparing"))?;

        for entry in result.entries() {
            if entry.status == EntryStatus::Same && !options.show_all {
                continue;
            }
            writeln!(self.writer(), "{} {}", entry.status, entry_label(&entry))?;
        }

        let summary = result.summary();
        writeln!(self.writer(), "{summary}")?;

        Ok(summary)
    }
}

fn entry_label(entry: &ComparisonEntry) -> String {
    let mut label = entry.path.clone();

    if entry.kind == EntryKind::Directory {
        label.push('/');
    }
    if let Some(renamed_to) = &entry.renamed_to {
        label.push_str(" -> ");
        label.push_str(renamed_to);
    }

    label
}
