use crate::areas::builder::TreeBuilder;
use crate::areas::memory::MemorySource;
use crate::artifacts::errors::ErrorHandler;
use crate::artifacts::nodes::{ContentMethod, ContentSource, Cost, DirNode, FileNode, FileType};
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use derive_new::new;
use std::fs::{File, Metadata};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use walkdir::WalkDir;

/// Tree builder reading a directory (or a single file) from disk
///
/// Symbolic links are not followed; their content is the link target. Other
/// special files (devices, sockets, pipes) have empty content.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Workspace {
            path: path.as_ref().into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn walk(&self, handler: &mut dyn ErrorHandler) -> anyhow::Result<DirNode> {
        let mut root = DirNode::default();

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    let error = anyhow::Error::from(error).context(format!(
                        "Unable to list entries below {}",
                        self.path.display()
                    ));
                    if handler.handle_error(&error) {
                        continue;
                    }
                    return Err(error);
                }
            };

            let relative = entry.path().strip_prefix(&self.path)?;
            let names = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            let Some((name, parents)) = names.split_last() else {
                continue;
            };

            let parent = parents
                .iter()
                .fold(&mut root, |dir, parent| dir.ensure_dir(parent));

            if entry.file_type().is_dir() {
                parent.ensure_dir(name);
                continue;
            }

            let leaf = entry
                .metadata()
                .map_err(anyhow::Error::from)
                .and_then(|metadata| Self::leaf(entry.path(), name, &metadata))
                .with_context(|| format!("Unable to stat {}", entry.path().display()));
            match leaf {
                Ok(leaf) => parent.add_leaf(leaf),
                Err(error) if handler.handle_error(&error) => continue,
                Err(error) => return Err(error),
            }
        }

        Ok(root)
    }

    fn leaf(path: &Path, name: &str, metadata: &Metadata) -> anyhow::Result<FileNode> {
        let file_type = metadata.file_type();

        let node = if file_type.is_file() {
            FileNode::new(
                name.to_string(),
                FileType::Regular,
                metadata.len(),
                Arc::new(FsSource::new(path.to_path_buf())),
            )
        } else if file_type.is_symlink() {
            let target = std::fs::read_link(path)?.to_string_lossy().into_owned();
            FileNode::new(
                name.to_string(),
                FileType::Symlink,
                target.len() as u64,
                Arc::new(MemorySource::new(target)),
            )
        } else {
            FileNode::new(
                name.to_string(),
                FileType::Special,
                0,
                Arc::new(MemorySource::new(Bytes::new())),
            )
        };

        Ok(match metadata.modified() {
            Ok(modified) => node.with_modified(DateTime::<Utc>::from(modified)),
            Err(_) => node,
        })
    }
}

impl TreeBuilder for Workspace {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn build(&self, handler: &mut dyn ErrorHandler) -> anyhow::Result<DirNode> {
        let metadata = std::fs::symlink_metadata(&self.path)
            .with_context(|| format!("The specified path does not exist: {}", self.path.display()))?;

        let tree = if metadata.is_dir() {
            self.walk(handler)?
        } else {
            let name = self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            DirNode::singleton_leaf(Arc::new(Self::leaf(&self.path, &name, &metadata)?))
        };

        info!(root = %self.path.display(), entries = tree.entry_count(), "built tree");
        Ok(tree.with_root(self.describe()))
    }
}

/// Content of a regular file on disk
///
/// Nothing is known up front, so every proof means reading the whole file; a
/// straight byte comparison is cheaper than hashing.
#[derive(Debug, new)]
pub struct FsSource {
    path: PathBuf,
}

impl ContentSource for FsSource {
    fn cost(&self, method: ContentMethod) -> Cost {
        match method {
            ContentMethod::Checksum => Cost::Hard,
            ContentMethod::Digest => Cost::VeryHard,
            ContentMethod::Bytes | ContentMethod::Text => Cost::Moderate,
        }
    }

    fn open(&self) -> anyhow::Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Unable to open {}", self.path.display()))?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::errors::ReportingErrorHandler;
    use crate::artifacts::nodes::Node;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn workspace_dir() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        dir.child("a/b").create_dir_all().expect("create a/b");
        dir.child("1.txt").write_str("one").expect("write 1.txt");
        dir.child("a/2.txt").write_str("two").expect("write 2.txt");
        dir.child("a/b/3.txt").write_str("three").expect("write 3.txt");
        dir.child("empty").create_dir_all().expect("create empty");
        dir
    }

    fn build(path: &Path) -> anyhow::Result<DirNode> {
        Workspace::new(path).build(&mut ReportingErrorHandler::default())
    }

    #[rstest]
    fn builds_the_whole_directory(workspace_dir: TempDir) -> anyhow::Result<()> {
        let tree = build(workspace_dir.path())?;

        assert_eq!(tree.name(), "");
        assert_eq!(tree.root(), Some(workspace_dir.path().display().to_string().as_str()));
        assert_eq!(tree.entry_count(), 6);

        let three = tree
            .dir("a")
            .and_then(|a| a.dir("b"))
            .and_then(|b| b.leaf("3.txt"))
            .expect("3.txt is found");
        assert_eq!(three.size(), 5);
        assert_eq!(three.file_type(), FileType::Regular);
        assert!(three.modified().is_some());
        assert!(tree.dir("empty").is_some_and(|empty| empty.is_empty()));

        Ok(())
    }

    #[rstest]
    fn file_content_is_streamed_from_disk(workspace_dir: TempDir) -> anyhow::Result<()> {
        let tree = build(workspace_dir.path())?;
        let one = tree.leaf("1.txt").expect("1.txt is found");

        let mut content = String::new();
        one.open()?.read_to_string(&mut content)?;

        assert_eq!(content, "one");
        assert_eq!(one.cost(ContentMethod::Bytes), Cost::Moderate);
        Ok(())
    }

    #[rstest]
    fn single_file_root_is_wrapped(workspace_dir: TempDir) -> anyhow::Result<()> {
        let tree = build(&workspace_dir.path().join("a").join("2.txt"))?;

        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.leaves()[0].name(), "2.txt");
        assert!(tree.dirs().is_empty());
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");

        assert!(build(&dir.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[rstest]
    fn symlinks_are_not_followed(workspace_dir: TempDir) -> anyhow::Result<()> {
        std::os::unix::fs::symlink("a", workspace_dir.path().join("link"))?;

        let tree = build(workspace_dir.path())?;
        let link = tree.leaf("link").expect("link is a leaf");

        assert_eq!(link.file_type(), FileType::Symlink);
        assert_eq!(link.size(), 1);
        assert!(tree.dir("link").is_none());
        Ok(())
    }
}
