//! Server-side directory-tree construction (SPEC_FULL.md §4.6 — supplements
//! spec.md, which specifies the tree's wire codec but not how the server
//! actually builds one).

use remfs_core::wire::DirTree;
use std::path::Path;

/// Walk `path` and its subdirectories, building a tree in the order entries
/// are yielded by `std::fs::read_dir` — no sorting (spec.md §3: "ordered as
/// received from the OS"). Symlinks are left as leaves rather than followed.
pub fn build(path: &Path) -> std::io::Result<DirTree> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    build_named(path, name)
}

fn build_named(path: &Path, name: String) -> std::io::Result<DirTree> {
    let file_type = std::fs::symlink_metadata(path)?.file_type();

    if !file_type.is_dir() {
        return Ok(DirTree::leaf(name));
    }

    let mut children = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let child_name = entry.file_name().to_string_lossy().into_owned();
        children.push(build_named(&entry.path(), child_name)?);
    }

    Ok(DirTree::with_children(name, children))
}
