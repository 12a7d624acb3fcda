//! Client-visible directory tree: the C-ABI struct `getdirtree`/`freedirtree`
//! hand to the caller, built from the decoded `remfs_core::wire::DirTree`.
//!
//! The allocator for this tree is entirely internal to this crate (both
//! `getdirtree` and `freedirtree` are implemented here), so nodes are
//! `Box`-allocated and reclaimed with `Box::from_raw` rather than routed
//! through the system allocator.

use libc::{c_char, c_int};
use remfs_core::wire::DirTree;
use std::ffi::CString;

/// Mirrors the classic `struct dirtreenode { char *name; int num_subdirs;
/// struct dirtreenode **subdirs; }` this interposition target exposes.
#[repr(C)]
pub struct DirTreeNode {
    pub name: *mut c_char,
    pub num_subdirs: c_int,
    pub subdirs: *mut *mut DirTreeNode,
}

/// Convert a decoded tree into the C-ABI representation, leaking it into a
/// raw pointer the caller owns until it passes it to `freedirtree`.
pub fn into_raw(tree: DirTree) -> *mut DirTreeNode {
    Box::into_raw(Box::new(build(tree)))
}

fn build(tree: DirTree) -> DirTreeNode {
    let name = CString::new(tree.name)
        .unwrap_or_else(|_| CString::new("<invalid-name>").unwrap())
        .into_raw();

    let mut subdir_ptrs: Vec<*mut DirTreeNode> = tree
        .children
        .into_iter()
        .map(|child| Box::into_raw(Box::new(build(child))))
        .collect();

    let num_subdirs = subdir_ptrs.len() as c_int;
    subdir_ptrs.shrink_to_fit();
    let subdirs = if subdir_ptrs.is_empty() {
        std::ptr::null_mut()
    } else {
        let ptr = subdir_ptrs.as_mut_ptr();
        std::mem::forget(subdir_ptrs);
        ptr
    };

    DirTreeNode {
        name,
        num_subdirs,
        subdirs,
    }
}

/// Recursively free a tree built by [`into_raw`]. Safety: `node` must be
/// either null or a pointer this crate produced and not yet freed.
pub unsafe fn free_raw(node: *mut DirTreeNode) {
    if node.is_null() {
        return;
    }

    let node = Box::from_raw(node);

    if !node.subdirs.is_null() {
        let children = Vec::from_raw_parts(node.subdirs, node.num_subdirs as usize, node.num_subdirs as usize);
        for child in children {
            free_raw(child);
        }
    }

    drop(CString::from_raw(node.name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_nested_tree_through_the_c_abi_representation() {
        let tree = DirTree::with_children(
            "root",
            vec![
                DirTree::leaf("a"),
                DirTree::with_children("b", vec![DirTree::leaf("c")]),
            ],
        );

        let raw = into_raw(tree);

        unsafe {
            assert_eq!((*raw).num_subdirs, 2);
            free_raw(raw);
        }
    }
}
