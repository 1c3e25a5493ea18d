//! Inode to path mapping.
//!
//! FUSE identifies entries by inode, while [`DataLayerFs`](crate::DataLayerFs)
//! works on paths. Inodes are handed out on first sight and never reused.

use crate::path::FsPath;
use fuser::FUSE_ROOT_ID;
use std::collections::HashMap;

pub struct InodeTable {
    path_to_inode: HashMap<FsPath, u64>,
    inode_to_path: HashMap<u64, FsPath>,
    next_inode: u64,
}

impl InodeTable {
    /// Create a table holding only the root directory.
    pub fn new() -> Self {
        let mut table = Self {
            path_to_inode: HashMap::new(),
            inode_to_path: HashMap::new(),
            next_inode: FUSE_ROOT_ID + 1,
        };
        table.path_to_inode.insert(FsPath::Root, FUSE_ROOT_ID);
        table.inode_to_path.insert(FUSE_ROOT_ID, FsPath::Root);
        table
    }

    pub fn get_or_create(&mut self, path: &FsPath) -> u64 {
        if let Some(&ino) = self.path_to_inode.get(path) {
            return ino;
        }

        let ino = self.next_inode;
        self.next_inode += 1;
        self.path_to_inode.insert(path.clone(), ino);
        self.inode_to_path.insert(ino, path.clone());
        ino
    }

    pub fn get_path(&self, inode: u64) -> Option<&FsPath> {
        self.inode_to_path.get(&inode)
    }

    pub fn entry_count(&self) -> usize {
        self.inode_to_path.len()
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_preassigned() {
        let table = InodeTable::new();
        assert_eq!(table.get_path(FUSE_ROOT_ID), Some(&FsPath::Root));
        assert_eq!(table.entry_count(), 1);
    }

    #[test]
    fn inodes_are_stable() {
        let mut table = InodeTable::new();
        let key = FsPath::resolve("/storeA/key");
        let ino = table.get_or_create(&key);
        assert_eq!(table.get_or_create(&key), ino);
        assert_eq!(table.get_path(ino), Some(&key));

        let other = table.get_or_create(&FsPath::resolve("/storeA"));
        assert_ne!(other, ino);
        assert!(table.get_path(999).is_none());
    }
}
