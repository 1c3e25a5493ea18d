//! FUSE adapter implementation for DataLayer stores.
//!
//! This module implements the `fuser::Filesystem` trait for `DataLayerFuse`.
//! Callbacks arrive on the FUSE session thread; each one resolves its inode
//! to a path, moves its reply into a task on the tokio runtime, and that task
//! answers the kernel once the node has responded.

use crate::adapter::{DataLayerFs, EntryKind};
use crate::config::MountConfig;
use crate::fuse::inode_table::InodeTable;
use crate::path::FsPath;
use fuser::consts::FOPEN_DIRECT_IO;
use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, MountOption, ReplyAttr, ReplyData,
    ReplyDirectory, ReplyEntry, ReplyOpen, Request, Session, SessionUnmounter, FUSE_ROOT_ID,
};
use libc::{EINVAL, ENOENT, ENOTDIR};
use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;

/// Time-to-live for attributes and entries handed to the kernel.
const TTL: Duration = Duration::from_secs(1);

/// Block size for filesystem statistics.
const BLOCK_SIZE: u32 = 512;

/// FUSE filesystem exposing DataLayer stores as directories.
pub struct DataLayerFuse {
    fs: Arc<DataLayerFs>,
    /// Runtime the node calls are spawned on.
    rt: Handle,
    inodes: Arc<Mutex<InodeTable>>,
    uid: u32,
    gid: u32,
    mount_time: SystemTime,
}

/// Attribute template shared by the spawned reply tasks.
#[derive(Clone, Copy)]
struct AttrTemplate {
    uid: u32,
    gid: u32,
    time: SystemTime,
}

impl AttrTemplate {
    fn build(&self, ino: u64, kind: EntryKind) -> FileAttr {
        let (file_type, size, perm, nlink) = match kind {
            EntryKind::Directory => (FileType::Directory, 0, 0o555, 2),
            EntryKind::File { size } => (FileType::RegularFile, size, 0o444, 1),
        };

        FileAttr {
            ino,
            size,
            blocks: size.div_ceil(BLOCK_SIZE as u64),
            atime: self.time,
            mtime: self.time,
            ctime: self.time,
            crtime: self.time,
            kind: file_type,
            perm,
            nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }
}

impl DataLayerFuse {
    pub fn new(fs: Arc<DataLayerFs>, rt: Handle) -> Self {
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };

        Self {
            fs,
            rt,
            inodes: Arc::new(Mutex::new(InodeTable::new())),
            uid,
            gid,
            mount_time: SystemTime::now(),
        }
    }

    fn template(&self) -> AttrTemplate {
        AttrTemplate {
            uid: self.uid,
            gid: self.gid,
            time: self.mount_time,
        }
    }

    fn path_of(&self, ino: u64) -> Option<FsPath> {
        self.inodes.lock().get_path(ino).cloned()
    }
}

impl Filesystem for DataLayerFuse {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), libc::c_int> {
        debug!("FUSE session initialised");
        Ok(())
    }

    fn destroy(&mut self) {
        debug!(
            "FUSE session destroyed ({} inodes assigned)",
            self.inodes.lock().entry_count()
        );
    }

    /// Look up a directory entry by name.
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let name_str = name.to_string_lossy().into_owned();
        trace!("lookup(parent={}, name='{}')", parent, name_str);

        let Some(parent_path) = self.path_of(parent) else {
            reply.error(ENOENT);
            return;
        };
        let path = parent_path.child(&name_str);
        if path == FsPath::Invalid {
            reply.error(ENOENT);
            return;
        }

        let fs = Arc::clone(&self.fs);
        let inodes = Arc::clone(&self.inodes);
        let template = self.template();
        self.rt.spawn(async move {
            match fs.stat(&path).await {
                Ok(kind) => {
                    let ino = inodes.lock().get_or_create(&path);
                    reply.entry(&TTL, &template.build(ino, kind), 0);
                }
                Err(e) => {
                    debug!("lookup {}: {}", path, e);
                    reply.error(e.errno());
                }
            }
        });
    }

    /// Get file attributes.
    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!("getattr(ino={})", ino);

        if ino == FUSE_ROOT_ID {
            reply.attr(&TTL, &self.template().build(ino, EntryKind::Directory));
            return;
        }

        let Some(path) = self.path_of(ino) else {
            warn!("getattr: inode {} not found", ino);
            reply.error(ENOENT);
            return;
        };

        let fs = Arc::clone(&self.fs);
        let template = self.template();
        self.rt.spawn(async move {
            match fs.stat(&path).await {
                Ok(kind) => reply.attr(&TTL, &template.build(ino, kind)),
                Err(e) => reply.error(e.errno()),
            }
        });
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        trace!("opendir(ino={})", ino);
        match self.path_of(ino) {
            Some(path) if path.is_dir() => reply.opened(0, 0),
            Some(_) => reply.error(ENOTDIR),
            None => reply.error(ENOENT),
        }
    }

    /// Read directory entries.
    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!("readdir(ino={}, offset={})", ino, offset);

        let Some(path) = self.path_of(ino) else {
            reply.error(ENOENT);
            return;
        };
        if !path.is_dir() {
            reply.error(ENOTDIR);
            return;
        }

        let fs = Arc::clone(&self.fs);
        let inodes = Arc::clone(&self.inodes);
        self.rt.spawn(async move {
            let names = match fs.readdir(&path).await {
                Ok(names) => names,
                Err(e) => {
                    reply.error(e.errno());
                    return;
                }
            };

            let child_kind = if path == FsPath::Root {
                FileType::Directory
            } else {
                FileType::RegularFile
            };

            // ".", "..", then the listing
            let entries: Vec<(u64, FileType, String)> = {
                let mut table = inodes.lock();
                let mut entries = vec![
                    (ino, FileType::Directory, ".".to_string()),
                    (FUSE_ROOT_ID, FileType::Directory, "..".to_string()),
                ];
                for name in names {
                    let child = table.get_or_create(&path.child(&name));
                    entries.push((child, child_kind, name));
                }
                entries
            };

            let skip = usize::try_from(offset).unwrap_or(0);
            for (i, (ino, kind, name)) in entries.into_iter().enumerate().skip(skip) {
                // next_offset = i + 1
                if reply.add(ino, (i + 1) as i64, kind, &name) {
                    break;
                }
            }
            reply.ok();
        });
    }

    /// Open a file.
    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!("open(ino={}, flags={:#o})", ino, flags);

        let Some(path) = self.path_of(ino) else {
            reply.error(ENOENT);
            return;
        };

        let fs = Arc::clone(&self.fs);
        self.rt.spawn(async move {
            match fs.open(&path, flags).await {
                // Value length may change between opens; bypass the page cache.
                Ok(fh) => reply.opened(fh, FOPEN_DIRECT_IO),
                Err(e) => reply.error(e.errno()),
            }
        });
    }

    /// Read file data.
    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        trace!("read(ino={}, offset={}, size={})", ino, offset, size);

        let Ok(offset) = u64::try_from(offset) else {
            reply.error(EINVAL);
            return;
        };
        let Some(path) = self.path_of(ino) else {
            warn!("read: inode {} not found", ino);
            reply.error(ENOENT);
            return;
        };

        let fs = Arc::clone(&self.fs);
        self.rt.spawn(async move {
            let mut buffer = vec![0u8; size as usize];
            let copied = fs.read(&path, fh, &mut buffer, offset).await;
            reply.data(&buffer[..copied]);
        });
    }
}

/// A mounted filesystem. Dropping it unmounts.
pub struct MountHandle {
    mount_point: PathBuf,
    unmounter: Option<SessionUnmounter>,
    session: Option<JoinHandle<io::Result<()>>>,
}

impl MountHandle {
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Detach the filesystem and wait for the session thread to finish.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    pub fn unmount(&mut self) -> io::Result<()> {
        let Some(mut unmounter) = self.unmounter.take() else {
            return Ok(());
        };

        debug!("Unmounting {}", self.mount_point.display());
        unmounter.unmount()?;

        match self.session.take() {
            Some(session) => session
                .join()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "FUSE session thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        if let Err(e) = self.unmount() {
            error!("unmount of {} failed: {}", self.mount_point.display(), e);
        }
    }
}

/// Mount `fs` at `config.mount_path` and serve it from a background thread.
///
/// Node calls are spawned onto `rt`, which must outlive the returned handle.
///
/// # Errors
///
/// Returns an error if the mount point is invalid or FUSE mounting fails.
pub fn mount(fs: Arc<DataLayerFs>, config: &MountConfig, rt: Handle) -> io::Result<MountHandle> {
    let mount_point = config.mount_path.clone();

    let mut options = vec![
        MountOption::RO,
        MountOption::FSName("datalayer".to_string()),
        MountOption::Subtype("datalayer".to_string()),
        MountOption::DefaultPermissions,
        MountOption::NoExec,
    ];
    if config.allow_other {
        options.push(MountOption::AllowOther);
    }

    debug!("Mounting DataLayer stores at {}", mount_point.display());

    let filesystem = DataLayerFuse::new(fs, rt);
    let mut session = Session::new(filesystem, mount_point.as_path(), &options).map_err(|e| {
        io::Error::new(e.kind(), format!("FUSE mount failed: {}", e))
    })?;
    let unmounter = session.unmount_callable();

    let thread = std::thread::Builder::new()
        .name("datalayer-fuse".to_string())
        .spawn(move || session.run())?;

    info!("Filesystem mounted at {}", mount_point.display());
    Ok(MountHandle {
        mount_point,
        unmounter: Some(unmounter),
        session: Some(thread),
    })
}
