//! FUSE protocol adapter over a built inode table.
//!
//! The kernel dispatches each operation on its own thread; the table is
//! immutable after construction, so handlers only block when file content
//! or a link target has to be fetched through the async core, bridged via
//! a runtime handle.

use std::ffi::OsStr;
use std::time::{Duration, SystemTime};

use fuser::{
    FileType, MountOption, ReplyAttr, ReplyData, ReplyDirectory, ReplyEntry, Request, TimeOrNow,
};
use std::sync::Arc;
use tracing::debug;

use refmount_fs::{InodeId, InodeTable};
use refmount_types::{FileAttr, FileKind, FsError};

/// How long the kernel may cache attributes and entries. The table never
/// changes during a mount, so this is purely a chattiness knob.
const TTL: Duration = Duration::from_secs(1);

/// Mount options for a read-only refmount.
pub fn mount_options(allow_other: bool) -> Vec<MountOption> {
    let mut options = vec![
        MountOption::RO,
        MountOption::FSName("refmount".to_string()),
        MountOption::DefaultPermissions,
    ];
    if allow_other {
        options.push(MountOption::AllowOther);
    }
    options
}

/// The fuser callback handler.
pub struct RefMountFuse {
    table: Arc<InodeTable>,
    runtime: tokio::runtime::Handle,
}

impl RefMountFuse {
    pub fn new(table: Arc<InodeTable>, runtime: tokio::runtime::Handle) -> Self {
        Self { table, runtime }
    }
}

fn errno(e: &FsError) -> i32 {
    match e {
        FsError::EscapesRoot => libc::EACCES,
        FsError::NotFound(_) => libc::ENOENT,
        FsError::NotADirectory(_) => libc::ENOTDIR,
        FsError::NotAFile(_) => libc::EISDIR,
        FsError::NotASymlink(_) => libc::EINVAL,
        FsError::ReadOnly => libc::EROFS,
        FsError::InvalidHandle(_) => libc::EBADF,
        FsError::Ambiguous(_) | FsError::Backend(_) | FsError::Malformed(_) => libc::EIO,
    }
}

fn file_type(kind: FileKind) -> FileType {
    match kind {
        FileKind::File => FileType::RegularFile,
        FileKind::Directory => FileType::Directory,
        FileKind::Symlink => FileType::Symlink,
    }
}

fn fuse_attr(id: InodeId, attr: &FileAttr, uid: u32, gid: u32) -> fuser::FileAttr {
    fuser::FileAttr {
        ino: id,
        size: attr.size,
        blocks: attr.size.div_ceil(512),
        atime: attr.mtime,
        mtime: attr.mtime,
        ctime: attr.mtime,
        crtime: attr.mtime,
        kind: file_type(attr.kind),
        perm: attr.perm as u16,
        nlink: if attr.is_dir() { 2 } else { 1 },
        uid,
        gid,
        rdev: 0,
        blksize: 512,
        flags: 0,
    }
}

impl fuser::Filesystem for RefMountFuse {
    fn lookup(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };
        debug!(parent, name, "lookup");
        match self.table.lookup(parent, name) {
            Ok(record) => reply.entry(
                &TTL,
                &fuse_attr(record.id, &record.attr, req.uid(), req.gid()),
                0,
            ),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn getattr(&mut self, req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        debug!(ino, "getattr");
        match self.table.attributes(ino) {
            Ok(attr) => reply.attr(&TTL, &fuse_attr(ino, attr, req.uid(), req.gid())),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        debug!(ino, "readlink");
        match self.runtime.block_on(self.table.read_link(ino)) {
            Ok(target) => reply.data(target.as_bytes()),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: fuser::ReplyOpen) {
        debug!(ino, flags, "open");
        let attr = match self.table.attributes(ino) {
            Ok(attr) => attr,
            Err(e) => {
                reply.error(errno(&e));
                return;
            }
        };
        if attr.is_dir() {
            reply.error(libc::EISDIR);
            return;
        }
        if (flags & libc::O_ACCMODE) != libc::O_RDONLY || (flags & libc::O_TRUNC) != 0 {
            reply.error(libc::EROFS);
            return;
        }
        // Reads are addressed by inode; no per-handle state to allocate.
        reply.opened(0, 0);
    }

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
        debug!(ino, fh, offset, size, "read");
        let mut buf = vec![0u8; size as usize];
        let offset = offset.max(0) as u64;
        match self
            .runtime
            .block_on(self.table.read_file(ino, &mut buf, offset))
        {
            Ok(n) => reply.data(&buf[..n]),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        debug!(ino, offset, "readdir");
        let record = match self.table.record(ino) {
            Ok(record) => record,
            Err(e) => {
                reply.error(errno(&e));
                return;
            }
        };
        if !record.attr.is_dir() {
            reply.error(libc::ENOTDIR);
            return;
        }

        // Offsets 1 and 2 resume after the synthetic entries; children
        // resume at their table offset plus 2.
        let offset = offset.max(0) as usize;
        let mut full = false;
        if offset < 1 {
            full = reply.add(ino, 1, FileType::Directory, ".");
        }
        if !full && offset < 2 {
            full = reply.add(record.parent, 2, FileType::Directory, "..");
        }
        if !full {
            let listed = self
                .table
                .list_children(ino, offset.saturating_sub(2), |next, child| {
                    reply.add(
                        child.id,
                        (next + 2) as i64,
                        file_type(child.attr.kind),
                        &child.name,
                    )
                });
            if let Err(e) = listed {
                reply.error(errno(&e));
                return;
            }
        }
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: fuser::ReplyStatfs) {
        // No-op success; nothing meaningful to report for a frozen tree.
        reply.statfs(0, 0, 0, self.table.len() as u64, 0, 512, 255, 0);
    }

    // Everything below is a mutation. The view refuses them all, so they
    // are rejected here without reaching the core.

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        reply.error(libc::EROFS);
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn unlink(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: fuser::ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn rmdir(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: fuser::ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _link_name: &OsStr,
        _target: &std::path::Path,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: fuser::ReplyEmpty,
    ) {
        reply.error(libc::EROFS);
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _newparent: u64,
        _newname: &OsStr,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyWrite,
    ) {
        reply.error(libc::EROFS);
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: fuser::ReplyCreate,
    ) {
        reply.error(libc::EROFS);
    }
}
