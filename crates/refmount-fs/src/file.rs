//! In-memory read handle over a blob's content.

use std::io::{self, Read, Seek, SeekFrom};

use refmount_types::{FileAttr, FsError, FsResult};

/// A seekable read-only handle over fully buffered blob content.
///
/// The whole blob is fetched at open time; reads and seeks never touch the
/// backend again. Positioned reads via [`read_at`](Self::read_at) ignore
/// the seek cursor, so one handle can serve concurrent offset-based
/// readers.
#[derive(Debug, Clone)]
pub struct BlobFile {
    name: String,
    attr: FileAttr,
    contents: Vec<u8>,
    pos: u64,
}

impl BlobFile {
    pub(crate) fn new(name: impl Into<String>, attr: FileAttr, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            attr,
            contents,
            pos: 0,
        }
    }

    /// Base name of the opened entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes captured at open time.
    pub fn attr(&self) -> &FileAttr {
        &self.attr
    }

    /// Content length in bytes.
    pub fn len(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// The buffered content.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Copy bytes at `offset` into `buf` without moving the seek cursor.
    ///
    /// Returns the number of bytes copied; reading at or past the end
    /// copies nothing.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> usize {
        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        if start >= self.contents.len() {
            return 0;
        }
        let end = (start + buf.len()).min(self.contents.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.contents[start..end]);
        n
    }

    /// Writing through a read handle. Always [`FsError::ReadOnly`].
    pub fn write(&mut self, _buf: &[u8]) -> FsResult<usize> {
        Err(FsError::ReadOnly)
    }

    /// Truncation. Always [`FsError::ReadOnly`].
    pub fn truncate(&mut self, _size: u64) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Advisory locking is not supported on this filesystem.
    pub fn lock(&self) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    pub fn unlock(&self) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }
}

impl Read for BlobFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.read_at(buf, self.pos);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for BlobFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(offset) => {
                self.pos = offset;
                Ok(offset)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content: &[u8]) -> BlobFile {
        BlobFile::new(
            "f.txt",
            FileAttr::file(content.len() as u64, 0o644),
            content.to_vec(),
        )
    }

    #[test]
    fn sequential_read() {
        let mut f = file(b"Hello World\n");
        let mut out = Vec::new();
        f.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"Hello World\n");
    }

    #[test]
    fn positioned_read_ignores_cursor() {
        let mut f = file(b"Hello World\n");
        let mut buf = [0u8; 5];
        f.seek(SeekFrom::Start(3)).unwrap();
        assert_eq!(f.read_at(&mut buf, 6), 5);
        assert_eq!(&buf, b"World");
        // Cursor still at 3.
        let mut rest = Vec::new();
        f.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"lo World\n");
    }

    #[test]
    fn read_past_end_is_empty_not_error() {
        let f = file(b"abc");
        let mut buf = [0u8; 8];
        assert_eq!(f.read_at(&mut buf, 3), 0);
        assert_eq!(f.read_at(&mut buf, 100), 0);
        assert_eq!(f.read_at(&mut buf, 1), 2);
        assert_eq!(&buf[..2], b"bc");
    }

    #[test]
    fn seek_variants() {
        let mut f = file(b"0123456789");
        assert_eq!(f.seek(SeekFrom::End(-4)).unwrap(), 6);
        let mut buf = [0u8; 4];
        assert_eq!(f.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"6789");
        assert_eq!(f.seek(SeekFrom::Current(-2)).unwrap(), 8);
        assert!(f.seek(SeekFrom::End(-11)).is_err());
    }

    #[test]
    fn writes_are_refused() {
        let mut f = file(b"abc");
        assert!(matches!(f.write(b"x"), Err(FsError::ReadOnly)));
        assert!(matches!(f.truncate(0), Err(FsError::ReadOnly)));
        assert!(matches!(f.lock(), Err(FsError::ReadOnly)));
        assert_eq!(f.contents(), b"abc");
    }
}
