use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsFd, BorrowedFd};
use std::path::Path;

/// An open DRM device node.
#[derive(Debug)]
pub struct Card(File);

impl Card {
    /// Open `path` read/write. Rust opens files close-on-exec.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map(Self)
    }
}

impl AsFd for Card {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl drm::Device for Card {}
impl drm::control::Device for Card {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_node_fails() {
        let err = Card::open("/dev/dri/does-not-exist").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
