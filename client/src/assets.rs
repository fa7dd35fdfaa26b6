//! Background image loading off the frame thread
//!
//! Reads happen on the tokio runtime. Each request is tagged with the world
//! epoch it was made in, and results from an older epoch are discarded so a
//! load that finishes after a disconnect never touches the next session.

use log::{error, info};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

type LoadResult = (u64, PathBuf, std::io::Result<Vec<u8>>);

pub struct AssetLoader {
    runtime: Handle,
    tx: UnboundedSender<LoadResult>,
    rx: UnboundedReceiver<LoadResult>,
}

impl AssetLoader {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self { runtime, tx, rx }
    }

    pub fn request(&self, path: impl Into<PathBuf>, epoch: u64) {
        let path = path.into();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = tokio::fs::read(&path).await;
            let _ = tx.send((epoch, path, result));
        });
    }

    /// Returns the bytes of the newest finished load for `epoch`, if any.
    /// Failures are logged; the renderer keeps its flat fill.
    pub fn poll(&mut self, epoch: u64) -> Option<Vec<u8>> {
        let mut latest = None;

        while let Ok((loaded_epoch, path, result)) = self.rx.try_recv() {
            if loaded_epoch != epoch {
                info!("Discarding stale load of {}", path.display());
                continue;
            }
            match result {
                Ok(bytes) => {
                    info!("Background image loaded: {}", path.display());
                    latest = Some(bytes);
                }
                Err(e) => error!("Failed to load background image {}: {}", path.display(), e),
            }
        }

        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn poll_until(loader: &mut AssetLoader, epoch: u64) -> Option<Vec<u8>> {
        for _ in 0..100 {
            if let Some(bytes) = loader.poll(epoch) {
                return Some(bytes);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_for_current_epoch() {
        let path = temp_file("bg-current.bin", b"pixels");
        let mut loader = AssetLoader::new(Handle::current());

        loader.request(&path, 3);
        assert_eq!(poll_until(&mut loader, 3).await, Some(b"pixels".to_vec()));
    }

    #[tokio::test]
    async fn test_stale_epoch_is_dropped() {
        let path = temp_file("bg-stale.bin", b"old");
        let mut loader = AssetLoader::new(Handle::current());

        loader.request(&path, 1);
        assert_eq!(poll_until(&mut loader, 2).await, None);
    }

    #[tokio::test]
    async fn test_missing_file_yields_nothing() {
        let mut loader = AssetLoader::new(Handle::current());
        loader.request("/definitely/not/here.jpg", 0);
        assert_eq!(poll_until(&mut loader, 0).await, None);
    }
}
