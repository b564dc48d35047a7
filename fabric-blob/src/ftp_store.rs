use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fabric_core::AssetKey;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use tracing::{debug, warn};

use crate::store::{join_url, object_file_name};
use crate::{BackendKind, FileTransferConfig, MediaError, MediaResult, ReplicaStore};

/// Legacy file host reached over FTP.
///
/// Every operation opens its own session (connect, login, transfer,
/// disconnect); nothing is pooled. Sessions run on the blocking pool, so a
/// caller that stops waiting does not interrupt the transfer: the session
/// still finishes and disconnects before its task ends.
#[derive(Debug, Clone)]
pub struct FtpFileStore {
    config: Arc<FileTransferConfig>,
}

impl FtpFileStore {
    pub fn new(config: FileTransferConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Build a store from `FABRIC_FTP_*` environment variables
    pub fn from_env() -> MediaResult<Self> {
        Ok(Self::new(FileTransferConfig::from_env()?))
    }

    /// Run `op` inside one authenticated session and always disconnect.
    fn with_session<T, F>(config: &FileTransferConfig, op: F) -> Result<T, FtpError>
    where
        F: FnOnce(&mut FtpStream) -> Result<T, FtpError>,
    {
        let mut ftp = FtpStream::connect(config.address())?;

        let result = Self::login(&mut ftp, config).and_then(|_| op(&mut ftp));

        if let Err(e) = ftp.quit() {
            warn!(host = %config.host, error = %e, "error disconnecting from file host");
        }
        result
    }

    fn login(ftp: &mut FtpStream, config: &FileTransferConfig) -> Result<(), FtpError> {
        ftp.login(config.user.as_str(), config.password.as_str())?;
        ftp.transfer_type(FileType::Binary)?;
        if let Some(dir) = &config.remote_dir {
            ftp.cwd(dir.as_str())?;
        }
        Ok(())
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, Box<dyn std::error::Error + Send + Sync>>
    where
        T: Send + 'static,
        F: FnOnce(&FileTransferConfig) -> Result<T, FtpError> + Send + 'static,
    {
        let config = self.config.clone();
        let joined = tokio::task::spawn_blocking(move || op(&config)).await?;
        Ok(joined?)
    }
}

#[async_trait]
impl ReplicaStore for FtpFileStore {
    fn kind(&self) -> BackendKind {
        BackendKind::FileTransfer
    }

    async fn upload(&self, bytes: Bytes, key: &AssetKey) -> MediaResult<String> {
        let file_name = object_file_name(key);
        let remote = file_name.clone();

        let written = self
            .run_blocking(move |config| {
                Self::with_session(config, |ftp| ftp.put_file(remote.as_str(), &mut Cursor::new(bytes)))
            })
            .await
            .map_err(|e| MediaError::upload(self.kind(), key, e))?;

        debug!(host = %self.config.host, file = %file_name, written, "file uploaded");
        Ok(join_url(&self.config.public_url, &file_name))
    }

    async fn delete(&self, key: &AssetKey) -> MediaResult<()> {
        let file_name = object_file_name(key);
        let remote = file_name.clone();

        self.run_blocking(move |config| Self::with_session(config, |ftp| ftp.rm(remote.as_str())))
            .await
            .map_err(|e| MediaError::delete(self.kind(), key, e))?;

        debug!(host = %self.config.host, file = %file_name, "file deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MediaConfig, MemoryStore, Replicator};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    fn png() -> Bytes {
        let img = ImageBuffer::from_fn(8, 8, |x, y| Rgb([x as u8 * 30, y as u8 * 30, 0u8]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    /// Single-session FTP host that logs in, then answers the data channel
    /// request only after `stall`. Returns every command it received.
    async fn stalling_host(stall: Duration) -> (u16, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut received = Vec::new();

            write.write_all(b"220 ready\r\n").await.unwrap();
            while let Ok(Some(line)) = lines.next_line().await {
                let command = line.split_whitespace().next().unwrap_or_default().to_ascii_uppercase();
                received.push(command.clone());

                let reply: &[u8] = match command.as_str() {
                    "USER" => b"331 password required\r\n",
                    "PASS" => b"230 logged in\r\n",
                    "TYPE" => b"200 type set\r\n",
                    "PASV" | "EPSV" | "PORT" | "EPRT" | "STOR" => {
                        tokio::time::sleep(stall).await;
                        b"425 no data connection\r\n"
                    }
                    "QUIT" => {
                        let _ = write.write_all(b"221 bye\r\n").await;
                        break;
                    }
                    _ => b"502 not implemented\r\n",
                };
                if write.write_all(reply).await.is_err() {
                    break;
                }
            }
            received
        });

        (port, handle)
    }

    fn config() -> FileTransferConfig {
        FileTransferConfig {
            // nothing listens on port 1 locally
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "fabric".to_string(),
            password: "secret".to_string(),
            remote_dir: None,
            public_url: "https://files.fabric.bg/images/".to_string(),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_leg_error() {
        let store = FtpFileStore::new(config());
        let key = AssetKey::from_string("123MEN__F");

        let err = store.upload(Bytes::from_static(b"webp"), &key).await.unwrap_err();
        assert_eq!(err.backend(), Some(BackendKind::FileTransfer));
        assert!(matches!(err, MediaError::Upload { .. }));

        let err = store.delete(&key).await.unwrap_err();
        assert!(matches!(err, MediaError::Delete { .. }));
    }

    #[tokio::test]
    async fn timed_out_leg_still_disconnects() {
        let (port, host) = stalling_host(Duration::from_millis(600)).await;
        let store = FtpFileStore::new(FileTransferConfig { port, ..config() });
        let replicator = Replicator::new(
            MemoryStore::object_store(),
            store,
            MediaConfig::new()
                .with_target_size(8, 8)
                .with_leg_timeout(Duration::from_millis(150)),
        );

        let err = replicator
            .upload_key(png(), AssetKey::from_string("123MEN__F"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.leg_failures(),
            [MediaError::LegTimeout {
                backend: BackendKind::FileTransfer,
                ..
            }]
        ));
        assert!(!host.is_finished());

        let received = tokio::time::timeout(Duration::from_secs(5), host)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.first().map(String::as_str), Some("USER"));
        assert_eq!(received.last().map(String::as_str), Some("QUIT"));
    }
}
