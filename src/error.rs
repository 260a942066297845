use std::io;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("bind TCP listener: {0}")]
    BindTCPListener(io::Error),
    #[error("get TCP listener socket address: {0}")]
    GetTCPListenerAddress(io::Error),
    #[error("build server runtime: {0}")]
    BuildRuntime(io::Error),
    #[error("spawn server thread: {0}")]
    SpawnServerThread(io::Error),
    #[error("server is already running")]
    AlreadyRunning,
    #[error("server is not running")]
    NotRunning,
    #[error("server thread exited before it started listening")]
    ServerThreadExited,
    #[error("server thread panicked")]
    ServerThreadPanicked,
}
