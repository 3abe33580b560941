use super::ChromedriverSpec;
use anyhow::{bail, Context, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const STARTUP_POLL: Duration = Duration::from_millis(100);

/// A chromedriver child owned by one session.
///
/// The child is spawned with `kill_on_drop`, so it dies with its owner even
/// when [`ChromedriverProcess::shutdown`] is never reached.
pub struct ChromedriverProcess {
    child: Child,
    port: u16,
}

/// Check that `requested` is free on loopback and return the port to use.
/// `0` lets the OS pick one.
pub async fn reserve_port(requested: u16) -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", requested))
        .await
        .with_context(|| format!("chromedriver port {requested} is already in use"))?;
    Ok(listener.local_addr()?.port())
}

impl ChromedriverProcess {
    /// Spawn chromedriver on its own port and wait until it accepts connections.
    pub async fn spawn(spec: &ChromedriverSpec) -> Result<Self> {
        let port = reserve_port(spec.port).await?;
        let child = Command::new(&spec.path)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", spec.path.display()))?;

        let mut process = Self { child, port };
        process.wait_until_listening().await?;
        debug!(target: "browser.session", port, "chromedriver ready");
        Ok(process)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    async fn wait_until_listening(&mut self) -> Result<()> {
        let deadline = Instant::now() + STARTUP_TIMEOUT;
        loop {
            self.ensure_alive()?;
            if TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                // the listener must be our child, not a process that grabbed the port
                return self.ensure_alive();
            }
            if Instant::now() >= deadline {
                bail!(
                    "chromedriver did not listen on port {} within {:?}",
                    self.port,
                    STARTUP_TIMEOUT
                );
            }
            sleep(STARTUP_POLL).await;
        }
    }

    fn ensure_alive(&mut self) -> Result<()> {
        if let Some(status) = self.child.try_wait()? {
            bail!("chromedriver exited during startup: {status}");
        }
        Ok(())
    }

    /// Kill the child and reap it.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Err(e) = self.child.kill().await {
            warn!(target: "browser.session", error = %e, "failed to kill chromedriver");
            return Err(e.into());
        }
        Ok(())
    }
}
