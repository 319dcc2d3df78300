#![cfg(feature = "std")]

//! TCP front end: accepts connections, gives each a session id, and shuttles
//! frames between the socket and the arbiter.

use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::arbiter::{Arbiter, ArbiterHandle};
use crate::common::PlayerId;
use crate::config::ServerConfig;
use crate::protocol::Notification;
use crate::transport::{self, FrameReader};
use crate::wire::{decode_command, encode_notification};

pub struct Server {
    listener: TcpListener,
    arbiter: ArbiterHandle,
    arbiter_task: JoinHandle<()>,
    next_session: PlayerId,
}

impl Server {
    /// Validate `config`, bind the listener and start the arbiter.
    pub async fn bind(config: &ServerConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.bind).await?;
        let (arbiter, arbiter_task) = Arbiter::spawn(config);
        info!("listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            arbiter,
            arbiter_task,
            next_session: 1,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the arbiter stops.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            if self.arbiter_task.is_finished() {
                return Err(anyhow::anyhow!("Arbiter has stopped"));
            }
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            };
            let session = self.next_session;
            self.next_session += 1;
            info!("connection from {} is session {}", peer, session);

            let arbiter = self.arbiter.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, session, arbiter).await {
                    warn!("session {} ended with error: {}", session, e);
                }
                info!("session {} closed", session);
            });
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    session: PlayerId,
    arbiter: ArbiterHandle,
) -> anyhow::Result<()> {
    stream.set_nodelay(true)?;
    let (mut reader, mut writer) = transport::split(stream);
    let (outbox, mut inbox) = mpsc::unbounded_channel::<Notification>();
    arbiter.connect(session, outbox)?;

    let writer_task = tokio::spawn(async move {
        while let Some(notification) = inbox.recv().await {
            if let Err(e) = writer.write_text(&encode_notification(&notification)).await {
                debug!("session {} writer stopped: {}", session, e);
                return;
            }
        }
        let _ = writer.shutdown().await;
    });

    let result = read_commands(&mut reader, session, &arbiter).await;
    // The arbiter drops the outbox on disconnect, which lets the writer drain
    // and finish.
    if let Err(e) = arbiter.disconnect(session) {
        warn!("session {} disconnect not delivered: {}", session, e);
    }
    let _ = writer_task.await;
    result
}

async fn read_commands<R>(
    reader: &mut FrameReader<R>,
    session: PlayerId,
    arbiter: &ArbiterHandle,
) -> anyhow::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    while let Some(frame) = reader.read_text().await? {
        match decode_command(&frame) {
            Ok(command) => arbiter.command(session, command)?,
            Err(error) => arbiter.malformed(session, error)?,
        }
    }
    Ok(())
}
