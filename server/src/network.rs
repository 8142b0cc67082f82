//! Server network layer handling WebSocket connections and the matchmaking loop

use crate::coordinator::MatchCoordinator;
use crate::error::ServerError;
use crate::transport::ChannelTransport;
use crate::words::WordSource;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ConnectionId, ServerEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum NetworkEvent {
    Connected {
        connection: ConnectionId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },
    Inbound {
        connection: ConnectionId,
        event: ClientEvent,
    },
    Disconnected {
        connection: ConnectionId,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, `host:port`
    pub addr: String,
    pub max_clients: usize,
    /// How often finished and abandoned sessions are swept
    pub reap_interval: Duration,
    /// How long a finished session is kept before it may be reaped
    pub finished_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3001".to_string(),
            max_clients: 1024,
            reap_interval: Duration::from_secs(30),
            finished_ttl: Duration::from_secs(300),
        }
    }
}

/// Matchmaking server: accepts WebSocket clients and feeds their events,
/// one at a time, to the coordinator.
pub struct Server {
    listener: Arc<TcpListener>,
    coordinator: MatchCoordinator,
    transport: ChannelTransport,
    reap_interval: Duration,

    event_tx: mpsc::UnboundedSender<NetworkEvent>,
    event_rx: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl Server {
    pub async fn bind(config: ServerConfig, words: Box<dyn WordSource>) -> Result<Self, ServerError> {
        let listener = Arc::new(TcpListener::bind(&config.addr).await?);
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            coordinator: MatchCoordinator::new(words, config.max_clients, config.finished_ttl),
            transport: ChannelTransport::new(),
            reap_interval: config.reap_interval,
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Spawns the task that accepts sockets and assigns connection ids
    fn spawn_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut next_id: ConnectionId = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let connection = next_connection_id(&mut next_id);

                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, connection, event_tx).await {
                                warn!("Connection {} from {} closed with error: {}", connection, addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected {
                connection,
                addr,
                sender,
            } => {
                if self.coordinator.clients().contains(&connection) {
                    warn!("Connection id {} is already registered, refusing {}", connection, addr);
                    return;
                }
                self.transport.attach(connection, sender);
                if !self.coordinator.connect(connection, addr, &mut self.transport) {
                    // Dropping the sender makes the socket task close with 1013.
                    self.transport.detach(connection);
                }
            }
            NetworkEvent::Inbound { connection, event } => {
                self.coordinator
                    .handle_event(connection, event, &mut self.transport);
            }
            NetworkEvent::Disconnected { connection } => {
                self.transport.detach(connection);
                self.coordinator.disconnect(connection, &mut self.transport);
            }
        }
    }

    /// Main server loop: connection events plus the periodic session sweep
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.spawn_acceptor();

        let mut sweep = interval(self.reap_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = sweep.tick() => {
                    let reaped = self.coordinator.reap(Instant::now(), &mut self.transport);
                    debug!(
                        "Sweep: {} reaped, {} sessions, {} queued, {} clients",
                        reaped,
                        self.coordinator.sessions().len(),
                        self.coordinator.queue().len(),
                        self.coordinator.clients().len()
                    );
                },
            }
        }

        Ok(())
    }
}

/// Ids come from a 64-bit counter and are never handed out twice.
fn next_connection_id(next: &mut ConnectionId) -> ConnectionId {
    let id = *next;
    *next += 1;
    id
}

/// Drives one WebSocket: parses inbound frames into events for the loop and
/// writes outbound events as JSON text frames.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection: ConnectionId,
    events: mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), ServerError> {
    let socket = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut frames) = socket.split();

    let (sender, mut outbound) = mpsc::unbounded_channel::<ServerEvent>();
    events
        .send(NetworkEvent::Connected {
            connection,
            addr,
            sender,
        })
        .map_err(|_| ServerError::EventLoopClosed)?;

    let result = loop {
        tokio::select! {
            event = outbound.recv() => {
                match event {
                    Some(event) => {
                        let text = match event.to_json() {
                            Ok(text) => text,
                            Err(e) => {
                                error!("Failed to encode {}: {}", event.name(), e);
                                continue;
                            }
                        };
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            break Err(e.into());
                        }
                    }
                    None => {
                        // The loop dropped our sender: the server refused us.
                        let frame = CloseFrame {
                            code: CloseCode::Again,
                            reason: "Server full".into(),
                        };
                        let _ = sink.send(Message::Close(Some(frame))).await;
                        break Ok(());
                    }
                }
            },

            frame = frames.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match ClientEvent::from_json(text.as_str()) {
                        Ok(event) => {
                            if events.send(NetworkEvent::Inbound { connection, event }).is_err() {
                                break Err(ServerError::EventLoopClosed);
                            }
                        }
                        Err(e) => warn!("Dropping frame from connection {}: {}", connection, e),
                    },
                    Some(Ok(Message::Close(_))) | None => break Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e.into()),
                }
            },
        }
    };

    if events.send(NetworkEvent::Disconnected { connection }).is_err() {
        debug!("Event loop gone before disconnect of {}", connection);
    }
    result
}
