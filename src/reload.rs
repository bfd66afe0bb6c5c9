//! Live reload is a two-part system:
//!
//! 1. **Signal channel**: pipelines and the watcher hold a [`Reloader`] and
//!    call [`Reloader::reload`] whenever the output directory changed.
//! 2. **WebSocket server** (feature `live`): one thread accepts browser
//!    connections, another waits on the channel and broadcasts `"reload"`
//!    to every connected tab. The dev server injects [`client_script`] into
//!    HTML responses so that pages connect on load.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

/// Preferred port of the WebSocket server.
pub const RELOAD_PORT: u16 = 35729;

/// Sending half of the reload signal channel.
///
/// At most one signal is pending at a time: reloads requested while one is
/// still queued collapse into it.
#[derive(Debug, Clone)]
pub struct Reloader {
    tx: SyncSender<()>,
}

impl Reloader {
    /// Creates a reloader together with the receiver of its signals.
    pub fn channel() -> (Reloader, Receiver<()>) {
        let (tx, rx) = sync_channel(1);
        (Reloader { tx }, rx)
    }

    /// Asks every connected client to refresh.
    pub fn reload(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                tracing::debug!("no live reload listener");
            }
        }
    }
}

/// JavaScript snippet that reloads the page on any message from the
/// WebSocket server.
pub fn client_script(port: u16) -> String {
    format!(
        r#"
const socket = new WebSocket("ws://" + location.hostname + ":{port}");
socket.addEventListener("message", event => {{
    window.location.reload();
}});
"#
    )
}

#[cfg(feature = "live")]
pub use self::ws::start;

#[cfg(feature = "live")]
mod ws {
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc::Receiver;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::thread;

    use tungstenite::WebSocket;

    use super::RELOAD_PORT;

    /// Most recent connections kept open; older tabs get closed.
    const MAX_CLIENTS: usize = 10;

    type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

    /// Starts the WebSocket server and returns the port it listens on.
    pub fn start(events: Receiver<()>) -> std::io::Result<u16> {
        let listener = match TcpListener::bind(("127.0.0.1", RELOAD_PORT)) {
            Ok(sock) => sock,
            Err(_) => TcpListener::bind("127.0.0.1:0")?,
        };

        let port = listener.local_addr()?.port();
        let clients = Clients::default();

        thread::Builder::new()
            .name("reload-accept".into())
            .spawn({
                let clients = clients.clone();
                move || accept(listener, clients)
            })?;

        thread::Builder::new()
            .name("reload-broadcast".into())
            .spawn(move || broadcast(events, clients))?;

        tracing::info!(port, "live reload listening");
        Ok(port)
    }

    fn accept(server: TcpListener, clients: Clients) {
        for stream in server.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("live reload connection failed: {e}");
                    continue;
                }
            };

            match tungstenite::accept(stream) {
                Ok(socket) => clients
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(socket),
                Err(e) => tracing::warn!("live reload handshake failed: {e}"),
            }
        }
    }

    fn broadcast(events: Receiver<()>, clients: Clients) {
        while events.recv().is_ok() {
            let mut clients = clients.lock().unwrap_or_else(PoisonError::into_inner);
            let mut broken = vec![];

            for (i, socket) in clients.iter_mut().enumerate() {
                match socket.send("reload".into()) {
                    Ok(_) => {}
                    Err(tungstenite::Error::Io(e))
                        if e.kind() == std::io::ErrorKind::BrokenPipe =>
                    {
                        broken.push(i);
                    }
                    Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                        broken.push(i);
                    }
                    Err(e) => tracing::error!("live reload: {e}"),
                }
            }

            for i in broken.into_iter().rev() {
                clients.remove(i);
            }

            let len = clients.len();
            if len > MAX_CLIENTS {
                for mut socket in clients.drain(0..len - MAX_CLIENTS) {
                    socket.close(None).ok();
                }
            }

            tracing::debug!(clients = clients.len(), "reload sent");
        }
    }
}
