//! AMI client runtime implementation.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use futures::SinkExt;
use log::{debug, info};
use tokio::{
    io::AsyncWriteExt,
    net::TcpStream,
    sync::{broadcast, oneshot},
    task::JoinHandle,
    time,
};
use tokio_util::{
    codec::{FramedRead, FramedWrite},
    sync::CancellationToken,
};

use super::{
    config::AmiConfig,
    dispatch::{Dispatcher, SharedWriter},
    greeting::{GreetingError, is_ami_greeting, read_greeting},
    signal::SessionSignal,
};
use crate::{
    action::{Action, AmiAction},
    actions::{Login, Logoff},
    codec::AmiCodec,
    correlation::CorrelationTable,
    error::AmiError,
    event::Event,
    response::Response,
    rewind_stream::RewindStream,
};

/// State shared between the client handle and its reader task.
pub(crate) struct Shared {
    connected: AtomicBool,
    correlations: Mutex<CorrelationTable>,
    next_action_id: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            correlations: Mutex::new(CorrelationTable::new()),
            next_action_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_connected(&self) -> bool { self.connected.load(Ordering::Acquire) }

    pub(crate) fn set_connected(&self, value: bool) {
        self.connected.store(value, Ordering::Release);
    }

    /// Lock the correlation table. Never held across an await; callbacks
    /// are invoked after the guard is released.
    pub(crate) fn correlations_mut(&self) -> MutexGuard<'_, CorrelationTable> {
        self.correlations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn next_action_id(&self) -> u64 { self.next_action_id.fetch_add(1, Ordering::Relaxed) }
}

/// Client for the Asterisk Manager Interface.
///
/// One client drives one TCP session: [`open`](Self::open) connects,
/// validates the greeting, and authenticates; [`send`](Self::send) and
/// [`send_await`](Self::send_await) issue actions;
/// [`close`](Self::close) logs off and tears down. Standalone events and
/// lifecycle signals are broadcast to whoever subscribed via
/// [`events`](Self::events) and [`signals`](Self::signals).
///
/// # Examples
///
/// ```no_run
/// use amiwire::{AmiClient, AmiConfig, actions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), amiwire::AmiError> {
/// let config = AmiConfig::new("127.0.0.1", 5038, "admin", "secret");
/// let mut client = AmiClient::new(config);
/// let mut events = client.events();
///
/// client.open().await?;
/// let response = client.send_await(&actions::Ping).await?;
/// assert!(response.is_success());
///
/// while let Ok(event) = events.recv().await {
///     println!("event: {:?}", event.event_type());
/// }
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct AmiClient {
    config: AmiConfig,
    shared: Arc<Shared>,
    writer: Option<SharedWriter>,
    reader: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    signal_tx: broadcast::Sender<SessionSignal>,
    event_tx: broadcast::Sender<Event>,
}

impl AmiClient {
    /// Create a client for `config`. No I/O happens until
    /// [`open`](Self::open).
    #[must_use]
    pub fn new(config: AmiConfig) -> Self {
        let (signal_tx, _) = broadcast::channel(config.channel_capacity);
        let (event_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            config,
            shared: Arc::new(Shared::new()),
            writer: None,
            reader: None,
            shutdown: CancellationToken::new(),
            signal_tx,
            event_tx,
        }
    }

    /// Subscribe to session lifecycle signals.
    #[must_use]
    pub fn signals(&self) -> broadcast::Receiver<SessionSignal> { self.signal_tx.subscribe() }

    /// Subscribe to standalone events.
    ///
    /// Events correlated with an in-flight action are delivered on that
    /// action's response instead and never appear here.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<Event> { self.event_tx.subscribe() }

    /// Whether the transport is currently connected.
    ///
    /// True from TCP establishment onward, including an unauthenticated
    /// session after a rejected login.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.shared.is_connected() }

    /// Connect, validate the greeting, and authenticate.
    ///
    /// On success the session is ready for actions. On a rejected login or
    /// an unrecognized greeting the transport is deliberately left open
    /// (closing is the caller's decision) and the matching signal is
    /// emitted alongside the returned error.
    ///
    /// # Errors
    ///
    /// Returns [`AmiError::ConnectTimeout`] when the attempt exceeds the
    /// configured limit, [`AmiError::UnrecognizedPeer`] for a non-AMI
    /// greeting, [`AmiError::LoginRejected`] for bad credentials, and
    /// [`AmiError::Io`] / [`AmiError::Disconnected`] for transport
    /// failures during the handshake.
    pub async fn open(&mut self) -> Result<(), AmiError> {
        if self.writer.is_some() || self.reader.is_some() {
            self.teardown(false).await;
        }

        debug!(
            "opening connection to {}:{}",
            self.config.host, self.config.port
        );
        let mut stream = self.connect_socket().await?;
        self.shared.set_connected(true);
        let _ = self.signal_tx.send(SessionSignal::Connected);
        #[cfg(feature = "metrics")]
        crate::metrics::inc_sessions();

        let (greeting, leftover, oversized) = match read_greeting(&mut stream).await {
            Ok((line, leftover)) => (line, leftover, false),
            Err(GreetingError::TooLong { received }) => (received, Vec::new(), true),
            Err(GreetingError::Io(source)) => {
                self.shared.set_connected(false);
                let _ = self.signal_tx.send(SessionSignal::Closed { had_error: true });
                #[cfg(feature = "metrics")]
                crate::metrics::dec_sessions();
                if source.kind() == std::io::ErrorKind::UnexpectedEof {
                    return Err(AmiError::Disconnected);
                }
                return Err(AmiError::Io(source));
            }
        };
        debug!("got initial message: {greeting}");

        let (read_half, write_half) = stream.into_split();
        let writer: SharedWriter = Arc::new(tokio::sync::Mutex::new(FramedWrite::new(
            write_half,
            AmiCodec::new(),
        )));
        self.writer = Some(Arc::clone(&writer));

        if oversized || !is_ami_greeting(&greeting) {
            let _ = self.signal_tx.send(SessionSignal::InvalidPeer {
                greeting: greeting.clone(),
            });
            return Err(AmiError::UnrecognizedPeer { greeting });
        }

        // Fresh receive state for this connection.
        let reader = FramedRead::new(RewindStream::new(leftover, read_half), AmiCodec::new());
        self.shutdown = CancellationToken::new();
        let dispatcher = Dispatcher {
            shared: Arc::clone(&self.shared),
            event_tx: self.event_tx.clone(),
            signal_tx: self.signal_tx.clone(),
            writer,
        };
        self.reader = Some(tokio::spawn(dispatcher.run(reader, self.shutdown.clone())));

        // Authentication is an ordinary action/response exchange.
        let login = Login::new(self.config.username.clone(), self.config.secret.clone());
        let response = self.send_await(&login).await?;
        if response.is_success() {
            info!("session ready");
            let _ = self.signal_tx.send(SessionSignal::Ready);
            Ok(())
        } else {
            let _ = self.signal_tx.send(SessionSignal::LoginRejected);
            Err(AmiError::LoginRejected)
        }
    }

    /// Send an action and have `callback` invoked with its outcome.
    ///
    /// The callback fires exactly once: with the correlated response (plus
    /// any aggregated events), or with [`AmiError::SessionClosed`] if the
    /// session is torn down first. Returns the assigned correlation id.
    ///
    /// # Errors
    ///
    /// Fails fast with [`AmiError::NotConnected`] when the session is not
    /// connected; nothing is queued. A write failure unregisters the
    /// correlation and returns the transport error (the callback is
    /// dropped without being invoked).
    pub async fn send<A, F>(&self, action: &A, callback: F) -> Result<u64, AmiError>
    where
        A: AmiAction + ?Sized,
        F: FnOnce(Result<Response, AmiError>) + Send + 'static,
    {
        if !self.is_connected() {
            return Err(AmiError::NotConnected);
        }
        let writer = self.writer.as_ref().ok_or(AmiError::NotConnected)?;

        let id = self.shared.next_action_id();
        let action = Action::build(id, action);
        debug!("sending action: {action:?}");

        self.shared
            .correlations_mut()
            .register(id.to_string(), Box::new(callback));

        let written = writer.lock().await.send(&action).await;
        if let Err(error) = written {
            let _ = self.shared.correlations_mut().unregister(&id.to_string());
            return Err(error.into());
        }
        #[cfg(feature = "metrics")]
        crate::metrics::inc_messages(crate::metrics::Direction::Outbound);

        Ok(id)
    }

    /// Send an action and await its correlated response.
    ///
    /// Resolves exactly when the correlation table resolves the action's
    /// id: immediately for plain responses, or after the terminal event of
    /// a deferred response's event list.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus
    /// [`AmiError::SessionClosed`] when the session is torn down while the
    /// action is still pending.
    pub async fn send_await<A>(&self, action: &A) -> Result<Response, AmiError>
    where
        A: AmiAction + ?Sized,
    {
        let (tx, rx) = oneshot::channel();
        self.send(action, move |outcome| {
            let _ = tx.send(outcome);
        })
        .await?;

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AmiError::SessionClosed),
        }
    }

    /// Log off and tear the session down.
    ///
    /// When connected, a graceful `Logoff` exchange runs first; its failure
    /// is ignored since the peer may already be gone. Teardown then cancels
    /// the reader, closes the transport, and fails every pending
    /// correlation with [`AmiError::SessionClosed`].
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for teardown
    /// reporting.
    pub async fn close(&mut self) -> Result<(), AmiError> {
        // Without a running reader (invalid peer) the logoff response could
        // never resolve, so skip the exchange and close directly.
        if self.is_connected()
            && self.reader.is_some()
            && self.send_await(&Logoff).await.is_ok()
        {
            info!("logged off");
        }

        info!("closing connection");
        self.teardown(false).await;
        Ok(())
    }

    async fn connect_socket(&self) -> Result<TcpStream, AmiError> {
        let addr = (self.config.host.as_str(), self.config.port);
        let stream = match self.config.connect_timeout {
            Some(limit) => time::timeout(limit, TcpStream::connect(addr))
                .await
                .map_err(|_| AmiError::ConnectTimeout)??,
            None => TcpStream::connect(addr).await?,
        };
        Ok(stream)
    }

    async fn teardown(&mut self, had_error: bool) {
        self.shutdown.cancel();
        if let Some(handle) = self.reader.take() {
            let _ = handle.await;
        }

        let was_connected = self.shared.connected.swap(false, Ordering::AcqRel);

        if let Some(writer) = self.writer.take() {
            let mut framed = writer.lock().await;
            let _ = framed.get_mut().shutdown().await;
        }

        let callbacks = self.shared.correlations_mut().drain();
        for callback in callbacks {
            callback(Err(AmiError::SessionClosed));
        }

        if was_connected {
            let _ = self.signal_tx.send(SessionSignal::Closed { had_error });
            #[cfg(feature = "metrics")]
            crate::metrics::dec_sessions();
        }
    }
}

impl Drop for AmiClient {
    fn drop(&mut self) {
        // Stop the reader task; pending correlations are failed by it or
        // were already drained by close().
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for AmiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmiClient")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
