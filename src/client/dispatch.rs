//! Inbound message dispatch.
//!
//! The dispatcher is the session's reader task: it drains the framed
//! stream, classifies each raw message, and routes it through the
//! correlation table. Correlation callbacks are invoked only after the
//! table's lock is released. The task exits on shutdown, end of stream, or
//! a transport fault; in the latter two cases it fails every pending
//! correlation explicitly before signalling.

use std::{io, sync::Arc};

use futures::StreamExt;
use log::{debug, trace, warn};
use tokio::{io::AsyncWriteExt, net::tcp::OwnedWriteHalf, sync::broadcast};
use tokio_util::{
    codec::{FramedRead, FramedWrite},
    sync::CancellationToken,
};

use super::{runtime::Shared, signal::SessionSignal};
use crate::{
    classify::ServerMessage,
    codec::{AmiCodec, FramingError},
    correlation::EventDisposition,
    error::AmiError,
    event::Event,
    response::Response,
};

pub(crate) type SharedWriter = Arc<tokio::sync::Mutex<FramedWrite<OwnedWriteHalf, AmiCodec>>>;

pub(crate) struct Dispatcher {
    pub(crate) shared: Arc<Shared>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) signal_tx: broadcast::Sender<SessionSignal>,
    pub(crate) writer: SharedWriter,
}

impl Dispatcher {
    /// Drive the inbound pipeline until shutdown, EOF, or a fault.
    pub(crate) async fn run<R>(
        self,
        mut reader: FramedRead<R, AmiCodec>,
        shutdown: CancellationToken,
    ) where
        R: tokio::io::AsyncRead + Unpin,
    {
        loop {
            let item = tokio::select! {
                biased;

                () = shutdown.cancelled() => return,
                item = reader.next() => item,
            };

            match item {
                Some(Ok(raw)) => self.on_raw_message(&raw),
                Some(Err(error)) => {
                    self.on_transport_error(&error).await;
                    return;
                }
                None => {
                    self.on_end_of_stream();
                    return;
                }
            }
        }
    }

    fn on_raw_message(&self, raw: &str) {
        trace!("raw message: {raw:?}");
        #[cfg(feature = "metrics")]
        crate::metrics::inc_messages(crate::metrics::Direction::Inbound);

        match ServerMessage::classify(raw) {
            Some(ServerMessage::Response(response)) => self.on_response(response),
            Some(ServerMessage::Event(event)) => self.on_event(event),
            None => warn!("discarded: |{raw}|"),
        }
    }

    fn on_response(&self, response: Response) {
        debug!("got response: {response:?}");

        let resolved = self.shared.correlations_mut().on_response(response);
        if let Some((callback, response)) = resolved {
            callback(Ok(response));
        }
    }

    fn on_event(&self, event: Event) {
        debug!("got event: {event:?}");

        let disposition = self.shared.correlations_mut().on_event(event);
        match disposition {
            EventDisposition::Consumed => {}
            EventDisposition::Completed(callback, response) => callback(Ok(response)),
            EventDisposition::Standalone(event) => {
                let _ = self.event_tx.send(event);
            }
        }
    }

    async fn on_transport_error(&self, error: &io::Error) {
        #[cfg(feature = "metrics")]
        crate::metrics::inc_errors();

        if is_desynchronization(error) {
            let _ = self.signal_tx.send(SessionSignal::Desynchronized);
        } else {
            let _ = self.signal_tx.send(SessionSignal::TransportError {
                message: error.to_string(),
            });
        }

        self.shared.set_connected(false);
        self.fail_pending();

        // The stream cannot be resynchronized; force the transport closed.
        let mut writer = self.writer.lock().await;
        let _ = writer.get_mut().shutdown().await;
        drop(writer);

        let _ = self.signal_tx.send(SessionSignal::Closed { had_error: true });
        #[cfg(feature = "metrics")]
        crate::metrics::dec_sessions();
    }

    fn on_end_of_stream(&self) {
        debug!("peer ended the stream");

        self.shared.set_connected(false);
        let _ = self.signal_tx.send(SessionSignal::Ended);
        self.fail_pending();
        let _ = self.signal_tx.send(SessionSignal::Closed { had_error: false });
        #[cfg(feature = "metrics")]
        crate::metrics::dec_sessions();
    }

    fn fail_pending(&self) {
        let callbacks = self.shared.correlations_mut().drain();
        if !callbacks.is_empty() {
            debug!("failing {} pending correlation(s)", callbacks.len());
        }
        for callback in callbacks {
            callback(Err(AmiError::SessionClosed));
        }
    }
}

fn is_desynchronization(error: &io::Error) -> bool {
    error
        .get_ref()
        .is_some_and(|inner| inner.is::<FramingError>())
}
