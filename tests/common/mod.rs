//! Shared utilities for integration tests.
//!
//! Provides a scripted AMI server speaking just enough of the protocol to
//! exercise the client: greeting, login, per-action responses, and raw
//! writes. These helpers reduce duplication across test modules.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use amiwire::{AmiConfig, Message};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// Banner a real Asterisk server opens the connection with.
pub const GREETING: &str = "Asterisk Call Manager/5.0.2\r\n";

pub const USERNAME: &str = "admin";
pub const SECRET: &str = "hunter2";

/// Bind a listener on an ephemeral localhost port and build the matching
/// client configuration.
pub async fn listener_and_config() -> (TcpListener, AmiConfig) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let port = listener
        .local_addr()
        .expect("read local address for test listener")
        .port();
    (listener, AmiConfig::new("127.0.0.1", port, USERNAME, SECRET))
}

/// One accepted server-side connection with message-level helpers.
pub struct ServerConn {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl ServerConn {
    /// Accept the next connection.
    pub async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = listener.accept().await.expect("accept connection");
        Self {
            stream,
            buffer: Vec::new(),
        }
    }

    /// Send the standard AMI greeting line.
    pub async fn send_greeting(&mut self) { self.write_raw(GREETING).await; }

    /// Write raw text to the client.
    pub async fn write_raw(&mut self, text: &str) {
        self.stream
            .write_all(text.as_bytes())
            .await
            .expect("write to client");
    }

    /// Write raw bytes to the client.
    pub async fn write_bytes(&mut self, bytes: &[u8]) {
        self.stream
            .write_all(bytes)
            .await
            .expect("write bytes to client");
    }

    /// Read one complete message (delimited by a blank line) and decode it.
    pub async fn read_message(&mut self) -> Message {
        loop {
            if let Some(pos) = self.buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                let rest = self.buffer.split_off(pos + 4);
                let raw = String::from_utf8(std::mem::replace(&mut self.buffer, rest))
                    .expect("utf-8 message from client");
                return Message::unmarshall(&raw);
            }
            let mut chunk = [0_u8; 1024];
            let read = self
                .stream
                .read(&mut chunk)
                .await
                .expect("read from client");
            assert!(read > 0, "client closed while a message was expected");
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read the login action, check the credentials, and answer with
    /// `status`. Returns the login's correlation id.
    pub async fn handle_login(&mut self, status: &str) -> String {
        let login = self.read_message().await;
        assert_eq!(login.get("action"), Some("Login"));
        assert_eq!(login.get("username"), Some(USERNAME));
        assert_eq!(login.get("secret"), Some(SECRET));
        let id = login.get("actionid").expect("login actionid").to_owned();
        self.write_raw(&format!("Response: {status}\r\nActionID: {id}\r\n\r\n"))
            .await;
        id
    }

    /// Greet and accept the login in one step.
    pub async fn handshake(&mut self) {
        self.send_greeting().await;
        self.handle_login("Success").await;
    }

    /// Read the logoff action and answer with the goodbye response.
    pub async fn handle_logoff(&mut self) {
        let logoff = self.read_message().await;
        assert_eq!(logoff.get("action"), Some("Logoff"));
        let id = logoff.get("actionid").expect("logoff actionid").to_owned();
        self.write_raw(&format!(
            "Response: Goodbye\r\nActionID: {id}\r\nMessage: Thanks for all the fish.\r\n\r\n"
        ))
        .await;
    }
}
