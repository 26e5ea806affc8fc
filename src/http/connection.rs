use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};

use crate::api::error::ApiError;
use crate::api::handler::ApiHandler;
use crate::config::ServerConfig;
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::shutdown::ShutdownSignal;

const READ_CHUNK: usize = 4096;

pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    handler: ApiHandler,
    settings: ServerConfig,
    shutdown: ShutdownSignal,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

enum ReadOutcome {
    Request(Request),
    Malformed(ParseError),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        handler: ApiHandler,
        settings: ServerConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
            handler,
            settings,
            shutdown,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        ReadOutcome::Request(req) => ConnectionState::Processing(req),
                        ReadOutcome::Malformed(e) => {
                            tracing::warn!(error = %e, "Rejecting malformed request");
                            let response = ApiError::BadRequest
                                .into_response()
                                .with_header("Connection", "close");
                            ConnectionState::Writing(ResponseWriter::new(&response, true), false)
                        }
                        ReadOutcome::Closed => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    let (response, keep_alive) = self.handle_request(&req);
                    let writer = ResponseWriter::new(&response, req.method != Method::HEAD);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    timeout(
                        self.settings.write_timeout(),
                        writer.write_to_stream(&mut self.stream),
                    )
                    .await
                    .map_err(|_| anyhow::anyhow!("timed out writing response"))??;

                    if keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        let mut deadline: Option<Instant> = None;

        loop {
            // Try parsing whatever we already have
            if !self.buffer.is_empty() {
                match parse_http_request(&self.buffer) {
                    Ok((request, consumed)) => {
                        self.buffer.advance(consumed);
                        return Ok(ReadOutcome::Request(request));
                    }
                    Err(ParseError::Incomplete) => {}
                    Err(e) => return Ok(ReadOutcome::Malformed(e)),
                }
            }

            self.buffer.reserve(READ_CHUNK);

            let n = if self.buffer.is_empty() {
                // Between requests: bounded by the idle timeout, cut short by shutdown
                tokio::select! {
                    res = timeout(self.settings.idle_timeout(), self.stream.read_buf(&mut self.buffer)) => {
                        match res {
                            Ok(read) => read?,
                            Err(_) => {
                                tracing::debug!("Idle connection timed out");
                                return Ok(ReadOutcome::Closed);
                            }
                        }
                    }
                    _ = self.shutdown.triggered() => {
                        return Ok(ReadOutcome::Closed);
                    }
                }
            } else {
                let deadline =
                    *deadline.get_or_insert_with(|| Instant::now() + self.settings.read_timeout());
                timeout_at(deadline, self.stream.read_buf(&mut self.buffer))
                    .await
                    .map_err(|_| anyhow::anyhow!("timed out reading request"))??
            };

            if n == 0 {
                // Client closed connection
                if !self.buffer.is_empty() {
                    tracing::debug!(buffered = self.buffer.len(), "Client closed mid-request");
                }
                return Ok(ReadOutcome::Closed);
            }
        }
    }

    fn handle_request(&self, req: &Request) -> (Response, bool) {
        let response = self.handler.handle(req);
        let keep_alive = req.keep_alive() && !self.shutdown.is_triggered();

        if keep_alive {
            (response, true)
        } else {
            (response.with_header("Connection", "close"), false)
        }
    }
}
