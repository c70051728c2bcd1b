//! HTTP debug server implementation.

use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::{DebugState, LightsPatch};

#[derive(Debug, thiserror::Error)]
pub enum DebugServerError {
    #[error("Failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },
    #[error("Failed to spawn server thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Debug state mutex poisoned")]
    StatePoisoned,
    #[error("Server thread panicked")]
    ThreadPanic,
}

/// HTTP server for the debug panel.
/// Runs on a background thread so requests never stall a frame.
pub struct DebugServer {
    port: u16,
    actual_port: Option<u16>,
    server: Option<Arc<Server>>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Serialize, Deserialize)]
struct Command {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type JsonResponse = Response<Cursor<Vec<u8>>>;

fn json_response<T: Serialize>(value: &T) -> Result<JsonResponse, serde_json::Error> {
    let response = Response::from_string(serde_json::to_string(value)?);
    Ok(
        match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
            Ok(header) => response.with_header(header),
            Err(()) => response,
        },
    )
}

fn bad_request(error: impl ToString) -> Result<JsonResponse, serde_json::Error> {
    Ok(json_response(&ErrorResponse {
        error: error.to_string(),
    })?
    .with_status_code(400))
}

fn lock(state: &Mutex<DebugState>) -> Result<MutexGuard<'_, DebugState>, DebugServerError> {
    state.lock().map_err(|_| DebugServerError::StatePoisoned)
}

impl DebugServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            server: None,
            handle: None,
        }
    }

    pub fn start(&mut self, state: Arc<Mutex<DebugState>>) -> Result<(), DebugServerError> {
        let server = Server::http(format!("127.0.0.1:{}", self.port)).map_err(|e| {
            DebugServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);

        let server = Arc::new(server);
        let worker = Arc::clone(&server);
        let handle = thread::Builder::new()
            .name("terra-debug-server".into())
            .spawn(move || Self::run_server(&worker, &state))?;

        self.server = Some(server);
        self.handle = Some(handle);
        log::info!("Debug panel listening on http://127.0.0.1:{actual_port}");
        Ok(())
    }

    /// Unblock the accept loop and wait for the thread to finish.
    pub fn stop(&mut self) -> Result<(), DebugServerError> {
        if let Some(server) = self.server.take() {
            server.unblock();
        }
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| DebugServerError::ThreadPanic),
            None => Ok(()),
        }
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    fn run_server(server: &Server, state: &Mutex<DebugState>) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, state) {
                log::warn!("Debug server error: {e}");
            }
        }
    }

    fn handle_request(
        mut request: Request,
        state: &Mutex<DebugState>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = match (request.method(), request.url()) {
            (&Method::Get, "/health") => {
                let debug_state = lock(state)?;
                json_response(&HealthResponse {
                    status: "ok",
                    uptime_seconds: debug_state.uptime_seconds,
                })?
            }
            (&Method::Get, "/metrics") => {
                let debug_state = lock(state)?;
                json_response(&*debug_state)?
            }
            (&Method::Get, "/lights") => {
                let debug_state = lock(state)?;
                json_response(&debug_state.lights)?
            }
            (&Method::Post, "/lights") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                match serde_json::from_str::<LightsPatch>(&body) {
                    Ok(patch) => {
                        let mut debug_state = lock(state)?;
                        if patch.apply(&mut debug_state.lights) {
                            debug_state.lights_dirty = true;
                        }
                        json_response(&debug_state.lights)?
                    }
                    Err(e) => bad_request(e)?,
                }
            }
            (&Method::Post, "/command") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                match serde_json::from_str::<Command>(&body) {
                    Ok(command) => {
                        let executed = match command.command.as_str() {
                            "quit" => {
                                lock(state)?.quit_requested = true;
                                true
                            }
                            _ => false,
                        };
                        json_response(&CommandResponse {
                            executed,
                            command: command.command,
                        })?
                    }
                    Err(e) => bad_request(e)?,
                }
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }
}

impl Drop for DebugServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Debug server shutdown: {e}");
        }
    }
}
