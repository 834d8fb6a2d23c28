//! # Network Communication Protocol Module
//!
//! This module implements the request/response protocol spoken between the fleet
//! server and its clients (the `console` binary, scripts, tests).
//!
//! ## Protocol Architecture
//!
//! The protocol uses newline-delimited JSON over TCP:
//! - One request object per line, tagged by its `action`
//! - Exactly one response line per request, tagged by its `status`
//! - Malformed requests are answered with an error response, the connection stays open
//!
//! ## Data Structures
//!
//! Coordinates and identifiers keep the camelCase field names of the drone API
//! (`droneId`, `xCoordinate`, `yCoordinate`, `direction`), so the same payloads
//! appear on the wire and in the history files.

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::DroneError;
use crate::history::{HistoryEntry, HistorySink};
use crate::registry::{DroneRecord, DroneStore};
use crate::service::{DroneService, MoveOutcome};
use crate::types::Direction;

/// A client request, one per line.
///
/// # Examples
///
/// ```rust
/// use drone_fleet::network::Request;
///
/// let line = r#"{"action":"register","xCoordinate":5,"yCoordinate":5,"direction":"North"}"#;
/// let request: Request = serde_json::from_str(line).unwrap();
/// assert!(matches!(request, Request::Register { x: 5, y: 5, .. }));
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    /// Place a new drone on the field
    Register {
        #[serde(rename = "xCoordinate")]
        x: i32,
        #[serde(rename = "yCoordinate")]
        y: i32,
        /// Any casing of NORTH, EAST, SOUTH or WEST
        direction: String,
    },

    /// Move an existing drone to a new cell
    Move {
        #[serde(rename = "droneId")]
        drone_id: Uuid,
        #[serde(rename = "xCoordinate")]
        x: i32,
        #[serde(rename = "yCoordinate")]
        y: i32,
    },

    /// Current state of one drone
    Get {
        #[serde(rename = "droneId")]
        drone_id: Uuid,
    },

    /// Every recorded state of one drone, oldest first
    History {
        #[serde(rename = "droneId")]
        drone_id: Uuid,
    },

    /// Every drone on the field, in registration order
    List,
}

/// Network-serializable representation of a drone.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DroneResponse {
    #[serde(rename = "droneId")]
    pub drone_id: Uuid,
    #[serde(rename = "xCoordinate")]
    pub x: i32,
    #[serde(rename = "yCoordinate")]
    pub y: i32,
    pub direction: Direction,
}

/// Error payload, mirrors the status/message/details triple of the REST API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    /// HTTP-style status code (400, 404, 500)
    pub status: u16,
    /// Short summary, e.g. "Invalid values"
    pub message: String,
    /// Human-readable reasons
    pub details: Vec<String>,
}

impl From<&DroneError> for ErrorResponse {
    fn from(err: &DroneError) -> Self {
        Self {
            status: err.status(),
            message: err.title().to_string(),
            details: vec![err.to_string()],
        }
    }
}

/// Payload of a successful response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ResponseBody {
    Drone(DroneResponse),
    /// Final state of a move plus the trace that produced it
    Moved(HistoryEntry),
    History(Vec<HistoryEntry>),
    Fleet(Vec<DroneResponse>),
}

/// One response line.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { body: ResponseBody },
    Error { error: ErrorResponse },
}

impl Response {
    pub fn ok(body: ResponseBody) -> Self {
        Response::Ok { body }
    }

    pub fn error(err: &DroneError) -> Self {
        Response::Error { error: err.into() }
    }
}

/// Default TCP port for the fleet server.
///
/// Clients should connect to `localhost:8080` when running locally.
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum accepted length of a single request line (64 kilobytes).
///
/// Legitimate requests are a few dozen bytes; longer lines are answered with an
/// error and skipped up to their newline.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

// Fonction utilitaire : convertir un enregistrement de drone pour transmission réseau
pub fn create_drone_response(record: &DroneRecord) -> DroneResponse {
    DroneResponse {
        drone_id: record.id,
        x: record.state.position.x,
        y: record.state.position.y,
        direction: record.state.facing,
    }
}

/// Fonction utilitaire : convertir le résultat d'un déplacement pour transmission réseau
pub fn create_move_response(outcome: MoveOutcome) -> HistoryEntry {
    HistoryEntry::new(outcome.id, outcome.state, outcome.details)
}

/// Dispatches one decoded request to the service.
pub fn handle_request<S, H>(service: &DroneService<S, H>, request: Request) -> Response
where
    S: DroneStore,
    H: HistorySink,
{
    let result = match request {
        Request::Register { x, y, direction } => service
            .register(x, y, &direction)
            .map(|record| ResponseBody::Drone(create_drone_response(&record))),
        Request::Move { drone_id, x, y } => service
            .move_drone(drone_id, x, y)
            .map(|outcome| ResponseBody::Moved(create_move_response(outcome))),
        Request::Get { drone_id } => service
            .get(drone_id)
            .map(|record| ResponseBody::Drone(create_drone_response(&record))),
        Request::History { drone_id } => service.history(drone_id).map(ResponseBody::History),
        Request::List => Ok(ResponseBody::Fleet(
            service.list().iter().map(create_drone_response).collect(),
        )),
    };

    match result {
        Ok(body) => Response::ok(body),
        Err(err) => {
            debug!(status = err.status(), error = %err, "request rejected");
            Response::error(&err)
        }
    }
}

/// Decodes one request line, runs it, and encodes the response line (without newline).
pub fn handle_line<S, H>(service: &DroneService<S, H>, line: &str) -> String
where
    S: DroneStore,
    H: HistorySink,
{
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(service, request),
        Err(e) => Response::error(&DroneError::Protocol(e.to_string())),
    };
    encode(&response)
}

fn encode(response: &Response) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to encode response");
            r#"{"status":"error","error":{"status":500,"message":"Internal error","details":[]}}"#
                .to_string()
        }
    }
}

/// Accepts clients forever, one task per connection.
pub async fn serve<S, H>(listener: TcpListener, service: Arc<DroneService<S, H>>) -> io::Result<()>
where
    S: DroneStore + Send + 'static,
    H: HistorySink + Send + 'static,
{
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(%addr, "client connected");
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    match handle_client(stream, service).await {
                        Ok(()) => info!(%addr, "client disconnected"),
                        Err(e) => warn!(%addr, error = %e, "client connection closed with error"),
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "failed to accept connection");
            }
        }
    }
}

async fn handle_client<S, H>(stream: TcpStream, service: Arc<DroneService<S, H>>) -> io::Result<()>
where
    S: DroneStore + Send + 'static,
    H: HistorySink + Send + 'static,
{
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_MESSAGE_SIZE as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(());
        }

        if line.len() > MAX_MESSAGE_SIZE {
            let err = DroneError::Protocol(format!(
                "request exceeds {} bytes",
                MAX_MESSAGE_SIZE
            ));
            warn!(limit = MAX_MESSAGE_SIZE, "oversized request discarded");
            if line.last() != Some(&b'\n') {
                discard_line(&mut reader).await?;
            }
            write_line(&mut write_half, &encode(&Response::error(&err))).await?;
            continue;
        }

        let request = match std::str::from_utf8(&line) {
            Ok(text) => text.trim(),
            Err(e) => {
                let err = DroneError::Protocol(format!("request is not valid UTF-8: {e}"));
                write_line(&mut write_half, &encode(&Response::error(&err))).await?;
                continue;
            }
        };
        if request.is_empty() {
            continue;
        }

        // Le service verrouille et écrit sur disque : hors du runtime asynchrone
        let svc = Arc::clone(&service);
        let request = request.to_string();
        let reply = tokio::task::spawn_blocking(move || handle_line(svc.as_ref(), &request))
            .await
            .map_err(io::Error::other)?;

        write_line(&mut write_half, &reply).await?;
    }
}

/// Skips input up to and including the next newline.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> io::Result<()> {
    writer.write_all(json.as_bytes()).await?;
    // Délimiteur de fin de message
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Line-oriented client for the fleet server.
pub struct Client {
    reader: BufReader<TcpStream>,
}

impl Client {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    /// Sends one request and waits for its response.
    pub async fn send(&mut self, request: &Request) -> io::Result<Response> {
        let json = serde_json::to_string(request)?;
        write_line(self.reader.get_mut(), &json).await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(serde_json::from_str(&line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::registry::Registry;

    fn service() -> DroneService<Registry, MemoryHistory> {
        DroneService::new(Registry::new(), MemoryHistory::new())
    }

    fn decode(line: &str) -> Response {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn register_then_move_over_json_lines() {
        let svc = service();
        let reply = decode(&handle_line(
            &svc,
            r#"{"action":"register","xCoordinate":5,"yCoordinate":5,"direction":"north"}"#,
        ));
        let Response::Ok { body: ResponseBody::Drone(drone) } = reply else {
            panic!("register failed");
        };
        assert_eq!(drone.direction, Direction::North);

        let line = format!(
            r#"{{"action":"move","droneId":"{}","xCoordinate":7,"yCoordinate":7}}"#,
            drone.drone_id
        );
        let Response::Ok { body: ResponseBody::Moved(moved) } = decode(&handle_line(&svc, &line))
        else {
            panic!("move failed");
        };
        assert_eq!((moved.x, moved.y), (7, 7));
        assert_eq!(
            moved.details,
            vec![
                "Pointed from NORTH to EAST",
                "Moved to (7, 5) towards EAST",
                "Pointed from EAST to NORTH",
                "Moved to (7, 7) towards NORTH",
            ]
        );
    }

    #[test]
    fn malformed_line_is_a_validation_error() {
        let svc = service();
        let reply = decode(&handle_line(&svc, r#"{"action":"register","xCoordinate":1}"#));
        let Response::Error { error } = reply else {
            panic!("expected an error");
        };
        assert_eq!(error.status, 400);
        assert_eq!(error.message, "Validation Failed");
        assert!(error.details[0].contains("yCoordinate"));
    }

    #[test]
    fn out_of_bounds_register_is_invalid_values() {
        let svc = service();
        let reply = handle_request(
            &svc,
            Request::Register {
                x: 10,
                y: 0,
                direction: "EAST".into(),
            },
        );
        assert_eq!(
            reply,
            Response::Error {
                error: ErrorResponse {
                    status: 400,
                    message: "Invalid values".into(),
                    details: vec!["Out of field values for Coordinates".into()],
                }
            }
        );
    }

    #[test]
    fn unknown_drone_is_reported_as_404() {
        let svc = service();
        let reply = handle_request(&svc, Request::Get { drone_id: Uuid::new_v4() });
        let Response::Error { error } = reply else {
            panic!("expected an error");
        };
        assert_eq!(error.status, 404);
        assert_eq!(error.message, "Invalid droneId");
        assert_eq!(error.details, vec!["Drone not found"]);
    }

    #[test]
    fn list_returns_fleet_in_registration_order() {
        let svc = service();
        svc.register(0, 0, "NORTH").unwrap();
        svc.register(9, 9, "SOUTH").unwrap();
        let Response::Ok { body: ResponseBody::Fleet(fleet) } = handle_request(&svc, Request::List)
        else {
            panic!("list failed");
        };
        let cells: Vec<(i32, i32)> = fleet.iter().map(|d| (d.x, d.y)).collect();
        assert_eq!(cells, vec![(0, 0), (9, 9)]);
    }

    #[test]
    fn response_wire_shape() {
        let json = serde_json::to_value(Response::ok(ResponseBody::Drone(DroneResponse {
            drone_id: Uuid::nil(),
            x: 1,
            y: 2,
            direction: Direction::East,
        })))
        .unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["body"]["kind"], "drone");
        assert_eq!(json["body"]["data"]["xCoordinate"], 1);
        assert_eq!(json["body"]["data"]["direction"], "EAST");
    }
}
