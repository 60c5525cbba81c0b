// src/api.rs
//! Route table for `/api/game`. Transport-free: the server hands over an `ApiRequest`
//! and writes back whatever `ApiResponse` comes out, which keeps this testable without sockets.

use lazy_static::lazy_static;
use log::{debug, error, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, RwLockReadGuard, RwLockWriteGuard};

use crate::ai::MovePicker;
use crate::error::EngineError;
use crate::session::{GameSession, SharedSession};
use crate::types::{Color, Move, PieceKind, RuleKind, Square};

pub const BASE_PATH: &str = "/api/game";

pub const CONTENT_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_JSON: &str = "application/json";

// --- Request / Response ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl ApiRequest {
    pub fn new(method: &str, path: &str, body: &str) -> Self {
        ApiRequest { method: method.to_string(), path: path.to_string(), body: body.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        ApiResponse { status, content_type: CONTENT_TEXT, body: body.into() }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        ApiResponse::text(200, body)
    }

    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => ApiResponse { status: 200, content_type: CONTENT_JSON, body },
            Err(e) => {
                error!("Failed to encode response: {}", e);
                ApiResponse::internal()
            }
        }
    }

    pub fn internal() -> Self {
        ApiResponse::text(500, "internal error")
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            413 => "Payload Too Large",
            _ => "Internal Server Error",
        }
    }
}

impl From<EngineError> for ApiResponse {
    fn from(err: EngineError) -> Self {
        let status = match err {
            EngineError::MalformedRequest(_) | EngineError::OutOfBounds { .. } => 400,
            EngineError::InvalidPiece { .. } => 404,
            EngineError::NothingToUndo | EngineError::NothingToRedo | EngineError::NoMoveAvailable(_) => 409,
        };
        ApiResponse::text(status, err.to_string())
    }
}

// --- Wire DTOs ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest {
    start_x: i64,
    start_y: i64,
    end_x: i64,
    end_y: i64,
    #[serde(default)]
    piece: Option<String>,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidMovesRequest {
    start_x: i64,
    start_y: i64,
    piece: String,
    color: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct Destination {
    end_x: usize,
    end_y: usize,
}

/// The move the engine just played, plus its result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveView {
    start_x: usize,
    start_y: usize,
    end_x: usize,
    end_y: usize,
    piece: PieceKind,
    color: Color,
    result: &'static str,
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, EngineError> {
    serde_json::from_str(body).map_err(|e| EngineError::MalformedRequest(e.to_string()))
}

fn square(row: i64, col: i64) -> Result<Square, EngineError> {
    Square::new(row, col)
        .ok_or_else(|| EngineError::MalformedRequest(format!("square ({}, {}) is off the board", row, col)))
}

// --- Routing ---

lazy_static! {
    static ref SET_RULE_ROUTE: Regex = Regex::new(r"^/setRule/([A-Za-z]+)$").unwrap();
    static ref MOVE_ROUTE: Regex = Regex::new(r"^/move([A-Z][A-Za-z]*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    InitialBoard,
    Board,
    CurrentRule,
    CurrentTurn,
    SetRule(String),
    Restart,
    ValidMoves,
    /// `Some` when the path names the piece type (`/moveKnight`), `None` for `/movePiece`.
    Move(Option<String>),
    Undo,
    Redo,
    AiMove,
}

impl Route {
    /// Resolves a path relative to `BASE_PATH`, with the query string already removed.
    fn parse(path: &str) -> Option<Route> {
        let route = match path {
            "/initialBoard" => Route::InitialBoard,
            "/board" => Route::Board,
            "/currentRule" => Route::CurrentRule,
            "/currentTurn" => Route::CurrentTurn,
            "/restart" => Route::Restart,
            "/validMoves" => Route::ValidMoves,
            "/movePiece" => Route::Move(None),
            "/undo" => Route::Undo,
            "/redo" => Route::Redo,
            "/aiMove" => Route::AiMove,
            _ => {
                if let Some(caps) = SET_RULE_ROUTE.captures(path) {
                    Route::SetRule(caps[1].to_string())
                } else if let Some(caps) = MOVE_ROUTE.captures(path) {
                    Route::Move(Some(caps[1].to_string()))
                } else {
                    return None;
                }
            }
        };
        Some(route)
    }

    fn method(&self) -> &'static str {
        match self {
            Route::InitialBoard | Route::Board | Route::CurrentRule | Route::CurrentTurn | Route::AiMove => "GET",
            _ => "POST",
        }
    }
}

// --- Handlers ---

type Handled = Result<ApiResponse, ApiResponse>;

pub struct Api {
    session: SharedSession,
    picker: Mutex<Box<dyn MovePicker>>,
}

impl Api {
    pub fn new(session: SharedSession, picker: Box<dyn MovePicker>) -> Self {
        Api { session, picker: Mutex::new(picker) }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let path = request.path.split('?').next().unwrap_or("");
        let route = match path.strip_prefix(BASE_PATH).and_then(Route::parse) {
            Some(route) => route,
            None => return ApiResponse::text(404, format!("no route for {}", path)),
        };
        if !request.method.eq_ignore_ascii_case(route.method()) {
            return ApiResponse::text(405, format!("{} expects {}", path, route.method()));
        }
        debug!("Dispatching {:?}", route);

        let outcome = match route {
            Route::InitialBoard => self.read().map(|s| ApiResponse::json(s.initial_board())),
            Route::Board => self.read().map(|s| ApiResponse::json(s.board())),
            Route::CurrentRule => self.read().map(|s| ApiResponse::ok(s.active_rule().name())),
            Route::CurrentTurn => self.read().map(|s| ApiResponse::ok(s.current_turn().to_string())),
            Route::SetRule(name) => self.set_rule(&name),
            Route::Restart => self.write().map(|mut s| {
                s.restart();
                ApiResponse::ok("RESTARTED")
            }),
            Route::ValidMoves => self.valid_moves(&request.body),
            Route::Move(piece) => self.submit_move(piece.as_deref(), &request.body),
            Route::Undo => self.undo(),
            Route::Redo => self.redo(),
            Route::AiMove => self.ai_move(),
        };

        outcome.unwrap_or_else(|failure| {
            if failure.status >= 500 {
                error!("{} {} failed: {}", request.method, path, failure.body);
            } else {
                warn!("{} {} rejected ({}): {}", request.method, path, failure.status, failure.body);
            }
            failure
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GameSession>, ApiResponse> {
        self.session.read().map_err(|_| {
            error!("Session lock poisoned");
            ApiResponse::internal()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GameSession>, ApiResponse> {
        self.session.write().map_err(|_| {
            error!("Session lock poisoned");
            ApiResponse::internal()
        })
    }

    fn set_rule(&self, name: &str) -> Handled {
        let rule: RuleKind = name.parse()?;
        self.write()?.set_rule(rule);
        Ok(ApiResponse::ok("RULE_SET"))
    }

    fn valid_moves(&self, body: &str) -> Handled {
        let req: ValidMovesRequest = decode(body)?;
        let kind: PieceKind = req.piece.parse()?;
        let color: Color = req.color.parse()?;
        let moves = self.read()?.valid_moves(req.start_x, req.start_y, kind, color)?;
        let destinations: Vec<Destination> = moves
            .into_iter()
            .map(|sq| Destination { end_x: sq.row, end_y: sq.col })
            .collect();
        Ok(ApiResponse::json(&destinations))
    }

    fn submit_move(&self, path_piece: Option<&str>, body: &str) -> Handled {
        let req: MoveRequest = decode(body)?;
        let piece_name = path_piece
            .or(req.piece.as_deref())
            .ok_or_else(|| EngineError::MalformedRequest("missing piece type".to_string()))?;
        let piece: PieceKind = piece_name.parse()?;
        let color: Color = req.color.parse()?;
        let mv = Move::new(square(req.start_x, req.start_y)?, square(req.end_x, req.end_y)?, piece, color);

        let mut session = self.write()?;
        let result = session.submit_move(&mv);
        Ok(ApiResponse::ok(format!("{};CURRENT_TURN={}", result, session.current_turn())))
    }

    fn undo(&self) -> Handled {
        self.write()?.undo()?;
        Ok(ApiResponse::ok("UNDO_SUCCESS"))
    }

    fn redo(&self) -> Handled {
        self.write()?.redo()?;
        Ok(ApiResponse::ok("REDO_SUCCESS"))
    }

    fn ai_move(&self) -> Handled {
        let mut picker = self.picker.lock().map_err(|_| {
            error!("Picker lock poisoned");
            ApiResponse::internal()
        })?;
        let (mv, result) = self.write()?.ai_move(picker.as_mut())?;
        Ok(ApiResponse::json(&MoveView {
            start_x: mv.start.row,
            start_y: mv.start.col,
            end_x: mv.end.row,
            end_y: mv.end.col,
            piece: mv.piece,
            color: mv.color,
            result: result.as_str(),
        }))
    }
}
