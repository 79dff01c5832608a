use crate::{
    error::GameError,
    game::{Dice, Game},
    models::GameSnapshot,
    questions::QuestionBank,
    server::GameServer,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState, GameSession,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// WebSocket upgrade handler
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    tracing::info!("WebSocket connection established");

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client. The game this connection
    // plays in is remembered across messages.
    let mut recv_task = tokio::spawn(async move {
        let mut current_game: Option<Uuid> = None;
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            handle_client_message(client_msg, &state, &mut current_game)
                        }
                        Err(e) => {
                            tracing::error!("Failed to parse message: {}", e);
                            ServerMessage::Error {
                                message: format!("Invalid message format: {}", e),
                            }
                        }
                    };
                    if tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Client disconnected from game {:?}", current_game);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    tracing::info!("WebSocket connection closed");
}

/// Handle individual client messages. Sessions outlive the connection so a
/// client can resume a game after reconnecting.
pub(crate) fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    current_game: &mut Option<Uuid>,
) -> ServerMessage {
    match msg {
        ClientMessage::StartGame {
            players,
            categories,
        } => start_game(state, players, categories, current_game),
        ClientMessage::ResumeGame { game_id } => match state.sessions.get_mut(&game_id) {
            Some(mut session) => {
                session.touch();
                *current_game = Some(game_id);
                tracing::info!("Resumed game {}", game_id);
                game_state(session.server.game())
            }
            None => ServerMessage::Error {
                message: format!("No game with id {}", game_id),
            },
        },
        ClientMessage::GetCategories => {
            let categories = match current_game.as_ref().and_then(|id| state.sessions.get(id)) {
                Some(session) => session.server.categories(),
                None => state.catalog.categories(),
            };
            ServerMessage::Categories { categories }
        }
        ClientMessage::SetPlayerOrder { players } => {
            with_session(state, current_game, |server| {
                server.set_player_order(&players).map(game_state)
            })
        }
        ClientMessage::Roll => with_session(state, current_game, |server| {
            let value = server.roll()?;
            Ok(ServerMessage::Rolled {
                value,
                game: server.game().into(),
            })
        }),
        ClientMessage::GetDirections => with_session(state, current_game, |server| {
            Ok(ServerMessage::Directions {
                directions: server.available_directions(),
            })
        }),
        ClientMessage::Move { direction } => with_session(state, current_game, |server| {
            server.advance(direction).map(game_state)
        }),
        ClientMessage::GetQuestion { category } => {
            with_session(state, current_game, |server| {
                let question = server.question(category.as_deref())?;
                Ok(ServerMessage::Question { question })
            })
        }
        ClientMessage::VerifyQuestion { correct } => {
            with_session(state, current_game, |server| {
                server.verify_question(correct)?;
                Ok(match server.winner() {
                    Some(winner) => ServerMessage::GameOver {
                        winner: winner.to_string(),
                        game: server.game().into(),
                    },
                    None => game_state(server.game()),
                })
            })
        }
        ClientMessage::GetScore { player } => with_session(state, current_game, |server| {
            let categories = server.score(&player)?;
            Ok(ServerMessage::Score { player, categories })
        }),
    }
}

fn start_game(
    state: &AppState,
    players: Vec<String>,
    categories: Vec<String>,
    current_game: &mut Option<Uuid>,
) -> ServerMessage {
    if state.sessions.len() >= state.config.game.max_sessions {
        tracing::warn!("Refusing new game: {} games active", state.sessions.len());
        return ServerMessage::Error {
            message: "Too many active games, try again later".to_string(),
        };
    }

    let provider = QuestionBank::new(state.catalog.clone());
    match GameServer::start(provider, players, categories, Dice::random()) {
        Ok(server) => {
            let categories = server.selected_categories().to_vec();
            let game = GameSnapshot::from(server.game());
            let Some(game_id) = register_session(state, server) else {
                return ServerMessage::Error {
                    message: "Too many active games, try again later".to_string(),
                };
            };
            *current_game = Some(game_id);
            tracing::info!("Started game {}", game_id);
            ServerMessage::GameStarted {
                game_id,
                categories,
                game,
            }
        }
        Err(e) => error_reply(e),
    }
}

/// Store a new session, backing out again if a concurrent start pushed the
/// registry past the limit.
fn register_session(state: &AppState, server: GameServer<QuestionBank>) -> Option<Uuid> {
    let game_id = Uuid::new_v4();
    state.sessions.insert(game_id, GameSession::new(server));

    if state.sessions.len() > state.config.game.max_sessions {
        state.sessions.remove(&game_id);
        tracing::warn!("Session limit reached, dropping new game {}", game_id);
        return None;
    }
    Some(game_id)
}

/// Run a command against the connection's current game
fn with_session<F>(state: &AppState, current_game: &Option<Uuid>, command: F) -> ServerMessage
where
    F: FnOnce(&mut GameServer<QuestionBank>) -> Result<ServerMessage, GameError>,
{
    let Some(game_id) = *current_game else {
        return ServerMessage::Error {
            message: "No game in progress".to_string(),
        };
    };
    let Some(mut session) = state.sessions.get_mut(&game_id) else {
        return ServerMessage::Error {
            message: format!("Game {} has expired", game_id),
        };
    };

    session.touch();
    match command(&mut session.server) {
        Ok(reply) => reply,
        Err(e) => error_reply(e),
    }
}

fn game_state(game: &Game) -> ServerMessage {
    ServerMessage::GameState { game: game.into() }
}

fn error_reply(err: GameError) -> ServerMessage {
    if err.is_state_violation() {
        tracing::debug!("Ignoring command: {}", err);
        ServerMessage::NotAllowed {
            message: err.to_string(),
        }
    } else {
        tracing::warn!("Command failed: {}", err);
        ServerMessage::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::{Direction, GameState, CENTER};
    use crate::questions::{Question, QuestionCatalog};

    fn test_state() -> AppState {
        let questions = ["art", "science", "history", "geo"]
            .iter()
            .map(|category| Question {
                category: category.to_string(),
                question: format!("A {} question", category),
                answer: "42".to_string(),
                media: None,
            })
            .collect();
        AppState::new(Config::default(), QuestionCatalog::new(questions))
    }

    fn start(state: &AppState, current: &mut Option<Uuid>) -> Uuid {
        let reply = handle_client_message(
            ClientMessage::StartGame {
                players: vec!["Ada".to_string(), "Grace".to_string()],
                categories: vec![
                    "art".to_string(),
                    "science".to_string(),
                    "history".to_string(),
                    "geo".to_string(),
                ],
            },
            state,
            current,
        );
        match reply {
            ServerMessage::GameStarted { game_id, game, .. } => {
                assert_eq!(game.state, GameState::Roll);
                game_id
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_commands_without_game_are_errors() {
        let state = test_state();
        let mut current = None;
        let reply = handle_client_message(ClientMessage::Roll, &state, &mut current);
        assert!(matches!(reply, ServerMessage::Error { .. }));
    }

    #[test]
    fn test_categories_without_game_come_from_catalog() {
        let state = test_state();
        let mut current = None;
        match handle_client_message(ClientMessage::GetCategories, &state, &mut current) {
            ServerMessage::Categories { categories } => {
                assert_eq!(categories, vec!["art", "science", "history", "geo"])
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_start_game_registers_session() {
        let state = test_state();
        let mut current = None;
        let game_id = start(&state, &mut current);
        assert_eq!(current, Some(game_id));
        assert!(state.sessions.contains_key(&game_id));
    }

    #[test]
    fn test_start_game_with_bad_categories_is_an_error() {
        let state = test_state();
        let mut current = None;
        let reply = handle_client_message(
            ClientMessage::StartGame {
                players: vec!["Ada".to_string()],
                categories: vec!["art".to_string()],
            },
            &state,
            &mut current,
        );
        assert!(matches!(reply, ServerMessage::Error { .. }));
        assert!(current.is_none());
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_roll_then_roll_again_is_not_allowed() {
        let state = test_state();
        let mut current = None;
        start(&state, &mut current);

        match handle_client_message(ClientMessage::Roll, &state, &mut current) {
            ServerMessage::Rolled { value, game } => {
                assert!((1..=6).contains(&value));
                assert_eq!(game.state, GameState::Move);
                assert_eq!(game.roll, value);
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = handle_client_message(ClientMessage::Roll, &state, &mut current);
        assert!(matches!(reply, ServerMessage::NotAllowed { .. }));
    }

    #[test]
    fn test_move_from_center_needs_spoke_direction() {
        let state = test_state();
        let mut current = None;
        start(&state, &mut current);
        handle_client_message(ClientMessage::Roll, &state, &mut current);

        let reply = handle_client_message(
            ClientMessage::Move { direction: None },
            &state,
            &mut current,
        );
        assert!(matches!(reply, ServerMessage::Error { .. }));

        match handle_client_message(
            ClientMessage::Move {
                direction: Some(Direction::Up),
            },
            &state,
            &mut current,
        ) {
            ServerMessage::GameState { game } => {
                assert_ne!(game.players[0].location, CENTER);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_directions_at_start() {
        let state = test_state();
        let mut current = None;
        start(&state, &mut current);
        match handle_client_message(ClientMessage::GetDirections, &state, &mut current) {
            ServerMessage::Directions { directions } => {
                assert_eq!(directions, Some(Direction::SPOKE.to_vec()))
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_named_question_and_score() {
        let state = test_state();
        let mut current = None;
        start(&state, &mut current);

        match handle_client_message(
            ClientMessage::GetQuestion {
                category: Some("geo".to_string()),
            },
            &state,
            &mut current,
        ) {
            ServerMessage::Question { question } => assert_eq!(question.category, "geo"),
            other => panic!("unexpected reply: {:?}", other),
        }

        match handle_client_message(
            ClientMessage::GetScore {
                player: "Grace".to_string(),
            },
            &state,
            &mut current,
        ) {
            ServerMessage::Score { player, categories } => {
                assert_eq!(player, "Grace");
                assert!(categories.is_empty());
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_resume_game_from_another_connection() {
        let state = test_state();
        let mut first = None;
        let game_id = start(&state, &mut first);

        let mut second = None;
        let reply = handle_client_message(
            ClientMessage::ResumeGame { game_id },
            &state,
            &mut second,
        );
        assert!(matches!(reply, ServerMessage::GameState { .. }));
        assert_eq!(second, Some(game_id));

        let reply = handle_client_message(
            ClientMessage::ResumeGame {
                game_id: Uuid::new_v4(),
            },
            &state,
            &mut second,
        );
        assert!(matches!(reply, ServerMessage::Error { .. }));
        assert_eq!(second, Some(game_id));
    }

    #[test]
    fn test_session_limit() {
        let mut config = Config::default();
        config.game.max_sessions = 1;
        let state = AppState::new(config, QuestionCatalog::empty());

        let mut current = None;
        let players = vec!["Ada".to_string()];
        let categories: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();

        let reply = handle_client_message(
            ClientMessage::StartGame {
                players: players.clone(),
                categories: categories.clone(),
            },
            &state,
            &mut current,
        );
        assert!(matches!(reply, ServerMessage::GameStarted { .. }));

        let reply = handle_client_message(
            ClientMessage::StartGame {
                players,
                categories,
            },
            &state,
            &mut current,
        );
        assert!(matches!(reply, ServerMessage::Error { .. }));
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn test_register_session_backs_out_past_the_limit() {
        let mut config = Config::default();
        config.game.max_sessions = 1;
        let state = AppState::new(config, QuestionCatalog::empty());

        let server = || {
            GameServer::start(
                QuestionBank::new(state.catalog.clone()),
                vec!["Ada".to_string()],
                ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
                Dice::seeded(7),
            )
            .unwrap()
        };

        // A session registered between the limit check and the insert
        state
            .sessions
            .insert(Uuid::new_v4(), GameSession::new(server()));

        assert!(register_session(&state, server()).is_none());
        assert_eq!(state.sessions.len(), 1);
    }
}
