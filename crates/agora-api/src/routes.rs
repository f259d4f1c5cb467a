use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::{delete, get, patch, post},
};

use crate::{AppState, answers, comments, messages, questions, users};

/// Assemble the full route table. Layers (CORS, request tracing) are applied
/// by the binary so tests can drive the bare router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/user/signup", post(users::create_user))
        .route("/user/login", post(users::user_login))
        .route("/user/getUser/{username}", get(users::get_user))
        .route("/user/resetPassword", patch(users::reset_password))
        .route("/user/deleteUser/{username}", delete(users::delete_user))
        .route("/messaging/addMessage", post(messages::add_message))
        .route("/messaging/getMessages", get(messages::get_messages))
        .route("/question/addQuestion", post(questions::add_question))
        .route("/question/getQuestion", get(questions::get_questions))
        .route(
            "/question/getQuestionById/{qid}",
            get(questions::get_question_by_id),
        )
        .route("/question/upvoteQuestion", post(questions::upvote_question))
        .route(
            "/question/downvoteQuestion",
            post(questions::downvote_question),
        )
        .route("/answer/addAnswer", post(answers::add_answer))
        .route("/comment/addComment", post(comments::add_comment))
        .route("/gateway", get(ws_upgrade))
        .with_state(state)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        agora_gateway::connection::handle_connection(socket, state.dispatcher.clone())
    })
}
