use axum::{Json, extract::State};
use uuid::Uuid;

use agora_types::api::AddAnswerRequest;
use agora_types::events::PushEvent;
use agora_types::models::Answer;

use crate::AppState;
use crate::error::ApiError;

/// POST /answer/addAnswer
pub async fn add_answer(
    State(state): State<AppState>,
    Json(req): Json<AddAnswerRequest>,
) -> Result<Json<Answer>, ApiError> {
    let (Some(qid), Some(ans)) = (req.qid, req.ans) else {
        return Err(ApiError::BadRequest("Invalid request".into()));
    };

    let Some(ans_date_time) = ans.ans_date_time else {
        return Err(ApiError::BadRequest("Invalid answer".into()));
    };
    if ans.text.is_empty() || ans.ans_by.is_empty() {
        return Err(ApiError::BadRequest("Invalid answer".into()));
    }

    let answer = state
        .db
        .save_answer(Uuid::new_v4(), qid, &ans.text, &ans.ans_by, ans_date_time)
        .map_err(|e| ApiError::internal("adding answer", e))?
        .ok_or_else(|| ApiError::NotFound("Question not found".into()))?;

    state.dispatcher.broadcast(PushEvent::AnswerUpdate {
        qid,
        answer: answer.clone(),
    });

    Ok(Json(answer))
}
