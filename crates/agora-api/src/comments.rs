use axum::{Json, extract::State};
use uuid::Uuid;

use agora_types::api::AddCommentRequest;
use agora_types::events::PushEvent;
use agora_types::models::{Comment, CommentTarget};

use crate::AppState;
use crate::error::ApiError;

/// POST /comment/addComment
pub async fn add_comment(
    State(state): State<AppState>,
    Json(req): Json<AddCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let (Some(parent_id), Some(target), Some(comment)) = (req.id, req.target, req.comment) else {
        return Err(ApiError::BadRequest("Invalid request".into()));
    };

    let Some(comment_date_time) = comment.comment_date_time else {
        return Err(ApiError::BadRequest("Invalid comment".into()));
    };
    if comment.text.is_empty() || comment.comment_by.is_empty() {
        return Err(ApiError::BadRequest("Invalid comment".into()));
    }

    let comment_id = Uuid::new_v4();

    let parent = state
        .db
        .save_comment(
            comment_id,
            parent_id,
            target,
            &comment.text,
            &comment.comment_by,
            comment_date_time,
        )
        .map_err(|e| ApiError::internal("adding comment", e))?
        .ok_or_else(|| match target {
            CommentTarget::Question => ApiError::NotFound("Question not found".into()),
            CommentTarget::Answer => ApiError::NotFound("Answer not found".into()),
        })?;

    state.dispatcher.broadcast(PushEvent::CommentUpdate {
        result: parent,
        target,
    });

    Ok(Json(Comment {
        id: comment_id,
        text: comment.text,
        comment_by: comment.comment_by,
        comment_date_time,
    }))
}
