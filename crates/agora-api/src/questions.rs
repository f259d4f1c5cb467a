use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::error;
use uuid::Uuid;

use agora_db::VoteKind;
use agora_types::api::{
    AddQuestionRequest, QuestionOrder, QuestionQuery, ViewQuery, VoteRequest, VoteResponse,
};
use agora_types::events::PushEvent;
use agora_types::models::Question;

use crate::AppState;
use crate::error::ApiError;

/// POST /question/addQuestion
pub async fn add_question(
    State(state): State<AppState>,
    Json(req): Json<AddQuestionRequest>,
) -> Result<Json<Question>, ApiError> {
    let Some(ask_date_time) = req.ask_date_time else {
        return Err(ApiError::BadRequest("Invalid question body".into()));
    };
    if req.title.is_empty() || req.text.is_empty() || req.tags.is_empty() || req.asked_by.is_empty()
    {
        return Err(ApiError::BadRequest("Invalid question body".into()));
    }

    let id = Uuid::new_v4();

    let db = state.clone();
    let saved = tokio::task::spawn_blocking(move || {
        db.db
            .save_question(id, &req.title, &req.text, &req.tags, &req.asked_by, ask_date_time)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Error when saving question: task failed".into())
    })?
    .map_err(|e| ApiError::internal("saving question", e))?;

    state
        .dispatcher
        .broadcast(PushEvent::QuestionUpdate(saved.clone()));

    Ok(Json(saved))
}

/// GET /question/getQuestion
pub async fn get_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let db = state.clone();
    let questions = tokio::task::spawn_blocking(move || db.db.get_questions())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("Error when fetching questions: task failed".into())
        })?
        .map_err(|e| ApiError::internal("fetching questions", e))?;

    let mut questions = order_questions(questions, query.order);
    if let Some(asked_by) = &query.asked_by {
        questions.retain(|q| &q.asked_by == asked_by);
    }
    if let Some(search) = &query.search {
        if !search.trim().is_empty() {
            questions.retain(|q| matches_search(q, search));
        }
    }

    Ok(Json(questions))
}

/// GET /question/getQuestionById/{qid}
///
/// Fetching a question records the requesting username in its viewer list,
/// then fans the updated question out to all clients.
pub async fn get_question_by_id(
    State(state): State<AppState>,
    Path(qid): Path<Uuid>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Question>, ApiError> {
    let Some(username) = query.username.filter(|u| !u.is_empty()) else {
        return Err(ApiError::BadRequest(
            "Invalid username requesting question.".into(),
        ));
    };

    let db = state.clone();
    let question =
        tokio::task::spawn_blocking(move || db.db.add_view_to_question(qid, &username))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal("Error when fetching question by id: task failed".into())
            })?
            .map_err(|e| ApiError::internal("fetching question by id", e))?
            .ok_or_else(|| ApiError::NotFound("Question not found".into()))?;

    state
        .dispatcher
        .broadcast(PushEvent::ViewsUpdate(question.clone()));

    Ok(Json(question))
}

/// POST /question/upvoteQuestion
pub async fn upvote_question(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    vote(state, req, VoteKind::Up).await
}

/// POST /question/downvoteQuestion
pub async fn downvote_question(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    vote(state, req, VoteKind::Down).await
}

async fn vote(
    state: AppState,
    req: VoteRequest,
    kind: VoteKind,
) -> Result<Json<VoteResponse>, ApiError> {
    let Some(qid) = req.qid else {
        return Err(ApiError::BadRequest("Invalid request".into()));
    };
    if req.username.is_empty() {
        return Err(ApiError::BadRequest("Invalid request".into()));
    }

    let (added, up_votes, down_votes) = state
        .db
        .add_vote_to_question(qid, &req.username, kind)
        .map_err(|e| ApiError::internal("voting on question", e))?
        .ok_or_else(|| ApiError::NotFound("Question not found".into()))?;

    let msg = match (kind, added) {
        (VoteKind::Up, true) => "Question upvoted successfully",
        (VoteKind::Up, false) => "Upvote cancelled successfully",
        (VoteKind::Down, true) => "Question downvoted successfully",
        (VoteKind::Down, false) => "Downvote cancelled successfully",
    };

    state.dispatcher.broadcast(PushEvent::VoteUpdate {
        qid,
        up_votes: up_votes.clone(),
        down_votes: down_votes.clone(),
    });

    Ok(Json(VoteResponse {
        msg: msg.to_string(),
        up_votes,
        down_votes,
    }))
}

/// Apply a listing order. The incoming list is newest-first.
fn order_questions(mut questions: Vec<Question>, order: QuestionOrder) -> Vec<Question> {
    match order {
        QuestionOrder::Newest => questions,
        QuestionOrder::Unanswered => {
            questions.retain(|q| q.answers.is_empty());
            questions
        }
        QuestionOrder::Active => {
            // Most recently answered first; never-answered questions keep
            // their newest-first order at the tail (stable sort).
            questions.sort_by_key(|q| {
                std::cmp::Reverse(q.answers.iter().map(|a| a.ans_date_time).max())
            });
            questions
        }
        QuestionOrder::MostViewed => {
            questions.sort_by_key(|q| std::cmp::Reverse(q.views.len()));
            questions
        }
    }
}

/// A question matches when any bare keyword appears in its title or text,
/// or any `[tag]` token names one of its tags.
fn matches_search(question: &Question, search: &str) -> bool {
    let (tags, keywords) = parse_search(search);
    if tags.is_empty() && keywords.is_empty() {
        return true;
    }

    let haystack = format!("{} {}", question.title, question.text).to_lowercase();
    let keyword_hit = keywords
        .iter()
        .any(|k| haystack.contains(&k.to_lowercase()));
    let tag_hit = tags
        .iter()
        .any(|t| question.tags.iter().any(|qt| qt.name.eq_ignore_ascii_case(t)));

    keyword_hit || tag_hit
}

/// Split a search string into `[tag]` tokens and bare keywords.
fn parse_search(search: &str) -> (Vec<String>, Vec<String>) {
    let mut tags = Vec::new();
    let mut keywords = Vec::new();

    for token in search.split_whitespace() {
        if let Some(tag) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            if !tag.is_empty() {
                tags.push(tag.to_string());
            }
        } else {
            keywords.push(token.to_string());
        }
    }

    (tags, keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::models::{Answer, Tag};
    use chrono::{TimeZone, Utc};

    fn question(title: &str, tag_names: &[&str], asked_secs: i64) -> Question {
        Question {
            id: Uuid::new_v4(),
            title: title.to_string(),
            text: "body text".to_string(),
            tags: tag_names
                .iter()
                .map(|name| Tag {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                })
                .collect(),
            asked_by: "ada".to_string(),
            ask_date_time: Utc.timestamp_opt(asked_secs, 0).unwrap(),
            answers: vec![],
            views: vec![],
            up_votes: vec![],
            down_votes: vec![],
            comments: vec![],
        }
    }

    fn answer(secs: i64) -> Answer {
        Answer {
            id: Uuid::new_v4(),
            text: "a".to_string(),
            ans_by: "grace".to_string(),
            ans_date_time: Utc.timestamp_opt(secs, 0).unwrap(),
            comments: vec![],
        }
    }

    #[test]
    fn parse_search_separates_tags_from_keywords() {
        let (tags, keywords) = parse_search("async [rust] lifetimes [tokio]");
        assert_eq!(tags, vec!["rust", "tokio"]);
        assert_eq!(keywords, vec!["async", "lifetimes"]);
    }

    #[test]
    fn search_matches_keyword_or_tag() {
        let q = question("Borrow checker woes", &["rust"], 1);

        assert!(matches_search(&q, "borrow"));
        assert!(matches_search(&q, "[rust]"));
        assert!(matches_search(&q, "unrelated [rust]"));
        assert!(!matches_search(&q, "python [django]"));
    }

    #[test]
    fn unanswered_keeps_only_answerless_questions() {
        let mut answered = question("answered", &["t"], 2);
        answered.answers.push(answer(10));
        let open = question("open", &["t"], 1);

        let ordered = order_questions(vec![answered, open], QuestionOrder::Unanswered);
        let titles: Vec<&str> = ordered.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, vec!["open"]);
    }

    #[test]
    fn active_orders_by_latest_answer() {
        let mut stale = question("stale", &["t"], 3);
        stale.answers.push(answer(10));
        let mut fresh = question("fresh", &["t"], 1);
        fresh.answers.push(answer(100));
        let silent = question("silent", &["t"], 2);

        let ordered = order_questions(vec![stale, fresh, silent], QuestionOrder::Active);
        let titles: Vec<&str> = ordered.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, vec!["fresh", "stale", "silent"]);
    }

    #[test]
    fn most_viewed_orders_by_view_count() {
        let mut popular = question("popular", &["t"], 1);
        popular.views = vec!["a".into(), "b".into()];
        let quiet = question("quiet", &["t"], 2);

        let ordered = order_questions(vec![quiet, popular], QuestionOrder::MostViewed);
        let titles: Vec<&str> = ordered.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, vec!["popular", "quiet"]);
    }
}
