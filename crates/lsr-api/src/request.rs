//! Message transport for the browser extension.
//!
//! The extension talks in `{ "type": "...", ... }` messages. Each one maps to a
//! [`Request`] variant and is answered by [`ReviewTracker::handle`].

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use lsr_srs::{Difficulty, ProblemId, ProblemView, Reconciliation, SolvedEvent};

use crate::{
    error::ApiError,
    state::ApiState,
    tracker::{ExportDocument, ReviewPlanView, ReviewTracker, StudyWindowStatus, StudyWindowUpdate},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Request {
    #[serde(rename = "PROBLEM_SOLVED")]
    Solved { data: SolvedEvent },
    #[serde(rename = "MARK_REVIEWED")]
    ConfirmReview { record_id: ProblemId },
    #[serde(rename = "DELETE_PROBLEM")]
    DeleteRecord { record_id: ProblemId },
    #[serde(rename = "CLEAR_ALL_PROBLEMS")]
    ClearAll,
    #[serde(rename = "GET_DAILY_REVIEWS")]
    DueReviews,
    #[serde(rename = "GET_ALL_PROBLEMS")]
    AllProblems {
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },
    #[serde(rename = "GET_REVIEW_PLAN")]
    ReviewPlan { record_id: ProblemId },
    #[serde(rename = "UPDATE_ALL_NEXT_REVIEWS")]
    RescheduleAll,
    #[serde(rename = "EXPORT_DATA")]
    Export,
    #[serde(rename = "GET_STUDY_WINDOW")]
    GetStudyWindow,
    #[serde(rename = "SET_STUDY_WINDOW")]
    SetStudyWindow(StudyWindowUpdate),
    #[serde(rename = "CLEAR_STUDY_WINDOW")]
    ClearStudyWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Solved(Reconciliation),
    Success { success: bool },
    Problems { problems: Vec<ProblemView> },
    Updated { success: bool, updated: usize },
    ReviewPlan { plan: Option<ReviewPlanView> },
    Export(ExportDocument),
    StudyWindow(StudyWindowStatus),
}

impl ReviewTracker {
    /// Dispatch one request.
    pub async fn handle(&self, request: Request) -> Result<Response, ApiError> {
        let response = match request {
            Request::Solved { data } => Response::Solved(self.record_solved(data).await?),
            Request::ConfirmReview { record_id } => Response::Success {
                success: self.confirm_review(&record_id.to_string()).await?,
            },
            Request::DeleteRecord { record_id } => Response::Success {
                success: self.delete(&record_id.to_string()).await?,
            },
            Request::ClearAll => Response::Success {
                success: self.clear_all().await?,
            },
            Request::DueReviews => Response::Problems {
                problems: self.due_reviews().await?,
            },
            Request::AllProblems { difficulty } => Response::Problems {
                problems: self.all_problems(difficulty).await?,
            },
            Request::ReviewPlan { record_id } => Response::ReviewPlan {
                plan: self.review_plan(&record_id.to_string()).await?,
            },
            Request::RescheduleAll => Response::Updated {
                success: true,
                updated: self.reschedule_all().await?,
            },
            Request::Export => Response::Export(self.export().await?),
            Request::GetStudyWindow => Response::StudyWindow(self.study_window_status().await?),
            Request::SetStudyWindow(update) => Response::Updated {
                success: true,
                updated: self.set_study_window(update).await?,
            },
            Request::ClearStudyWindow => Response::Updated {
                success: true,
                updated: self.clear_study_window().await?,
            },
        };

        Ok(response)
    }
}

pub fn routes() -> Router<ApiState> {
    Router::new().route("/messages", post(handle_message))
}

async fn handle_message(
    State(state): State<ApiState>,
    Json(request): Json<Request>,
) -> Result<Json<Response>, ApiError> {
    Ok(Json(state.tracker.handle(request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use lsr_db::MemoryStore;
    use lsr_srs::ReconcileAction;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
    }

    fn parse(value: serde_json::Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_messages() {
        let solved = parse(json!({
            "type": "PROBLEM_SOLVED",
            "data": {
                "id": 1,
                "url": "https://leetcode.com/problems/two-sum/",
                "title": "Two Sum",
                "difficulty": "easy",
                "timeSpent": 120000,
                "submittedAt": 1738400400000_i64
            }
        }));
        let Request::Solved { data } = solved else {
            panic!("expected a solved event");
        };
        assert_eq!(data.id, Some(ProblemId::Number(1)));
        assert_eq!(data.difficulty, Difficulty::Easy);

        assert_eq!(
            parse(json!({ "type": "MARK_REVIEWED", "recordId": "two-sum" })),
            Request::ConfirmReview {
                record_id: ProblemId::Text("two-sum".to_string())
            }
        );
        assert_eq!(
            parse(json!({ "type": "GET_ALL_PROBLEMS" })),
            Request::AllProblems { difficulty: None }
        );
        assert_eq!(
            parse(json!({ "type": "GET_ALL_PROBLEMS", "difficulty": "Hard" })),
            Request::AllProblems {
                difficulty: Some(Difficulty::Hard)
            }
        );
        assert_eq!(
            parse(json!({ "type": "SET_STUDY_WINDOW", "endDate": "2025-03-01" })),
            Request::SetStudyWindow(StudyWindowUpdate {
                end_date: "2025-03-01".to_string(),
                start_date: None,
            })
        );
        assert!(serde_json::from_value::<Request>(json!({ "type": "OPEN_TAB" })).is_err());
    }

    #[tokio::test]
    async fn test_handle_dispatches_each_request() {
        let tracker = ReviewTracker::new(MemoryStore::new()).with_clock(fixed_now);

        let solved = tracker
            .handle(parse(json!({
                "type": "PROBLEM_SOLVED",
                "data": {
                    "id": 1,
                    "url": "https://leetcode.com/problems/two-sum/",
                    "title": "Two Sum",
                    "submittedAt": 1738400400000_i64
                }
            })))
            .await
            .unwrap();
        assert_eq!(
            solved,
            Response::Solved(Reconciliation {
                key: Some("1".to_string()),
                action: ReconcileAction::Created,
            })
        );

        let all = tracker.handle(Request::AllProblems { difficulty: None }).await.unwrap();
        let Response::Problems { problems } = all else {
            panic!("expected a listing");
        };
        assert_eq!(problems.len(), 1);

        let reviewed = tracker
            .handle(Request::ConfirmReview {
                record_id: ProblemId::Number(1),
            })
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(&reviewed).unwrap(), json!({ "success": true }));

        let deleted = tracker
            .handle(Request::DeleteRecord {
                record_id: ProblemId::Number(2),
            })
            .await
            .unwrap();
        assert_eq!(deleted, Response::Success { success: false });

        let export = tracker.handle(Request::Export).await.unwrap();
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["problems"][0]["key"], "1");
        assert_eq!(json["exportDate"], "2025-02-01T09:00:00Z");
    }
}
