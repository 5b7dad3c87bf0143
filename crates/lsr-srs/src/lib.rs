//! Spaced repetition core for tracking solved coding problems.
//!
//! This crate holds the pure logic of the review tracker: when a problem is
//! next due ([`compute_next_review`]), and how a "problem solved" event is
//! merged into the stored records ([`reconcile`]). It performs no I/O and
//! keeps no state; record sets go in by value and come back out.

mod listing;
mod normalize;
mod reconcile;
mod record;
mod schedule;

pub use listing::{ProblemView, all_problems, due_reviews};
pub use normalize::{normalize_title, normalize_url};
pub use reconcile::{
    Applied, ReconcileAction, Reconciliation, backfill_next_reviews, confirm_review,
    delete_record, find_matching_key, reconcile, reschedule_all,
};
pub use record::{Difficulty, ProblemId, ProblemRecord, RecordSet, SolvedEvent};
pub use schedule::{
    MS_PER_DAY, REVIEW_LADDER_DAYS, ReviewPlan, StudyWindow, bounded_next_review,
    compute_next_review, ladder_interval_days, midnight, segment_count, unbounded_next_review,
};
