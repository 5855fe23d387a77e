pub mod conditions;
pub mod context;
pub mod definitions;
pub mod dispatcher;
pub mod duration;
pub mod matcher;
pub mod reconciler;

pub use conditions::Condition;
pub use context::EvaluationContext;
pub use definitions::sync_label_definitions;
pub use dispatcher::{is_bulk_event, BulkSummary, Labeler};
pub use duration::parse_extended_duration;
pub use matcher::{evaluate_clause, find_matches};
pub use reconciler::reconcile;
