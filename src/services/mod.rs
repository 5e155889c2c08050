pub mod admission;
pub mod dispatcher;
pub mod feedback;
pub mod initializer;
pub mod instruction_engine;
pub mod instruction_parser;
pub mod jobs;
pub mod membership;
pub mod scheduler;
pub mod sync_engine;
pub mod sync_planner;
pub mod throttle;

pub use admission::AdmissionGate;
pub use dispatcher::{DispatchSummary, MutationDispatcher};
pub use feedback::FeedbackContext;
pub use initializer::{InitReport, Initializer};
pub use instruction_engine::{CommentReport, InstructionEngine, InstructionOutcome};
pub use instruction_parser::{parse_instructions, ParsedInstruction};
pub use jobs::{JobReport, JobRunner};
pub use membership::MembershipCache;
pub use scheduler::DailyScheduler;
pub use sync_engine::{SyncEngine, SyncReport};
pub use sync_planner::{SyncPlan, SyncPlanner};
pub use throttle::DispatchThrottle;
