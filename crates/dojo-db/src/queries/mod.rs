pub mod badges;
pub mod challenges;
pub mod engagement;
pub mod progress;
pub mod shares;
pub mod submissions;
pub mod use_cases;
pub mod users;

pub use badges::BadgeQueries;
pub use challenges::ChallengeQueries;
pub use engagement::EngagementQueries;
pub use progress::ProgressQueries;
pub use shares::ShareQueries;
pub use submissions::SubmissionQueries;
pub use use_cases::UseCaseQueries;
pub use users::UserQueries;
