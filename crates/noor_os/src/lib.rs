#![forbid(unsafe_code)]

pub mod gate;
pub mod leaderboard;
pub mod notifier;
pub mod onboarding;
pub mod progress;

pub use gate::{GateError, GateOutcome, MemberGate};
pub use leaderboard::{LeaderboardPipeline, LeaderboardView};
pub use notifier::{ChangeBus, Subscription, Topic, PROGRESS_TOPIC};
pub use onboarding::OnboardingFlag;
pub use progress::{ProgressError, ProgressSession};
