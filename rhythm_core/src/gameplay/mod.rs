pub mod judge;
pub mod sinks;
pub mod spawn;

pub use judge::{ActiveEvent, ActiveSet, JudgeCause, JudgeMachine, JudgeWindows, Judgement};
pub use sinks::{
    AccuracySink, ComboSink, HealthSettings, HealthSink, OutcomeSink, ScoreSink, Scoreboard,
};
pub use spawn::SpawnScheduler;
