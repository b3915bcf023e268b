//! Frame-driven animation: the scheduler, the job lifecycle and the jobs
//! themselves.

mod animator;
mod clock;
pub mod easing;
mod job;
pub mod jobs;
mod surface;

pub use animator::Animator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use job::{AnimationJob, Job, JobEvent, JobId, JobKey, JobKind};
pub use surface::{NullSurface, RecordingSurface, RenderSurface};
