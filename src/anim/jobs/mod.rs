mod dilation;
mod highlight;
mod line;
mod pan;
mod physics;
mod reset;
mod wave;

pub use dilation::{DilationJob, DilationMode};
pub use highlight::HighlightJob;
pub use line::{BorderEdge, LineJob, LineJobError, VertexRef};
pub use pan::PanJob;
pub use physics::PhysicsJob;
pub use reset::{ColorResetJob, DisplacementResetJob};
pub use wave::{WaveField, WaveJob, WaveTarget, phase_offset};
