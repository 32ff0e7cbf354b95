mod lloyd;

pub(crate) use lloyd::Lloyd;
pub use lloyd::{LloydSteps, RunStatus, Trajectory};
