//! Execution backend selection.

use serde::{Deserialize, Serialize};

/// Where the statevector kernels run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    /// Single-threaded kernels.
    #[default]
    Cpu,
    /// Rayon-parallel single-qubit kernels; multi-qubit gates stay serial.
    CpuParallel,
    /// Reserved for an external accelerator. Not available in this build.
    Accelerator,
}

impl Backend {
    /// Whether this build can run on the given backend.
    pub fn is_available(self) -> bool {
        !matches!(self, Backend::Accelerator)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Cpu => write!(f, "cpu"),
            Backend::CpuParallel => write!(f, "cpu-parallel"),
            Backend::Accelerator => write!(f, "accelerator"),
        }
    }
}
