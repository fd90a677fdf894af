// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pinning the measuring thread to one CPU.
//!
//! Migration between cores in the middle of a run shows up as outlier
//! batches, so the driver can pin itself before warm-up.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AffinityError {
    #[error("CPU {cpu} is not in this process's allowed set {allowed:?}")]
    NotAllowed { cpu: usize, allowed: Vec<usize> },

    #[cfg(target_os = "linux")]
    #[error("sched affinity call failed: {0}")]
    Sys(#[from] nix::Error),

    #[error("CPU pinning is not supported on this platform")]
    Unsupported,
}

/// CPUs the calling thread may currently run on.
#[cfg(target_os = "linux")]
pub fn allowed_cpus() -> Result<Vec<usize>, AffinityError> {
    use nix::sched::{sched_getaffinity, CpuSet};
    use nix::unistd::Pid;

    let set = sched_getaffinity(Pid::from_raw(0))?;
    Ok((0..CpuSet::count())
        .filter(|&cpu| set.is_set(cpu).unwrap_or(false))
        .collect())
}

#[cfg(not(target_os = "linux"))]
pub fn allowed_cpus() -> Result<Vec<usize>, AffinityError> {
    Err(AffinityError::Unsupported)
}

/// Restrict the calling thread to `cpu`.
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) -> Result<(), AffinityError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let allowed = allowed_cpus()?;
    if !allowed.contains(&cpu) {
        return Err(AffinityError::NotAllowed { cpu, allowed });
    }

    let mut set = CpuSet::new();
    set.set(cpu)?;
    sched_setaffinity(Pid::from_raw(0), &set)?;

    tracing::debug!(cpu, "pinned measuring thread");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(_cpu: usize) -> Result<(), AffinityError> {
    Err(AffinityError::Unsupported)
}
