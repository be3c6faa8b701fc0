//! Scheduling tweaks for the transmitting thread.
//!
//! Pulse timing comes from sleeping and spinning on the clock, so keeping the
//! thread on one CPU with a better niceness tightens the pulse widths. Both
//! are best effort.

#[cfg(target_os = "linux")]
fn pin_to_cpu(cpu: usize) -> std::io::Result<()> {
    use std::mem;

    unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);

        if libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }

    Ok(())
}

/// Niceness is per thread on Linux, so this only affects the caller
#[cfg(target_os = "linux")]
fn set_niceness(nice: i32) -> std::io::Result<()> {
    let res = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if res != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn tune_current_thread(cpu: usize, nice: i32) {
    if cpu >= libc::CPU_SETSIZE as usize {
        log::warn!("CPU {} out of range, not pinning", cpu);
    } else if let Err(err) = pin_to_cpu(cpu) {
        log::warn!("Failed to pin to CPU {}: {}", cpu, err);
    } else {
        log::debug!("Pinned to CPU {}", cpu);
    }

    match set_niceness(nice) {
        Ok(()) => log::debug!("Niceness set to {}", nice),
        Err(err) => log::warn!("Failed to set niceness {}: {}", nice, err),
    }
}

#[cfg(not(target_os = "linux"))]
pub fn tune_current_thread(_cpu: usize, _nice: i32) {
    log::debug!("Thread tuning not supported on this platform");
}
