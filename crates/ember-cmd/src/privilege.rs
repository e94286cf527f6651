//! # APRIV Control
//!
//! Privileged access for the CP while it runs the switch sequence.

use ember_core::Result;
use ember_pm4::registers::A6XX_CP_MISC_CNTL;
use ember_pm4::{CommandStream, register_write};

use crate::caps::{DeviceCaps, DeviceFeatures};
use crate::sync::{WAIT_FOR_IDLE_WORDS, WAIT_FOR_ME_WORDS, wait_for_idle, wait_for_me};

/// Words written by [`set_apriv`] on targets without [`DeviceFeatures::APRIV`]
pub const APRIV_WORDS: usize = WAIT_FOR_IDLE_WORDS + WAIT_FOR_ME_WORDS + 2;

/// Raise (`raise == true`) or drop privileged access
///
/// Targets with [`DeviceFeatures::APRIV`] handle this in the CP and get
/// nothing; callers must not assume a fixed cost.
pub fn set_apriv(stream: &mut CommandStream<'_>, caps: &DeviceCaps, raise: bool) -> Result<usize> {
    if caps.has_feature(DeviceFeatures::APRIV) {
        return Ok(0);
    }

    stream.reserve(APRIV_WORDS)?;

    let mut count = wait_for_idle(stream)?;
    count += wait_for_me(stream)?;
    count += stream.emit(&[register_write(A6XX_CP_MISC_CNTL, 1), raise as u32])?;

    Ok(count)
}
