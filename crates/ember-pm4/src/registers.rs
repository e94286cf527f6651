//! # A6xx Registers
//!
//! Register dword offsets used by switch sequences. Type-4 packets and
//! `CP_WAIT_REG_MEM` take dword offsets, not byte offsets.

/// CP miscellaneous control; bit 0 grants privileged access (APRIV)
pub const A6XX_CP_MISC_CNTL: u32 = 0x0840;

/// Start clearing performance counter SRAM
pub const A6XX_RBBM_PERFCTR_SRAM_INIT_CMD: u32 = 0xe005;

/// Performance counter SRAM clear status; reads 1 when done
pub const A6XX_RBBM_PERFCTR_SRAM_INIT_STATUS: u32 = 0xe006;

/// Highest register offset a type-4 header can address
pub const TYPE4_MAX_REGISTER: u32 = 0x3ffff;

static_assertions::const_assert!(A6XX_CP_MISC_CNTL <= TYPE4_MAX_REGISTER);
static_assertions::const_assert!(A6XX_RBBM_PERFCTR_SRAM_INIT_CMD <= TYPE4_MAX_REGISTER);
static_assertions::const_assert!(A6XX_RBBM_PERFCTR_SRAM_INIT_STATUS <= TYPE4_MAX_REGISTER);

/// Helper to extract fields from register values
pub const fn extract_field(value: u32, low_bit: u8, high_bit: u8) -> u32 {
    let mask = ((1u32 << (high_bit - low_bit + 1)) - 1) << low_bit;
    (value & mask) >> low_bit
}
