// math/trig.rs — table-driven sine/cosine for periodic samplers
//
// The table stores one quarter turn of sine as f32 bit patterns. Every other
// angle is reconstructed with two identities:
//
//   sin(-x) = -sin(x)      → the upper half turn flips the f32 sign bit
//   sin(x)  = sin(π - x)   → the second quarter mirrors into the first
//
// Both folds are branch-free bit math on a 16-bit turn index. The library
// works in f64 everywhere else; the table is f32 so it stays cache resident.
//
// The table is built lazily on first use and validated against `f64::sin`
// before anything can read it. A table that fails validation is fatal.

use crate::error::LutError;
use crate::math;
use rand::Rng;
use std::sync::OnceLock;

/// π as the closest `f64`.
pub const PI: f64 = std::f64::consts::PI;

/// The next representable `f64` above [`PI`].
pub const PI_SUP: f64 = f64::from_bits(PI.to_bits() + 1);

/// τ = 2π as the closest `f64`.
pub const TAU: f64 = std::f64::consts::TAU;

/// The next representable `f64` above [`TAU`].
pub const TAU_SUP: f64 = f64::from_bits(TAU.to_bits() + 1);

// ── Table geometry ──────────────────────────────────────────────────

const LOOKUP_BITS: u32 = 14;

/// Steps per quarter turn. The table holds `LOOKUP_TABLE_SIZE + 1` entries so
/// that π/2 itself has a slot.
pub const LOOKUP_TABLE_SIZE: usize = 1 << LOOKUP_BITS;

const TABLE_LEN: usize = LOOKUP_TABLE_SIZE + 1;

/// Steps per full turn of the 16-bit index space.
const STEPS_PER_TURN: usize = LOOKUP_TABLE_SIZE << 2;

const RADIAN_TO_INDEX: f64 = STEPS_PER_TURN as f64 / TAU;

const INDEX_MASK: i64 = (STEPS_PER_TURN - 1) as i64;

// Bit 15 of the index: angle in [π, 2π).
const HALF_TURN_BIT: i32 = (STEPS_PER_TURN >> 1) as i32;

const QUARTER_SHIFT: u32 = 31 - LOOKUP_BITS;

// ── Validation parameters ───────────────────────────────────────────

const VALIDATION_PROBES: usize = TABLE_LEN;
const VALIDATION_TOLERANCE: f64 = 0.001;

/// Exact sine at the four cardinal directions, in degrees.
const CARDINALS: [(u32, f64); 4] = [(0, 0.0), (90, 1.0), (180, 0.0), (270, -1.0)];

// ── SinTable ────────────────────────────────────────────────────────

/// Quarter-wave sine table.
pub struct SinTable {
    bits: Box<[u32]>,
}

impl SinTable {
    /// Generate the table and patch the cardinal slots. Not yet validated.
    fn generate() -> Self {
        let step = (TAU / 4.0) / LOOKUP_TABLE_SIZE as f64;
        let mut bits: Vec<u32> = (0..TABLE_LEN)
            .map(|i| ((i as f64 * step).sin() as f32).to_bits())
            .collect();

        // Axis-aligned angles are the most common queries; store them exactly.
        for &(degrees, exact) in &CARDINALS {
            let slot = fold(turn_index((degrees as f64).to_radians()));
            bits[slot] = (exact.abs() as f32).to_bits();
        }

        SinTable {
            bits: bits.into_boxed_slice(),
        }
    }

    /// Generate and validate a fresh table.
    pub fn build() -> Result<Self, LutError> {
        let table = Self::generate();
        table.validate(&mut rand::thread_rng())?;
        Ok(table)
    }

    /// Compare the table against `f64::sin` on random angles in `[-1, 1]`
    /// and on the four cardinal directions.
    pub fn validate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(), LutError> {
        for _ in 0..VALIDATION_PROBES {
            let angle: f64 = rng.gen_range(-1.0..=1.0);
            let expected = angle.sin();
            let found = self.sin(angle);
            if !math::equals_eps(expected, found, VALIDATION_TOLERANCE) {
                return Err(LutError::Mismatch {
                    angle,
                    expected,
                    found,
                });
            }
        }

        for &(degrees, expected) in &CARDINALS {
            let found = self.sin((degrees as f64).to_radians());
            if found != expected {
                return Err(LutError::Cardinal {
                    degrees,
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }

    /// Number of stored entries (`2^14 + 1`).
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline(always)]
    pub fn sin(&self, angle: f64) -> f64 {
        let index = turn_index(angle);
        // sin(-x) = -sin(x): the upper half turn sets the f32 sign bit
        let neg = ((index & HALF_TURN_BIT) as u32) << 16;
        f32::from_bits(self.bits[fold(index)] ^ neg) as f64
    }

    #[inline(always)]
    pub fn cos(&self, angle: f64) -> f64 {
        self.sin(angle + TAU / 4.0)
    }
}

/// Angle in radians → 16-bit turn index, rounded to the nearest step.
#[inline(always)]
fn turn_index(angle: f64) -> i32 {
    (math::floor(angle * RADIAN_TO_INDEX + 0.5) & INDEX_MASK) as i32
}

/// Fold a turn index into a quarter-table slot in `0..=LOOKUP_TABLE_SIZE`.
#[inline(always)]
fn fold(index: i32) -> usize {
    // All ones if the angle lies in the second or fourth quarter
    let mask = (index << QUARTER_SHIFT) >> 31;
    // sin(x) = sin(π - x): mirror the index when the mask is set
    let pos = ((HALF_TURN_BIT | 1) & mask) + (index ^ mask);
    (pos & (HALF_TURN_BIT - 1)) as usize
}

// ── Process-wide table ──────────────────────────────────────────────

static SIN_TABLE: OnceLock<SinTable> = OnceLock::new();

/// Build and validate the shared table now, reporting failure instead of
/// panicking. Hosts call this at startup; later calls are free.
pub fn init() -> Result<(), LutError> {
    if SIN_TABLE.get().is_some() {
        return Ok(());
    }
    let table = SinTable::build()?;
    log::debug!("sine table built and validated ({} entries)", table.len());
    // A concurrent initializer may win the race; both tables passed validation.
    let _ = SIN_TABLE.set(table);
    Ok(())
}

/// The shared table, built on first use.
///
/// # Panics
///
/// Panics if the freshly built table fails validation. No periodic sampler
/// can produce correct output in that state.
pub fn table() -> &'static SinTable {
    SIN_TABLE.get_or_init(|| match SinTable::build() {
        Ok(table) => {
            log::debug!("sine table built and validated ({} entries)", table.len());
            table
        }
        Err(err) => {
            log::error!("sine table failed validation: {err}");
            panic!("sine table failed validation: {err}");
        }
    })
}

/// Table-driven sine, within 0.001 of `f64::sin` and exact at the cardinals.
#[inline]
pub fn sin(angle: f64) -> f64 {
    table().sin(angle)
}

/// Table-driven cosine via a quarter-turn phase shift.
#[inline]
pub fn cos(angle: f64) -> f64 {
    table().cos(angle)
}

// ── Tests ───────────────────────────────────────────────────────────
