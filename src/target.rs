//! Instruction-set tiers and the one-shot kernel selector.
//!
//! Every tier runs the same generic kernel body, compiled with a different
//! `#[target_feature]` set so the compiler may vectorize the per-row loops
//! more aggressively. Output is identical across tiers; the choice only
//! affects speed. The probe runs once per process and the selection once
//! per executor, so batches pay a single indirect call and no matching.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

use crate::algorithm::HashAlgorithm;
use crate::column::ColumnWithType;
use crate::context::{ExecutionContext, HashOptions};
use crate::error::Result;
use crate::executor::execute_arguments;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Whatever the crate was compiled for. Always available.
    Default,
    /// x86_64 with AVX2.
    Avx2,
    /// x86_64 with AVX-512 Foundation.
    Avx512F,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Default, Tier::Avx2, Tier::Avx512F];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Default => "default",
            Tier::Avx2 => "avx2",
            Tier::Avx512F => "avx512f",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown target tier '{0}', expected one of default, avx2, avx512f")]
pub struct ParseTierError(String);

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "baseline" => Ok(Tier::Default),
            "avx2" => Ok(Tier::Avx2),
            "avx512f" | "avx512" => Ok(Tier::Avx512F),
            _ => Err(ParseTierError(s.to_owned())),
        }
    }
}

/// Instruction-set extensions usable on this machine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuCapabilities {
    pub avx2: bool,
    pub avx512f: bool,
}

impl CpuCapabilities {
    /// No extensions at all.
    pub const fn baseline() -> Self {
        Self {
            avx2: false,
            avx512f: false,
        }
    }

    /// Probes the running CPU. The probe itself runs once per process.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<CpuCapabilities> = OnceLock::new();
        *DETECTED.get_or_init(Self::probe)
    }

    #[cfg(target_arch = "x86_64")]
    fn probe() -> Self {
        Self {
            avx2: is_x86_feature_detected!("avx2"),
            avx512f: is_x86_feature_detected!("avx512f"),
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn probe() -> Self {
        Self::baseline()
    }

    pub fn supports(&self, tier: Tier) -> bool {
        match tier {
            Tier::Default => true,
            Tier::Avx2 => self.avx2,
            Tier::Avx512F => self.avx512f,
        }
    }
}

/// Kernel entry point of one tier.
///
/// # Safety
/// The CPU must support the tier the pointer was registered for.
pub(crate) type KernelFn<H> = unsafe fn(
    &[ColumnWithType],
    &HashOptions,
    &mut [<H as HashAlgorithm>::Output],
) -> Result<()>;

fn kernel_default<H: HashAlgorithm>(
    arguments: &[ColumnWithType],
    options: &HashOptions,
    vec_to: &mut [H::Output],
) -> Result<()> {
    execute_arguments::<H>(arguments, options, vec_to)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn kernel_avx2<H: HashAlgorithm>(
    arguments: &[ColumnWithType],
    options: &HashOptions,
    vec_to: &mut [H::Output],
) -> Result<()> {
    execute_arguments::<H>(arguments, options, vec_to)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f")]
unsafe fn kernel_avx512f<H: HashAlgorithm>(
    arguments: &[ColumnWithType],
    options: &HashOptions,
    vec_to: &mut [H::Output],
) -> Result<()> {
    execute_arguments::<H>(arguments, options, vec_to)
}

fn kernel_for<H: HashAlgorithm>(tier: Tier) -> Option<KernelFn<H>> {
    match tier {
        Tier::Default => Some(kernel_default::<H> as KernelFn<H>),
        #[cfg(target_arch = "x86_64")]
        Tier::Avx2 => Some(kernel_avx2::<H> as KernelFn<H>),
        #[cfg(target_arch = "x86_64")]
        Tier::Avx512F => Some(kernel_avx512f::<H> as KernelFn<H>),
        #[cfg(not(target_arch = "x86_64"))]
        Tier::Avx2 | Tier::Avx512F => None,
    }
}

/// Per-executor variant table, fixed at construction.
pub struct ImplementationSelector<H: HashAlgorithm> {
    registered: Vec<Tier>,
    selected: Tier,
    kernel: KernelFn<H>,
}

impl<H: HashAlgorithm> ImplementationSelector<H> {
    pub fn new(context: &ExecutionContext) -> Self {
        // The context may narrow what the CPU offers, never widen it.
        let cpu = CpuCapabilities::detect();

        let mut registered = vec![Tier::Default];
        let mut selected = Tier::Default;
        let mut kernel = kernel_default::<H> as KernelFn<H>;

        for tier in context.allowed_tiers() {
            if tier == Tier::Default || !cpu.supports(tier) {
                continue;
            }
            if let Some(candidate) = kernel_for::<H>(tier) {
                registered.push(tier);
                selected = tier;
                kernel = candidate;
            }
        }

        debug!(
            function = H::NAME,
            tier = %selected,
            registered = ?registered,
            "selected hash kernel"
        );

        Self {
            registered,
            selected,
            kernel,
        }
    }

    pub fn selected(&self) -> Tier {
        self.selected
    }

    pub fn registered(&self) -> &[Tier] {
        &self.registered
    }

    #[inline]
    pub(crate) fn execute(
        &self,
        arguments: &[ColumnWithType],
        options: &HashOptions,
        vec_to: &mut [H::Output],
    ) -> Result<()> {
        // SAFETY: only tiers the running CPU reported are ever selected.
        unsafe { (self.kernel)(arguments, options, vec_to) }
    }
}

impl<H: HashAlgorithm> fmt::Debug for ImplementationSelector<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationSelector")
            .field("function", &H::NAME)
            .field("registered", &self.registered)
            .field("selected", &self.selected)
            .finish()
    }
}
