use tracing::warn;

use crate::target::{CpuCapabilities, Tier};

/// Environment variable capping the widest tier an executor may select.
pub const MAX_TIER_ENV: &str = "SPARKHASH_MAX_TIER";

/// How 128-bit decimals are turned into bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Decimal128Encoding {
    /// Values that fit in an `i64` hash like a 64-bit decimal; wider values
    /// hash their canonical big-endian image.
    #[default]
    Compact,
    /// Always hash the canonical big-endian image.
    Canonical,
}

/// Knobs that change hash output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HashOptions {
    pub decimal128: Decimal128Encoding,
}

/// What the host hands us when building an executor.
///
/// Only read during construction.
#[derive(Copy, Clone, Debug)]
pub struct ExecutionContext {
    pub capabilities: CpuCapabilities,
    pub max_tier: Tier,
    pub options: HashOptions,
}

impl ExecutionContext {
    pub fn detect() -> Self {
        Self {
            capabilities: CpuCapabilities::detect(),
            max_tier: Tier::Avx512F,
            options: HashOptions::default(),
        }
    }

    /// Like [`ExecutionContext::detect`], honouring `SPARKHASH_MAX_TIER`.
    pub fn from_env() -> Self {
        Self::detect().with_max_tier_from(std::env::var(MAX_TIER_ENV).ok().as_deref())
    }

    /// Caps the tier from a raw setting. Unset or unparseable values leave
    /// the cap unchanged.
    pub fn with_max_tier_from(self, raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return self;
        };
        match raw.parse::<Tier>() {
            Ok(tier) => self.with_max_tier(tier),
            Err(err) => {
                warn!(%raw, %err, "ignoring {MAX_TIER_ENV}");
                self
            }
        }
    }

    pub fn with_capabilities(mut self, capabilities: CpuCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_max_tier(mut self, max_tier: Tier) -> Self {
        self.max_tier = max_tier;
        self
    }

    pub fn with_options(mut self, options: HashOptions) -> Self {
        self.options = options;
        self
    }

    /// Tiers an executor built from this context may register, narrowest first.
    pub fn allowed_tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        Tier::ALL
            .into_iter()
            .filter(|&tier| tier <= self.max_tier && self.capabilities.supports(tier))
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::detect()
    }
}
