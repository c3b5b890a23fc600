//! Output token budget derived from input size

pub const DEFAULT_MIN_TOKENS: u32 = 100;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TOKEN_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLimits {
    pub min: u32,
    pub max: u32,
    pub multiplier: u32,
}

impl TokenLimits {
    /// `clamp(chars * multiplier, min, max)`. If `min > max`, `max` wins.
    pub fn budget_for(&self, char_count: usize) -> u32 {
        let chars = u32::try_from(char_count).unwrap_or(u32::MAX);
        chars
            .saturating_mul(self.multiplier)
            .max(self.min)
            .min(self.max)
    }
}

impl Default for TokenLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_TOKENS,
            max: DEFAULT_MAX_TOKENS,
            multiplier: DEFAULT_TOKEN_MULTIPLIER,
        }
    }
}
