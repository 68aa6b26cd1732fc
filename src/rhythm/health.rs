//! Health ("insulin level") model: damage on MISS / WRONG_KEY, clamped to `0..=100`.

pub const MAX_HEALTH: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    value: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self { value: MAX_HEALTH }
    }
}

impl Health {
    pub fn value(self) -> u32 {
        self.value
    }

    pub fn is_depleted(self) -> bool {
        self.value == 0
    }

    /// Fill ratio for the health bar.
    pub fn fraction(self) -> f64 {
        self.value as f64 / MAX_HEALTH as f64
    }

    /// Subtract `amount`, saturating at zero. Returns true when health is now 0.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.value = self.value.saturating_sub(amount);
        self.is_depleted()
    }

    pub fn reset(&mut self) {
        self.value = MAX_HEALTH;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut h = Health::default();
        assert!(!h.apply_damage(18));
        assert_eq!(h.value(), 82);
        for _ in 0..4 {
            h.apply_damage(18);
        }
        assert_eq!(h.value(), 10);
        assert!(h.apply_damage(18));
        assert_eq!(h.value(), 0);
        assert!(h.apply_damage(u32::MAX));
        assert_eq!(h.value(), 0);
    }

    #[test]
    fn test_zero_damage_and_reset() {
        let mut h = Health::default();
        assert!(!h.apply_damage(0));
        assert_eq!(h.value(), MAX_HEALTH);
        h.apply_damage(55);
        assert!((h.fraction() - 0.45).abs() < 1e-9);
        h.reset();
        assert_eq!(h.value(), MAX_HEALTH);
    }
}
