//! Body groups: interchangeable sub-model selections packed into one integer

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// One body group. The entity's `body` value stores the choice of every group
/// in a mixed-radix number where this group's digit has weight `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BodyPartDesc {
    /// Group name
    pub name: String,
    /// Place value of this group's digit
    pub base: u32,
    /// Number of choices
    pub num_models: u32,
}

impl BodyPartDesc {
    pub fn new<S: Into<String>>(name: S, base: u32, num_models: u32) -> Self {
        Self {
            name: name.into(),
            base,
            num_models,
        }
    }

    /// Current choice within a packed body value
    pub fn current(&self, body: u32) -> u32 {
        if self.base == 0 || self.num_models == 0 {
            return 0;
        }
        (body / self.base) % self.num_models
    }

    /// Replace this group's choice within a packed body value.
    ///
    /// Returns None when `value` is not a valid choice.
    pub fn apply(&self, body: u32, value: u32) -> Option<u32> {
        if value >= self.num_models {
            return None;
        }
        let current = self.current(body);
        Some(body - current * self.base + value * self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_groups() {
        let head = BodyPartDesc::new("head", 1, 3);
        let weapon = BodyPartDesc::new("weapon", 3, 2);

        let body = head.apply(0, 2).unwrap();
        let body = weapon.apply(body, 1).unwrap();
        assert_eq!(body, 5);
        assert_eq!(head.current(body), 2);
        assert_eq!(weapon.current(body), 1);

        let body = head.apply(body, 0).unwrap();
        assert_eq!(body, 3);
        assert_eq!(weapon.current(body), 1);
    }

    #[test]
    fn test_invalid_choice() {
        let head = BodyPartDesc::new("head", 1, 3);
        assert!(head.apply(0, 3).is_none());
    }
}
