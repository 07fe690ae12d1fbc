#![deny(unsafe_code)]

use std::fmt;

/// Survey unit identifier (`idno`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct UnitId(i64);

impl UnitId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UnitId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ids_order_numerically() {
        assert!(UnitId::new(9) < UnitId::new(10));
        assert_eq!(UnitId::from(42).to_string(), "42");
    }
}
