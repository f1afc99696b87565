//! Utility functions and types

pub mod data_loader;

pub use data_loader::{DataLoader, DataSaver};

/// Round to two decimal places, the precision prices are displayed with
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(-0.004), -0.0);
        assert_eq!(round2(10.0), 10.0);
    }
}
