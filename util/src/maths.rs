//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Map a value in the range [-pi, pi] to [0, 2pi]
pub fn map_pi_to_2pi<T>(value: T) -> T 
where
    T: Float
{
    // acos(-1) is pi for any float type
    let tau_t: T = (T::one() + T::one()) * (-T::one()).acos();

    if value < T::zero() {
        tau_t + value
    }
    else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 10.0), (0.0, 1.0), 5.0), 0.5);
        assert_eq!(lin_map((0.0, 4.0), (2.0, -2.0), 1.0), 1.0);
        assert_eq!(lin_map((1.0f32, 2.0), (10.0, 20.0), 2.0), 20.0);
    }

    #[test]
    fn test_map_pi_to_2pi() {
        const PI: f64 = std::f64::consts::PI;

        assert_eq!(map_pi_to_2pi(0.0), 0.0);
        assert_eq!(map_pi_to_2pi(PI), PI);
        assert_eq!(map_pi_to_2pi(-PI / 2.0), 1.5 * PI);
    }
}
