//! Ranked views over the lot, built from ordered scans.
//!
//! Rankings are descending and stable, so ties stay in key order.

use super::lot::{LotError, LotResult, ParkingLot};
use super::records::{ParkingSpace, Vehicle};

impl ParkingLot {
    /// Every vehicle in registration-number order.
    pub fn all_vehicles(&self) -> Vec<&Vehicle> {
        self.vehicles.values().collect()
    }

    /// Every space in id order.
    pub fn all_spaces(&self) -> Vec<&ParkingSpace> {
        self.spaces.values().collect()
    }

    /// Vehicles ranked by number of completed parkings.
    pub fn vehicles_by_parkings(&self) -> Vec<&Vehicle> {
        let mut ranked = self.all_vehicles();
        ranked.sort_by(|a, b| b.parkings.cmp(&a.parkings));
        ranked
    }

    /// Vehicles whose total paid lies in `min..=max`, ranked by amount.
    ///
    /// Negative bounds, `min > max`, and NaN bounds are rejected.
    pub fn vehicles_by_amount_in_range(&self, min: f64, max: f64) -> LotResult<Vec<&Vehicle>> {
        if !(0.0 <= min && min <= max) {
            return Err(LotError::InvalidRange { min, max });
        }
        let mut ranked: Vec<&Vehicle> = self
            .vehicles
            .values()
            .filter(|vehicle| (min..=max).contains(&vehicle.amount_paid))
            .collect();
        ranked.sort_by(|a, b| b.amount_paid.total_cmp(&a.amount_paid));
        Ok(ranked)
    }

    /// Spaces ranked by number of completed stays.
    pub fn spaces_by_occupancy(&self) -> Vec<&ParkingSpace> {
        let mut ranked = self.all_spaces();
        ranked.sort_by(|a, b| b.occupancy_count.cmp(&a.occupancy_count));
        ranked
    }

    /// Spaces ranked by revenue collected.
    pub fn spaces_by_revenue(&self) -> Vec<&ParkingSpace> {
        let mut ranked = self.all_spaces();
        ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parking::lot::LotConfig;

    const HOUR: i64 = 3600;

    fn numbers(vehicles: &[&Vehicle]) -> Vec<String> {
        vehicles.iter().map(|v| v.number.clone()).collect()
    }

    fn busy_lot() -> ParkingLot {
        let mut lot = ParkingLot::new(LotConfig::default()).unwrap();
        // C parks twice for 5h, A once for 1h, B once for 4h, D never.
        lot.enter("C", "", 0).unwrap();
        lot.exit("C", 5 * HOUR).unwrap();
        lot.enter("A", "", 0).unwrap();
        lot.enter("B", "", 0).unwrap();
        lot.enter("C", "", 0).unwrap();
        lot.exit("A", HOUR).unwrap();
        lot.exit("B", 4 * HOUR).unwrap();
        lot.exit("C", 5 * HOUR).unwrap();
        lot.enter("D", "", 0).unwrap();
        lot
    }

    #[test]
    fn test_vehicles_by_parkings_keeps_key_order_on_ties() {
        let lot = busy_lot();
        assert_eq!(numbers(&lot.vehicles_by_parkings()), ["C", "A", "B", "D"]);
        assert_eq!(numbers(&lot.all_vehicles()), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_amount_range_is_inclusive() {
        let lot = busy_lot();
        // A paid 100, B 150, C 400, D nothing yet.
        let ranked = lot.vehicles_by_amount_in_range(100.0, 150.0).unwrap();
        assert_eq!(numbers(&ranked), ["B", "A"]);
        let everyone = lot.vehicles_by_amount_in_range(0.0, 1_000.0).unwrap();
        assert_eq!(numbers(&everyone), ["C", "B", "A", "D"]);
        assert!(lot.vehicles_by_amount_in_range(500.0, 600.0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_amount_ranges() {
        let lot = busy_lot();
        for (min, max) in [(-1.0, 10.0), (20.0, 10.0), (f64::NAN, 10.0), (0.0, f64::NAN)] {
            assert!(matches!(
                lot.vehicles_by_amount_in_range(min, max),
                Err(LotError::InvalidRange { .. })
            ));
        }
    }

    #[test]
    fn test_space_rankings() {
        let lot = busy_lot();
        // Space 21 hosted C then A and now holds D; 22 hosted B; 23 hosted C.
        let by_occupancy: Vec<i32> = lot.spaces_by_occupancy().iter().map(|s| s.id).collect();
        assert_eq!(&by_occupancy[..4], &[21, 22, 23, 1]);

        let by_revenue: Vec<i32> = lot.spaces_by_revenue().iter().map(|s| s.id).collect();
        assert_eq!(&by_revenue[..4], &[21, 23, 22, 1]);
        assert_eq!(lot.all_spaces().len(), 50);
    }

    #[test]
    fn test_imported_stats_reorder_space_rankings() {
        let mut lot = busy_lot();
        lot.register_space_stats(40, 9, 50.0).unwrap();
        lot.register_space_stats(2, 0, 2_500.0).unwrap();

        let by_occupancy: Vec<i32> = lot.spaces_by_occupancy().iter().map(|s| s.id).collect();
        assert_eq!(&by_occupancy[..4], &[40, 21, 22, 23]);

        let by_revenue: Vec<i32> = lot.spaces_by_revenue().iter().map(|s| s.id).collect();
        assert_eq!(&by_revenue[..5], &[2, 21, 23, 22, 40]);
    }
}
