//! Vehicle and parking-space records stored in the lot's indexes.

use std::fmt;

/// Parking space identifier; spaces are numbered from 1.
pub type SpaceId = i32;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Total parked hours at which a vehicle becomes Premium.
pub const PREMIUM_HOURS: f64 = 100.0;

/// Total parked hours at which a vehicle becomes Gold.
pub const GOLD_HOURS: f64 = 200.0;

/// Loyalty tier, derived from accumulated parking hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Membership {
    #[default]
    Standard,
    Premium,
    Gold,
}

impl Membership {
    /// Tier earned by `total_hours` of parking. Recomputed on every exit, so a
    /// vehicle whose hours were corrected downward loses its tier.
    pub fn from_total_hours(total_hours: f64) -> Self {
        if total_hours >= GOLD_HOURS {
            Membership::Gold
        } else if total_hours >= PREMIUM_HOURS {
            Membership::Premium
        } else {
            Membership::Standard
        }
    }

    pub fn has_discount(self) -> bool {
        matches!(self, Membership::Premium | Membership::Gold)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Membership::Standard => "none",
            Membership::Premium => "premium",
            Membership::Gold => "golden",
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered vehicle and its parking history.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub number: String,
    pub owner: String,
    /// Set while parked.
    pub arrival: Option<Timestamp>,
    pub last_departure: Option<Timestamp>,
    pub membership: Membership,
    pub total_hours: f64,
    pub parkings: u32,
    pub amount_paid: f64,
    /// Set while parked.
    pub space: Option<SpaceId>,
}

impl Vehicle {
    pub fn new(number: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            owner: owner.into(),
            arrival: None,
            last_departure: None,
            membership: Membership::Standard,
            total_hours: 0.0,
            parkings: 0,
            amount_paid: 0.0,
            space: None,
        }
    }

    pub fn is_parked(&self) -> bool {
        self.space.is_some()
    }

    /// Recompute the tier from total hours. Returns the previous tier.
    pub fn refresh_membership(&mut self) -> Membership {
        let previous = self.membership;
        self.membership = Membership::from_total_hours(self.total_hours);
        previous
    }

    /// Fill in total hours for an imported record that carries a tier and
    /// history but no hour count, so the tier survives `refresh_membership`.
    pub fn estimate_missing_hours(&mut self) {
        if self.total_hours > 0.1 {
            return;
        }
        let parkings = f64::from(self.parkings);
        self.total_hours = match self.membership {
            Membership::Gold => GOLD_HOURS.max(parkings * 2.0),
            Membership::Premium => PREMIUM_HOURS.max(parkings * 2.0),
            Membership::Standard if self.amount_paid > 100.0 => (self.amount_paid / 60.0).max(1.0),
            Membership::Standard => parkings * 1.5,
        };
    }

    pub(crate) fn park(&mut self, space: SpaceId, now: Timestamp) {
        self.space = Some(space);
        self.arrival = Some(now);
        self.last_departure = None;
    }
}

/// A parking space and its usage totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpace {
    pub id: SpaceId,
    /// Registration number of the parked vehicle.
    pub occupant: Option<String>,
    pub occupancy_count: u32,
    pub revenue: f64,
}

impl ParkingSpace {
    pub fn new(id: SpaceId) -> Self {
        Self {
            id,
            occupant: None,
            occupancy_count: 0,
            revenue: 0.0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Release the space after a stay and credit it with the fee.
    pub(crate) fn vacate(&mut self, fee: f64) {
        self.occupant = None;
        self.occupancy_count += 1;
        self.revenue += fee;
    }
}
