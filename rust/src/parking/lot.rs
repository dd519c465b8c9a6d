//! The parking lot: a vehicle index and a space index driven by entry and
//! exit events.
//!
//! Only insert, point lookup, and ordered scan are used; records are updated
//! in place and never removed.

use std::error::Error;
use std::fmt;

use super::fees::{hours_between, parking_fee};
use super::records::{Membership, ParkingSpace, SpaceId, Timestamp, Vehicle};
use crate::construction::DEFAULT_BRANCHING_FACTOR;
use crate::error::IndexError;
use crate::types::BPlusIndex;

/// Number of spaces in a default lot.
pub const DEFAULT_TOTAL_SPACES: SpaceId = 50;

/// Owner recorded for a new vehicle whose owner name is blank.
pub const UNKNOWN_OWNER: &str = "Unknown";

/// Lot layout. Spaces below `premium_first_space` are kept for Gold members
/// and spaces below `general_first_space` for Gold and Premium members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotConfig {
    pub total_spaces: SpaceId,
    pub branching_factor: usize,
    pub premium_first_space: SpaceId,
    pub general_first_space: SpaceId,
}

impl LotConfig {
    pub fn validate(&self) -> LotResult<()> {
        if self.total_spaces < 1 {
            return Err(LotError::InvalidConfig(format!(
                "total_spaces must be at least 1, got {}",
                self.total_spaces
            )));
        }
        let ordered = 1 <= self.premium_first_space
            && self.premium_first_space <= self.general_first_space
            && self.general_first_space <= self.total_spaces;
        if !ordered {
            return Err(LotError::InvalidConfig(format!(
                "tier boundaries must satisfy 1 <= {} <= {} <= {}",
                self.premium_first_space, self.general_first_space, self.total_spaces
            )));
        }
        Ok(())
    }
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            total_spaces: DEFAULT_TOTAL_SPACES,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            premium_first_space: 11,
            general_first_space: 21,
        }
    }
}

/// Errors raised by lot operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LotError {
    /// The underlying index refused the operation.
    Index(IndexError),
    InvalidConfig(String),
    UnknownVehicle(String),
    AlreadyParked { number: String, space: SpaceId },
    NotParked(String),
    NoSpaceAvailable { membership: Membership },
    UnknownSpace(SpaceId),
    SpaceOccupied { space: SpaceId, occupant: String },
    InvalidRange { min: f64, max: f64 },
    InconsistentRecord(String),
}

impl fmt::Display for LotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotError::Index(e) => write!(f, "Index error: {}", e),
            LotError::InvalidConfig(msg) => write!(f, "Invalid lot configuration: {}", msg),
            LotError::UnknownVehicle(number) => write!(f, "Vehicle {} not found", number),
            LotError::AlreadyParked { number, space } => {
                write!(f, "Vehicle {} is already parked in space {}", number, space)
            }
            LotError::NotParked(number) => write!(f, "Vehicle {} is not currently parked", number),
            LotError::NoSpaceAvailable { membership } => {
                write!(f, "No space available for membership '{}'", membership)
            }
            LotError::UnknownSpace(space) => write!(f, "Space {} not found", space),
            LotError::SpaceOccupied { space, occupant } => {
                write!(f, "Space {} is occupied by {}", space, occupant)
            }
            LotError::InvalidRange { min, max } => {
                write!(f, "Invalid amount range {:.2}..={:.2}", min, max)
            }
            LotError::InconsistentRecord(msg) => write!(f, "Inconsistent record: {}", msg),
        }
    }
}

impl Error for LotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LotError::Index(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IndexError> for LotError {
    fn from(e: IndexError) -> Self {
        LotError::Index(e)
    }
}

pub type LotResult<T> = Result<T, LotError>;

/// Summary of a completed stay.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitReceipt {
    pub number: String,
    pub owner: String,
    pub space: SpaceId,
    pub arrival: Timestamp,
    pub departure: Timestamp,
    pub hours: f64,
    pub fee: f64,
    pub previous_membership: Membership,
    pub membership: Membership,
}

impl ExitReceipt {
    pub fn membership_changed(&self) -> bool {
        self.previous_membership != self.membership
    }
}

/// Vehicles keyed by registration number and spaces keyed by id.
#[derive(Debug)]
pub struct ParkingLot {
    config: LotConfig,
    pub(super) vehicles: BPlusIndex<String, Vehicle>,
    pub(super) spaces: BPlusIndex<SpaceId, ParkingSpace>,
}

impl ParkingLot {
    /// Build a lot with every space `1..=total_spaces` free.
    pub fn new(config: LotConfig) -> LotResult<Self> {
        config.validate()?;
        let vehicles = BPlusIndex::new(config.branching_factor)?;
        let mut spaces = BPlusIndex::new(config.branching_factor)?;
        for id in 1..=config.total_spaces {
            spaces.insert(id, ParkingSpace::new(id))?;
        }
        tracing::debug!(
            spaces = config.total_spaces,
            branching_factor = config.branching_factor,
            "parking lot ready"
        );
        Ok(Self {
            config,
            vehicles,
            spaces,
        })
    }

    pub fn with_default_config() -> LotResult<Self> {
        Self::new(LotConfig::default())
    }

    pub fn config(&self) -> &LotConfig {
        &self.config
    }

    pub fn vehicles(&self) -> &BPlusIndex<String, Vehicle> {
        &self.vehicles
    }

    pub fn spaces(&self) -> &BPlusIndex<SpaceId, ParkingSpace> {
        &self.spaces
    }

    pub fn vehicle(&self, number: &str) -> Option<&Vehicle> {
        self.vehicles.get(&number.to_string())
    }

    pub fn space(&self, id: SpaceId) -> Option<&ParkingSpace> {
        self.spaces.get(&id)
    }

    pub fn occupied_count(&self) -> usize {
        self.spaces.values().filter(|space| !space.is_free()).count()
    }

    /// Lowest free space in `start..=end`, scanning the leaf chain and
    /// stopping once ids pass `end`.
    fn first_free_in(&self, start: SpaceId, end: SpaceId) -> Option<SpaceId> {
        self.spaces
            .items()
            .skip_while(|(id, _)| **id < start)
            .take_while(|(id, _)| **id <= end)
            .find(|(_, space)| space.is_free())
            .map(|(id, _)| *id)
    }

    /// Pick a space for a vehicle of the given tier.
    ///
    /// Gold members may use any space, Premium members start at
    /// `premium_first_space`, and everyone else at `general_first_space`.
    /// Each tier falls back to the next one's range.
    pub fn find_available_space(&self, membership: Membership) -> Option<SpaceId> {
        let last = self.config.total_spaces;
        let mut found = None;
        if membership == Membership::Gold {
            found = self.first_free_in(1, last);
        }
        if found.is_none() && membership.has_discount() {
            found = self.first_free_in(self.config.premium_first_space, last);
        }
        if found.is_none() {
            found = self.first_free_in(self.config.general_first_space, last);
        }
        tracing::debug!(%membership, ?found, "space search");
        found
    }

    fn occupy(&mut self, id: SpaceId, number: &str) -> LotResult<()> {
        let space = self.spaces.get_mut(&id).ok_or(LotError::UnknownSpace(id))?;
        if let Some(occupant) = &space.occupant {
            return Err(LotError::SpaceOccupied {
                space: id,
                occupant: occupant.clone(),
            });
        }
        space.occupant = Some(number.to_string());
        Ok(())
    }

    /// Add an imported vehicle record.
    ///
    /// Missing hour totals are estimated from the record's tier and history,
    /// then the tier is recomputed. A vehicle recorded as parked must name an
    /// existing free space and carry an arrival time.
    pub fn register_vehicle(&mut self, mut vehicle: Vehicle) -> LotResult<()> {
        vehicle.estimate_missing_hours();
        vehicle.refresh_membership();

        if let Some(id) = vehicle.space {
            if vehicle.arrival.is_none() {
                return Err(LotError::InconsistentRecord(format!(
                    "vehicle {} is parked in space {} without an arrival time",
                    vehicle.number, id
                )));
            }
            let space = self.spaces.get(&id).ok_or(LotError::UnknownSpace(id))?;
            if let Some(occupant) = &space.occupant {
                return Err(LotError::SpaceOccupied {
                    space: id,
                    occupant: occupant.clone(),
                });
            }
        } else {
            vehicle.arrival = None;
        }

        let number = vehicle.number.clone();
        let space = vehicle.space;
        self.vehicles.insert(number.clone(), vehicle)?;
        if let Some(id) = space {
            self.occupy(id, &number)?;
        }
        tracing::debug!(vehicle = %number, ?space, "vehicle registered");
        Ok(())
    }

    /// Overwrite a space's usage totals with imported values.
    ///
    /// The current occupant is left alone; only `register_vehicle` parks vehicles.
    pub fn register_space_stats(
        &mut self,
        id: SpaceId,
        occupancy_count: u32,
        revenue: f64,
    ) -> LotResult<()> {
        if !revenue.is_finite() || revenue < 0.0 {
            return Err(LotError::InconsistentRecord(format!(
                "space {} revenue {} is not a non-negative amount",
                id, revenue
            )));
        }
        let space = self.spaces.get_mut(&id).ok_or(LotError::UnknownSpace(id))?;
        space.occupancy_count = occupancy_count;
        space.revenue = revenue;
        tracing::debug!(space = id, occupancy_count, revenue, "space stats imported");
        Ok(())
    }

    /// Park a vehicle at time `now`, registering it first if unknown.
    ///
    /// Returns the assigned space. A new vehicle is inserted only once a
    /// space has been found for it; a blank owner is stored as
    /// [`UNKNOWN_OWNER`].
    pub fn enter(&mut self, number: &str, owner: &str, now: Timestamp) -> LotResult<SpaceId> {
        let key = number.to_string();
        let membership = match self.vehicles.get(&key) {
            Some(vehicle) => {
                if let Some(space) = vehicle.space {
                    return Err(LotError::AlreadyParked {
                        number: key,
                        space,
                    });
                }
                Some(vehicle.membership)
            }
            None => None,
        };

        let tier = membership.unwrap_or_default();
        let Some(space) = self.find_available_space(tier) else {
            tracing::warn!(vehicle = number, membership = %tier, "no space available");
            return Err(LotError::NoSpaceAvailable { membership: tier });
        };

        match self.vehicles.get_mut(&key) {
            Some(vehicle) => vehicle.park(space, now),
            None => {
                let owner = match owner.trim() {
                    "" => UNKNOWN_OWNER,
                    name => name,
                };
                let mut vehicle = Vehicle::new(number, owner);
                vehicle.park(space, now);
                self.vehicles.insert(key, vehicle)?;
            }
        }
        self.occupy(space, number)?;
        tracing::info!(vehicle = number, space, returning = membership.is_some(), "vehicle parked");
        Ok(space)
    }

    /// Close the stay of a parked vehicle at time `now`.
    ///
    /// Hours and parkings accumulate, the tier is recomputed, and the fee is
    /// charged at the new tier. The space is freed and credited.
    pub fn exit(&mut self, number: &str, now: Timestamp) -> LotResult<ExitReceipt> {
        let Self {
            vehicles, spaces, ..
        } = self;
        let vehicle = vehicles
            .get_mut(&number.to_string())
            .ok_or_else(|| LotError::UnknownVehicle(number.to_string()))?;
        let (space_id, arrival) = match (vehicle.space, vehicle.arrival) {
            (Some(space), Some(arrival)) => (space, arrival),
            _ => return Err(LotError::NotParked(number.to_string())),
        };
        let Some(space) = spaces.get_mut(&space_id) else {
            tracing::error!(vehicle = number, space = space_id, "space record missing during exit");
            return Err(LotError::UnknownSpace(space_id));
        };

        let hours = hours_between(arrival, now);
        vehicle.total_hours += hours;
        vehicle.parkings += 1;
        vehicle.last_departure = Some(now);
        let previous_membership = vehicle.refresh_membership();
        let fee = parking_fee(hours, vehicle.membership);
        vehicle.amount_paid += fee;
        vehicle.space = None;
        vehicle.arrival = None;
        space.vacate(fee);

        tracing::info!(vehicle = number, space = space_id, hours, fee, "vehicle left");
        if previous_membership != vehicle.membership {
            tracing::info!(
                vehicle = number,
                from = %previous_membership,
                to = %vehicle.membership,
                "membership changed"
            );
        }

        Ok(ExitReceipt {
            number: vehicle.number.clone(),
            owner: vehicle.owner.clone(),
            space: space_id,
            arrival,
            departure: now,
            hours,
            fee,
            previous_membership,
            membership: vehicle.membership,
        })
    }

    /// Tear down both indexes, releasing every record.
    pub fn close(self) {
        let vehicles = self.vehicles.destroy();
        let spaces = self.spaces.destroy();
        tracing::debug!(
            vehicles = vehicles.records,
            spaces = spaces.records,
            "parking lot closed"
        );
    }
}
