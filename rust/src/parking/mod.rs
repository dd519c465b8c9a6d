//! Smart-parking layer built on two [`BPlusIndex`](crate::BPlusIndex)es.
//!
//! Vehicles are keyed by registration number and spaces by integer id. Entry
//! and exit events look records up and mutate them in place; reports are
//! produced from ordered scans.
//!
//! ```
//! use parking_index::parking::{Membership, ParkingLot};
//!
//! let mut lot = ParkingLot::with_default_config().unwrap();
//! let space = lot.enter("KA01AB1234", "Asha", 0).unwrap();
//! assert_eq!(space, 21);
//!
//! let receipt = lot.exit("KA01AB1234", 4 * 3600).unwrap();
//! assert_eq!(receipt.fee, 150.0);
//! assert_eq!(receipt.membership, Membership::Standard);
//! ```

mod fees;
mod lot;
mod records;
mod reports;

pub use fees::{hours_between, parking_fee, BASE_FEE, BASE_HOURS, HOURLY_FEE, MEMBER_RATE};
pub use lot::{
    ExitReceipt, LotConfig, LotError, LotResult, ParkingLot, DEFAULT_TOTAL_SPACES,
    UNKNOWN_OWNER,
};
pub use records::{
    Membership, ParkingSpace, SpaceId, Timestamp, Vehicle, GOLD_HOURS, PREMIUM_HOURS,
};
