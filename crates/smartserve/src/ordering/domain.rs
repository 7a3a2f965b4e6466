use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Primary key of a staff account.
    UserId
);
entity_id!(RestaurantId);
entity_id!(TableId);
entity_id!(SeatId);
entity_id!(BookingId);
entity_id!(SeatBookingId);
entity_id!(MenuItemId);
entity_id!(OrderId);

/// Staff account. Employees sign in with their six digit `employee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Encoded password hash, or a `!`-prefixed marker when unusable.
    pub password: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn short_name(&self) -> &str {
        &self.first_name
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.employee_id, self.full_name())
    }
}

/// Input for creating a staff account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub employee_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl Default for NewUser {
    fn default() -> Self {
        Self {
            employee_id: None,
            first_name: String::new(),
            last_name: String::new(),
            password: None,
            is_staff: false,
            is_superuser: false,
            is_active: true,
        }
    }
}

/// Partial update of a staff account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub employees: BTreeSet<UserId>,
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    #[serde(default)]
    pub employees: Vec<UserId>,
}

/// A table, optionally pushed together with others under a container table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub number: u32,
    pub restaurant: RestaurantId,
    pub container_table: Option<TableId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTable {
    pub number: u32,
    pub restaurant: RestaurantId,
    #[serde(default)]
    pub container_table: Option<TableId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub table: TableId,
    pub location_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSeat {
    pub table: TableId,
    pub location_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Booking {
    /// Half-open window overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Booking {}", self.id)
    }
}

/// Reservation of a single seat as part of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatBooking {
    pub id: SeatBookingId,
    pub seat: SeatId,
    pub booking: BookingId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub available_at: BTreeSet<RestaurantId>,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub available_at: Vec<RestaurantId>,
}

/// Course an ordered item is served in, in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Course {
    Appetiser,
    Starter,
    MainCourse,
    Dessert,
}

impl Course {
    pub const ALL: [Course; 4] = [
        Course::Appetiser,
        Course::Starter,
        Course::MainCourse,
        Course::Dessert,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Course::Appetiser => "Appetiser",
            Course::Starter => "Starter",
            Course::MainCourse => "Main Course",
            Course::Dessert => "Dessert",
        }
    }
}

impl From<Course> for u8 {
    fn from(course: Course) -> Self {
        match course {
            Course::Appetiser => 0,
            Course::Starter => 1,
            Course::MainCourse => 2,
            Course::Dessert => 3,
        }
    }
}

impl TryFrom<u8> for Course {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Course::ALL
            .into_iter()
            .find(|course| u8::from(*course) == value)
            .ok_or_else(|| format!("\"{value}\" is not a valid choice."))
    }
}

/// A menu item ordered from a booked seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub menu_item: MenuItemId,
    pub seat_booking: SeatBookingId,
    pub course: Course,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    pub menu_item: MenuItemId,
    pub seat_booking: SeatBookingId,
    pub course: Course,
    #[serde(default)]
    pub notes: String,
}

/// Issued API token. Only the digest of the token is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub digest: String,
    pub token_key: String,
    pub user: UserId,
    pub created: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
}
