use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::ordering::catalog::Catalog;
use crate::ordering::domain::{
    Booking, MenuItem, NewMenuItem, NewRestaurant, NewSeat, NewTable, NewUser, Restaurant, RestaurantId,
    Seat, Table, TableId, User,
};

pub(super) const HASH: &str = "pbkdf2_sha256$1$salt$aGFzaA==";

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn window(start_hour: u32, hours: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at(start_hour);
    (start, start + Duration::hours(hours))
}

pub(super) fn new_user(first: &str, last: &str) -> NewUser {
    NewUser {
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..NewUser::default()
    }
}

pub(super) fn user(catalog: &mut Catalog, first: &str, last: &str) -> User {
    catalog
        .create_user(new_user(first, last), HASH.to_string(), at(9))
        .expect("user created")
}

pub(super) fn restaurant(catalog: &mut Catalog, name: &str) -> Restaurant {
    catalog
        .create_restaurant(NewRestaurant {
            name: name.to_string(),
            employees: Vec::new(),
        })
        .expect("restaurant created")
}

pub(super) fn table(catalog: &mut Catalog, restaurant: RestaurantId, number: u32) -> Table {
    catalog
        .create_table(NewTable {
            number,
            restaurant,
            container_table: None,
        })
        .expect("table created")
}

pub(super) fn sub_table(
    catalog: &mut Catalog,
    restaurant: RestaurantId,
    number: u32,
    container: TableId,
) -> Table {
    catalog
        .create_table(NewTable {
            number,
            restaurant,
            container_table: Some(container),
        })
        .expect("sub table created")
}

pub(super) fn seat(catalog: &mut Catalog, table: TableId, location_index: u32) -> Seat {
    catalog
        .create_seat(NewSeat {
            table,
            location_index,
        })
        .expect("seat created")
}

/// One restaurant with table 1 (two seats) and table 2 (one seat).
pub(super) struct Floor {
    pub catalog: Catalog,
    pub restaurant: Restaurant,
    pub first: Table,
    pub second: Table,
    pub seats: Vec<Seat>,
}

pub(super) fn floor() -> Floor {
    let mut catalog = Catalog::default();
    let restaurant = restaurant(&mut catalog, "Luigi's");
    let first = table(&mut catalog, restaurant.id, 1);
    let second = table(&mut catalog, restaurant.id, 2);
    let seats = vec![
        seat(&mut catalog, first.id, 0),
        seat(&mut catalog, first.id, 1),
        seat(&mut catalog, second.id, 0),
    ];
    Floor {
        catalog,
        restaurant,
        first,
        second,
        seats,
    }
}

pub(super) fn booked(floor: &mut Floor, start_hour: u32, hours: i64) -> Booking {
    let (start, end) = window(start_hour, hours);
    floor
        .catalog
        .book_table(floor.first.id, start, end)
        .expect("table booked")
}

pub(super) fn menu_item(
    catalog: &mut Catalog,
    name: &str,
    available_at: Vec<RestaurantId>,
) -> MenuItem {
    catalog
        .create_menu_item(NewMenuItem {
            name: name.to_string(),
            description: String::new(),
            available_at,
        })
        .expect("menu item created")
}
