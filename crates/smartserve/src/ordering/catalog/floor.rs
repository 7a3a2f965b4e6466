use chrono::{DateTime, Utc};

use super::bookings::check_window;
use super::{advance, Catalog};
use crate::ordering::domain::{
    Booking, BookingId, NewSeat, NewTable, RestaurantId, Seat, SeatBooking, SeatBookingId,
    SeatId, Table, TableId,
};
use crate::ordering::error::OrderingError;
use crate::ordering::validation::{ValidationError, NON_FIELD_ERRORS};

impl Catalog {
    pub fn create_table(&mut self, new: NewTable) -> Result<Table, OrderingError> {
        self.restaurant(new.restaurant)?;
        let mut errors = ValidationError::default();
        if new.number < 1 {
            errors.add("number", "Ensure this value is greater than or equal to 1.");
        } else if self.table_number_taken(new.number, new.restaurant) {
            errors.add(
                NON_FIELD_ERRORS,
                "Table with this Number and Restaurant already exists.",
            );
        }
        let id = TableId(self.sequences.table + 1);
        let candidate = Table {
            id,
            number: new.number,
            restaurant: new.restaurant,
            container_table: new.container_table,
        };
        self.check_container(&mut errors, &candidate)?;
        errors.into_result()?;

        advance(&mut self.sequences.table);
        self.tables.insert(id, candidate.clone());
        Ok(candidate)
    }

    /// Moves the table under a container table, or back to the top level.
    pub fn set_container_table(
        &mut self,
        table: TableId,
        container: Option<TableId>,
    ) -> Result<Table, OrderingError> {
        let mut candidate = self.table(table)?.clone();
        candidate.container_table = container;
        let mut errors = ValidationError::default();
        self.check_container(&mut errors, &candidate)?;
        errors.into_result()?;

        self.tables.insert(table, candidate.clone());
        Ok(candidate)
    }

    /// Deletes the table and its own seats. Sub tables become top level.
    pub fn delete_table(&mut self, id: TableId) -> Result<Table, OrderingError> {
        self.table(id)?;
        if self.direct_seats(id).into_iter().any(|seat| self.seat_is_booked(seat)) {
            return Err(OrderingError::protected(
                "table",
                id,
                "seats at this table are referenced by seat bookings",
            ));
        }

        self.seats.retain(|_, seat| seat.table != id);
        for table in self.tables.values_mut() {
            if table.container_table == Some(id) {
                table.container_table = None;
            }
        }
        self.tables
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("table", id))
    }

    pub fn create_seat(&mut self, new: NewSeat) -> Result<Seat, OrderingError> {
        self.table(new.table)?;
        let taken = self
            .seats
            .values()
            .any(|seat| seat.table == new.table && seat.location_index == new.location_index);
        if taken {
            return Err(ValidationError::general(
                "Seat with this Table and Location Index already exists.",
            )
            .into());
        }

        let seat = Seat {
            id: SeatId(advance(&mut self.sequences.seat)),
            table: new.table,
            location_index: new.location_index,
        };
        self.seats.insert(seat.id, seat.clone());
        Ok(seat)
    }

    pub fn delete_seat(&mut self, id: SeatId) -> Result<Seat, OrderingError> {
        self.seat(id)?;
        if self.seat_is_booked(id) {
            return Err(OrderingError::protected(
                "seat",
                id,
                "the seat is referenced by seat bookings",
            ));
        }
        self.seats
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("seat", id))
    }

    /// Books every seat of the table for the window in one step.
    pub fn book_table(
        &mut self,
        table: TableId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, OrderingError> {
        self.table(table)?;
        check_window(start, end)?;

        let seats = self.table_seats(table);
        let mut errors = ValidationError::default();
        for seat in &seats {
            if self.seat_table_busy(*seat, None, start, end) {
                errors.add(
                    "seat",
                    "A booking for this seat's table already exists within these start & end points.",
                );
                break;
            }
        }
        errors.into_result()?;

        let booking = Booking {
            id: BookingId(advance(&mut self.sequences.booking)),
            start,
            end,
        };
        self.bookings.insert(booking.id, booking.clone());
        for seat in seats {
            let id = SeatBookingId(advance(&mut self.sequences.seat_booking));
            self.seat_bookings.insert(
                id,
                SeatBooking {
                    id,
                    seat,
                    booking: booking.id,
                },
            );
        }
        Ok(booking)
    }

    pub(crate) fn seat_is_booked(&self, seat: SeatId) -> bool {
        self.seat_bookings
            .values()
            .any(|seat_booking| seat_booking.seat == seat)
    }

    fn table_number_taken(&self, number: u32, restaurant: RestaurantId) -> bool {
        self.tables
            .values()
            .any(|table| table.number == number && table.restaurant == restaurant)
    }

    fn check_container(
        &self,
        errors: &mut ValidationError,
        candidate: &Table,
    ) -> Result<(), OrderingError> {
        let Some(container_id) = candidate.container_table else {
            return Ok(());
        };
        if container_id == candidate.id {
            errors.add(
                "container_table",
                "The parent container table cannot be this own table.",
            );
            return Ok(());
        }

        let container = self.table(container_id)?;
        if container.restaurant != candidate.restaurant {
            errors.add(
                "container_table",
                "Only tables at the same restaurant can be used as a parent container table.",
            );
        } else if self.table_family(candidate.id).contains(&container_id) {
            errors.add(
                "container_table",
                "The parent container table cannot be a sub-table of this table.",
            );
        }
        Ok(())
    }
}
