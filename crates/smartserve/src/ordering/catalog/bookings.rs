use chrono::{DateTime, Utc};

use super::{advance, Catalog};
use crate::ordering::domain::{Booking, BookingId, SeatBooking, SeatBookingId, SeatId};
use crate::ordering::error::OrderingError;
use crate::ordering::validation::{ValidationError, NON_FIELD_ERRORS};

const TABLE_ALREADY_BOOKED: &str =
    "A booking for this seat's table already exists within these start & end points.";

pub(super) fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::general(
            "Start Date & Time must be before End Date & Time.",
        ));
    }
    Ok(())
}

impl Catalog {
    /// Creates a booking with no seats reserved yet.
    pub fn create_booking(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, OrderingError> {
        check_window(start, end)?;
        let booking = Booking {
            id: BookingId(advance(&mut self.sequences.booking)),
            start,
            end,
        };
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    pub fn add_seat_booking(
        &mut self,
        booking: BookingId,
        seat: SeatId,
    ) -> Result<SeatBooking, OrderingError> {
        let window = self.booking(booking)?.clone();
        self.seat(seat)?;

        let mut errors = ValidationError::default();
        let duplicate = self
            .seat_bookings
            .values()
            .any(|existing| existing.booking == booking && existing.seat == seat);
        if duplicate {
            errors.add(
                NON_FIELD_ERRORS,
                "Seat Booking with this Seat and Booking already exists.",
            );
        }
        if let Some(restaurant) = self.booking_restaurant(booking) {
            if self.seat_restaurant(seat) != Some(restaurant) {
                errors.add(
                    NON_FIELD_ERRORS,
                    "The tables within this Booking must all be at the same restaurant.",
                );
            }
        }
        if self.seat_table_busy(seat, Some(booking), window.start, window.end) {
            errors.add("seat", TABLE_ALREADY_BOOKED);
        }
        errors.into_result()?;

        let seat_booking = SeatBooking {
            id: SeatBookingId(advance(&mut self.sequences.seat_booking)),
            seat,
            booking,
        };
        self.seat_bookings
            .insert(seat_booking.id, seat_booking.clone());
        Ok(seat_booking)
    }

    /// Moves the booking to a new window, provided none of its seats clash.
    pub fn reschedule_booking(
        &mut self,
        booking: BookingId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, OrderingError> {
        self.booking(booking)?;
        check_window(start, end)?;

        let clash = self
            .seat_bookings
            .values()
            .filter(|seat_booking| seat_booking.booking == booking)
            .any(|seat_booking| self.seat_table_busy(seat_booking.seat, Some(booking), start, end));
        if clash {
            return Err(ValidationError::field("seat", TABLE_ALREADY_BOOKED).into());
        }

        let entry = self
            .bookings
            .get_mut(&booking)
            .ok_or_else(|| OrderingError::not_found("booking", booking))?;
        entry.start = start;
        entry.end = end;
        Ok(entry.clone())
    }

    /// Deletes the booking together with its seat bookings and their orders.
    pub fn delete_booking(&mut self, id: BookingId) -> Result<Booking, OrderingError> {
        self.booking(id)?;
        for seat_booking in self.booking_seat_bookings(id) {
            self.drop_seat_booking(seat_booking);
        }
        self.bookings
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("booking", id))
    }

    /// Deletes one seat reservation and the orders placed from it.
    pub fn delete_seat_booking(&mut self, id: SeatBookingId) -> Result<SeatBooking, OrderingError> {
        self.seat_booking(id)?;
        self.drop_seat_booking(id)
            .ok_or_else(|| OrderingError::not_found("seat booking", id))
    }

    fn drop_seat_booking(&mut self, id: SeatBookingId) -> Option<SeatBooking> {
        self.orders.retain(|_, order| order.seat_booking != id);
        self.seat_bookings.remove(&id)
    }

    /// Whether another booking holds a seat at the same table during the window.
    pub(crate) fn seat_table_busy(
        &self,
        seat: SeatId,
        ignore: Option<BookingId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        let Some(table) = self.seats.get(&seat).map(|seat| seat.table) else {
            return false;
        };
        self.seat_bookings
            .values()
            .filter(|seat_booking| Some(seat_booking.booking) != ignore)
            .filter(|seat_booking| {
                self.seats
                    .get(&seat_booking.seat)
                    .is_some_and(|other| other.table == table)
            })
            .filter_map(|seat_booking| self.bookings.get(&seat_booking.booking))
            .any(|booking| booking.overlaps(start, end))
    }
}
