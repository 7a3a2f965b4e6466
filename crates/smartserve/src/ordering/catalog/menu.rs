use std::collections::BTreeSet;

use super::{advance, Catalog};
use crate::ordering::domain::{
    MenuItem, MenuItemId, NewMenuItem, NewOrder, Order, OrderId, RestaurantId,
};
use crate::ordering::error::OrderingError;
use crate::ordering::validation::{check_display_name, check_text, ValidationError};

impl Catalog {
    pub fn create_menu_item(&mut self, new: NewMenuItem) -> Result<MenuItem, OrderingError> {
        let mut errors = ValidationError::default();
        check_display_name(&mut errors, "name", &new.name);
        if self.menu_items.values().any(|item| item.name == new.name) {
            errors.add("name", "Menu Item with this Name already exists.");
        }
        check_text(&mut errors, "description", &new.description);
        self.check_restaurants(&mut errors, &new.available_at);
        errors.into_result()?;

        let item = MenuItem {
            id: MenuItemId(advance(&mut self.sequences.menu_item)),
            name: new.name,
            description: new.description,
            available_at: new.available_at.into_iter().collect(),
        };
        self.menu_items.insert(item.id, item.clone());
        Ok(item)
    }

    /// Replaces the set of restaurants serving the item.
    pub fn set_menu_item_availability(
        &mut self,
        id: MenuItemId,
        restaurants: &[RestaurantId],
    ) -> Result<MenuItem, OrderingError> {
        self.menu_item(id)?;
        let mut errors = ValidationError::default();
        self.check_restaurants(&mut errors, restaurants);
        errors.into_result()?;

        let item = self
            .menu_items
            .get_mut(&id)
            .ok_or_else(|| OrderingError::not_found("menu item", id))?;
        item.available_at = restaurants.iter().copied().collect::<BTreeSet<_>>();
        Ok(item.clone())
    }

    pub fn delete_menu_item(&mut self, id: MenuItemId) -> Result<MenuItem, OrderingError> {
        self.menu_item(id)?;
        if self.orders.values().any(|order| order.menu_item == id) {
            return Err(OrderingError::protected(
                "menu item",
                id,
                "the item is referenced by orders",
            ));
        }
        self.menu_items
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("menu item", id))
    }

    pub fn place_order(&mut self, new: NewOrder) -> Result<Order, OrderingError> {
        let item = self.menu_item(new.menu_item)?;
        self.seat_booking(new.seat_booking)?;

        let mut errors = ValidationError::default();
        let available = self
            .seat_booking_restaurant(new.seat_booking)
            .is_some_and(|restaurant| item.available_at.contains(&restaurant));
        if !available {
            errors.add(
                "menu_item",
                "Only menu items at this booking's restaurant can be ordered.",
            );
        }
        check_text(&mut errors, "notes", &new.notes);
        errors.into_result()?;

        let order = Order {
            id: OrderId(advance(&mut self.sequences.order)),
            menu_item: new.menu_item,
            seat_booking: new.seat_booking,
            course: new.course,
            notes: new.notes,
        };
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    pub fn delete_order(&mut self, id: OrderId) -> Result<Order, OrderingError> {
        self.orders
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("order", id))
    }

    fn check_restaurants(&self, errors: &mut ValidationError, restaurants: &[RestaurantId]) {
        for restaurant in restaurants {
            if !self.restaurants.contains_key(restaurant) {
                errors.add(
                    "available_at",
                    format!("Invalid pk \"{restaurant}\" - object does not exist."),
                );
            }
        }
    }
}
