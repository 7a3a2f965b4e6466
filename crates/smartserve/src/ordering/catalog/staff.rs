use chrono::{DateTime, Utc};
use rand::Rng;

use super::{advance, Catalog};
use crate::ordering::domain::{
    NewRestaurant, NewUser, Restaurant, RestaurantId, User, UserChanges, UserId,
};
use crate::ordering::error::OrderingError;
use crate::ordering::validation::{
    check_display_name, check_employee_id, check_person_name, ValidationError,
};

const DUPLICATE_EMPLOYEE_NAME: &str = "An employee with that first & last name already exists at one of the restaurants that this employee is assigned to.";

/// Outcome of linking employees and restaurants. Links that would give a
/// restaurant two employees with the same full name are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeAssignment<T> {
    pub assigned: Vec<T>,
    pub rejected: Vec<T>,
}

impl<T> Default for EmployeeAssignment<T> {
    fn default() -> Self {
        Self {
            assigned: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl Catalog {
    /// Creates a staff account. `password` is the already encoded hash.
    pub fn create_user(
        &mut self,
        new: NewUser,
        password: String,
        now: DateTime<Utc>,
    ) -> Result<User, OrderingError> {
        let mut errors = ValidationError::default();
        check_person_name(&mut errors, "first_name", &new.first_name);
        check_person_name(&mut errors, "last_name", &new.last_name);

        let employee_id = match new.employee_id.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => {
                check_employee_id(&mut errors, value);
                if self.user_by_employee_id(value).is_some() {
                    errors.add("employee_id", "A user with that Employee ID already exists.");
                }
                value.to_string()
            }
            _ => self.generate_employee_id(),
        };
        errors.into_result()?;

        let user = User {
            id: UserId(advance(&mut self.sequences.user)),
            employee_id,
            first_name: new.first_name,
            last_name: new.last_name,
            password,
            is_staff: new.is_staff || new.is_superuser,
            is_superuser: new.is_superuser,
            is_active: new.is_active,
            date_joined: now,
            last_login: None,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Creates an account with staff and superuser rights.
    pub fn create_superuser(
        &mut self,
        mut new: NewUser,
        password: String,
        now: DateTime<Utc>,
        explicit_is_staff: Option<bool>,
        explicit_is_superuser: Option<bool>,
    ) -> Result<User, OrderingError> {
        let mut errors = ValidationError::default();
        if explicit_is_staff == Some(false) {
            errors.add("is_staff", "Superuser must have is_staff=True.");
        }
        if explicit_is_superuser == Some(false) {
            errors.add("is_superuser", "Superuser must have is_superuser=True.");
        }
        errors.into_result()?;

        new.is_staff = true;
        new.is_superuser = true;
        self.create_user(new, password, now)
    }

    pub fn update_user(
        &mut self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<User, OrderingError> {
        let mut user = self.user(id)?.clone();
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if let Some(is_staff) = changes.is_staff {
            user.is_staff = is_staff;
        }
        if let Some(is_superuser) = changes.is_superuser {
            user.is_superuser = is_superuser;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        if user.is_superuser {
            user.is_staff = true;
        }

        let mut errors = ValidationError::default();
        check_person_name(&mut errors, "first_name", &user.first_name);
        check_person_name(&mut errors, "last_name", &user.last_name);
        if errors.is_empty() {
            let clash = self
                .user_restaurants(id)
                .into_iter()
                .any(|restaurant| self.has_namesake(restaurant, &user));
            if clash {
                errors.add("first_name", DUPLICATE_EMPLOYEE_NAME);
                errors.add("last_name", DUPLICATE_EMPLOYEE_NAME);
            }
        }
        errors.into_result()?;

        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn set_password(&mut self, id: UserId, password: String) -> Result<(), OrderingError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| OrderingError::not_found("user", id))?;
        user.password = password;
        Ok(())
    }

    pub fn record_login(&mut self, id: UserId, now: DateTime<Utc>) -> Result<(), OrderingError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| OrderingError::not_found("user", id))?;
        user.last_login = Some(now);
        Ok(())
    }

    /// Removes the account along with its employment links and tokens.
    pub fn delete_user(&mut self, id: UserId) -> Result<User, OrderingError> {
        let user = self
            .users
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("user", id))?;
        for restaurant in self.restaurants.values_mut() {
            restaurant.employees.remove(&id);
        }
        self.auth_tokens.retain(|_, token| token.user != id);
        Ok(user)
    }

    pub fn create_restaurant(&mut self, new: NewRestaurant) -> Result<Restaurant, OrderingError> {
        let mut errors = ValidationError::default();
        check_display_name(&mut errors, "name", &new.name);
        for employee in &new.employees {
            if !self.users.contains_key(employee) {
                errors.add(
                    "employees",
                    format!("Invalid pk \"{employee}\" - object does not exist."),
                );
            }
        }
        errors.into_result()?;

        let id = RestaurantId(advance(&mut self.sequences.restaurant));
        self.restaurants.insert(
            id,
            Restaurant {
                id,
                name: new.name,
                employees: Default::default(),
            },
        );
        self.add_employees(id, &new.employees)?;
        self.restaurant(id).cloned()
    }

    pub fn rename_restaurant(
        &mut self,
        id: RestaurantId,
        name: String,
    ) -> Result<Restaurant, OrderingError> {
        self.restaurant(id)?;
        let mut errors = ValidationError::default();
        check_display_name(&mut errors, "name", &name);
        errors.into_result()?;

        let restaurant = self
            .restaurants
            .get_mut(&id)
            .ok_or_else(|| OrderingError::not_found("restaurant", id))?;
        restaurant.name = name;
        Ok(restaurant.clone())
    }

    /// Deletes the restaurant with its tables and seats. Refused while any of
    /// those seats is booked.
    pub fn delete_restaurant(&mut self, id: RestaurantId) -> Result<Restaurant, OrderingError> {
        self.restaurant(id)?;
        let tables = self.restaurant_tables(id);
        let booked = tables
            .iter()
            .flat_map(|table| self.direct_seats(*table))
            .any(|seat| self.seat_is_booked(seat));
        if booked {
            return Err(OrderingError::protected(
                "restaurant",
                id,
                "seats at this restaurant are referenced by seat bookings",
            ));
        }

        for table in &tables {
            self.seats.retain(|_, seat| seat.table != *table);
            self.tables.remove(table);
        }
        for item in self.menu_items.values_mut() {
            item.available_at.remove(&id);
        }
        self.restaurants
            .remove(&id)
            .ok_or_else(|| OrderingError::not_found("restaurant", id))
    }

    /// Adds users to the restaurant's staff, skipping any whose full name is
    /// already taken by another employee there.
    pub fn add_employees(
        &mut self,
        restaurant: RestaurantId,
        users: &[UserId],
    ) -> Result<EmployeeAssignment<UserId>, OrderingError> {
        self.restaurant(restaurant)?;
        for user in users {
            self.user(*user)?;
        }

        let mut outcome = EmployeeAssignment::default();
        for user_id in users {
            let user = self.user(*user_id)?.clone();
            if self.has_namesake(restaurant, &user) {
                outcome.rejected.push(*user_id);
                continue;
            }
            if let Some(entry) = self.restaurants.get_mut(&restaurant) {
                entry.employees.insert(*user_id);
            }
            outcome.assigned.push(*user_id);
        }
        Ok(outcome)
    }

    /// Replaces the set of restaurants employing the user.
    pub fn set_user_restaurants(
        &mut self,
        user: UserId,
        restaurants: &[RestaurantId],
    ) -> Result<EmployeeAssignment<RestaurantId>, OrderingError> {
        let account = self.user(user)?.clone();
        for restaurant in restaurants {
            self.restaurant(*restaurant)?;
        }

        for entry in self.restaurants.values_mut() {
            if !restaurants.contains(&entry.id) {
                entry.employees.remove(&user);
            }
        }

        let mut outcome = EmployeeAssignment::default();
        for restaurant in restaurants {
            if self.has_namesake(*restaurant, &account) {
                outcome.rejected.push(*restaurant);
                if let Some(entry) = self.restaurants.get_mut(restaurant) {
                    entry.employees.remove(&user);
                }
                continue;
            }
            if let Some(entry) = self.restaurants.get_mut(restaurant) {
                entry.employees.insert(user);
            }
            outcome.assigned.push(*restaurant);
        }
        Ok(outcome)
    }

    pub fn remove_employee(
        &mut self,
        restaurant: RestaurantId,
        user: UserId,
    ) -> Result<bool, OrderingError> {
        self.user(user)?;
        let entry = self
            .restaurants
            .get_mut(&restaurant)
            .ok_or_else(|| OrderingError::not_found("restaurant", restaurant))?;
        Ok(entry.employees.remove(&user))
    }

    /// Whether another employee of the restaurant shares the user's full name.
    fn has_namesake(&self, restaurant: RestaurantId, user: &User) -> bool {
        let Some(restaurant) = self.restaurants.get(&restaurant) else {
            return false;
        };
        restaurant
            .employees
            .iter()
            .filter(|employee| **employee != user.id)
            .filter_map(|employee| self.users.get(employee))
            .any(|employee| {
                employee.first_name == user.first_name && employee.last_name == user.last_name
            })
    }

    fn generate_employee_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen_range(100_000..=999_999u32).to_string();
            if self.user_by_employee_id(&candidate).is_none() {
                return candidate;
            }
        }
    }
}
