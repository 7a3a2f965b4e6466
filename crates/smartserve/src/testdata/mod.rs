//! Sample data generation from a JSON fixture of candidate field values.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::auth::PasswordHasher;
use crate::ordering::{
    CatalogStore, Course, NewMenuItem, NewOrder, NewRestaurant, NewSeat, NewTable, NewUser,
    OrderingError, OrderingService,
};

const EMPLOYEES_PER_RESTAURANT: usize = 2;
const TABLES_PER_RESTAURANT: u32 = 3;
const SEATS_PER_TABLE: u32 = 4;
const BOOKING_MIN_SECS: i64 = 600;
const BOOKING_MAX_SECS: i64 = 32_400;
const BOOKING_LEAD_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum TestDataError {
    #[error("TEST_DATA_JSON_FILE_PATH cannot be empty when running tests.")]
    MissingPath,
    #[error("failed to read test data from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("test data in {path} is not a JSON object of model fields")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "Not enough test data values were available, to generate one from the test data JSON file. (field_name='{field_name}')"
    )]
    NotEnoughTestData { field_name: String },
    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

/// Candidate values per model field. Each value is handed out at most once.
#[derive(Debug, Default, Clone)]
pub struct TestDataPool {
    fields: BTreeMap<String, BTreeMap<String, VecDeque<String>>>,
}

impl TestDataPool {
    pub fn from_path(path: Option<&Path>) -> Result<Self, TestDataError> {
        let path = path.ok_or(TestDataError::MissingPath)?;
        let raw = fs::read_to_string(path).map_err(|source| TestDataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| TestDataError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses `{model: {field: [values]}}`, dropping repeated values.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: BTreeMap<String, BTreeMap<String, Vec<String>>> = serde_json::from_str(raw)?;
        let fields = parsed
            .into_iter()
            .map(|(model, fields)| {
                let fields = fields
                    .into_iter()
                    .map(|(field, values)| {
                        let mut unique = VecDeque::with_capacity(values.len());
                        for value in values {
                            if !unique.contains(&value) {
                                unique.push_back(value);
                            }
                        }
                        (field, unique)
                    })
                    .collect();
                (model, fields)
            })
            .collect();
        Ok(Self { fields })
    }

    /// Next unused value for `model.field`.
    pub fn take(&mut self, model: &str, field: &str) -> Result<String, TestDataError> {
        self.fields
            .get_mut(model)
            .and_then(|fields| fields.get_mut(field))
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| TestDataError::NotEnoughTestData {
                field_name: field.to_string(),
            })
    }

    pub fn remaining(&self, model: &str, field: &str) -> usize {
        self.fields
            .get(model)
            .and_then(|fields| fields.get(field))
            .map_or(0, VecDeque::len)
    }
}

/// Counts of what a seeding run created.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub restaurants: usize,
    pub users: usize,
    pub tables: usize,
    pub seats: usize,
    pub menu_items: usize,
    pub bookings: usize,
    pub orders: usize,
}

/// Populates a catalog with staffed restaurants, their floor plans, a menu
/// item each and one booked table with an order.
pub struct Seeder<'a, S> {
    ordering: &'a OrderingService<S>,
    pool: TestDataPool,
}

impl<'a, S> Seeder<'a, S>
where
    S: CatalogStore + 'static,
{
    pub fn new(ordering: &'a OrderingService<S>, pool: TestDataPool) -> Self {
        Self { ordering, pool }
    }

    /// Creates `restaurants` staffed restaurants in a single catalog
    /// transaction. Either everything is created or nothing is.
    pub fn seed(
        &mut self,
        restaurants: usize,
        now: DateTime<Utc>,
    ) -> Result<SeedReport, TestDataError> {
        let drafts = (0..restaurants)
            .map(|_| self.draft())
            .collect::<Result<Vec<_>, _>>()?;

        let report = self.ordering.transact(|catalog| {
            let mut report = SeedReport::default();
            let mut rng = rand::thread_rng();

            for draft in drafts {
                let mut employees = Vec::with_capacity(draft.employees.len());
                for employee in draft.employees {
                    let user = catalog.create_user(employee, PasswordHasher::unusable(), now)?;
                    employees.push(user.id);
                    report.users += 1;
                }

                let restaurant = catalog.create_restaurant(NewRestaurant {
                    name: draft.restaurant,
                    employees,
                })?;
                report.restaurants += 1;

                let mut first_table = None;
                for number in 1..=TABLES_PER_RESTAURANT {
                    let table = catalog.create_table(NewTable {
                        number,
                        restaurant: restaurant.id,
                        container_table: None,
                    })?;
                    report.tables += 1;
                    for location_index in 1..=SEATS_PER_TABLE {
                        catalog.create_seat(NewSeat {
                            table: table.id,
                            location_index,
                        })?;
                        report.seats += 1;
                    }
                    first_table.get_or_insert(table.id);
                }

                let item = catalog.create_menu_item(NewMenuItem {
                    name: draft.menu_item,
                    description: draft.description,
                    available_at: vec![restaurant.id],
                })?;
                report.menu_items += 1;

                let Some(table) = first_table else {
                    continue;
                };
                let start = now
                    + Duration::days(rng.gen_range(0..BOOKING_LEAD_DAYS))
                    + Duration::hours(rng.gen_range(0..24));
                let end =
                    start + Duration::seconds(rng.gen_range(BOOKING_MIN_SECS..=BOOKING_MAX_SECS));
                let booking = catalog.book_table(table, start, end)?;
                report.bookings += 1;

                if let Some(seat_booking) = catalog.booking_seat_bookings(booking.id).first().copied()
                {
                    catalog.place_order(NewOrder {
                        menu_item: item.id,
                        seat_booking,
                        course: Course::ALL[rng.gen_range(0..Course::ALL.len())],
                        notes: String::new(),
                    })?;
                    report.orders += 1;
                }
            }
            Ok(report)
        })?;

        info!(?report, "test data seeded");
        Ok(report)
    }

    fn draft(&mut self) -> Result<RestaurantDraft, TestDataError> {
        let mut employees = Vec::with_capacity(EMPLOYEES_PER_RESTAURANT);
        for _ in 0..EMPLOYEES_PER_RESTAURANT {
            employees.push(NewUser {
                first_name: self.pool.take("user", "first_name")?,
                last_name: self.pool.take("user", "last_name")?,
                ..NewUser::default()
            });
        }
        Ok(RestaurantDraft {
            employees,
            restaurant: self.pool.take("restaurant", "name")?,
            menu_item: self.pool.take("menuitem", "name")?,
            description: self.pool.take("menuitem", "description")?,
        })
    }
}

/// Fixture values reserved for one restaurant before anything is written.
struct RestaurantDraft {
    employees: Vec<NewUser>,
    restaurant: String,
    menu_item: String,
    description: String,
}
