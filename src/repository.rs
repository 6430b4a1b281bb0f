use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder};
use tokio::sync::RwLock;

use crate::{
    errors::ServiceError,
    models::{Address, Dish, NewRestaurant, Restaurant, RestaurantDto},
    query::{ListQuery, matches_phrase},
};

/// Repository Trait
///
/// The persistence contract the restaurant service depends on. Every mutating call is a
/// single atomic commit; callers see either the full write or none of it.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// The bare restaurant row, used before permission checks on mutations.
    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, ServiceError>;
    /// The restaurant with its address and dishes eagerly loaded.
    async fn get_restaurant_details(&self, id: i64) -> Result<Option<RestaurantDto>, ServiceError>;
    /// The requested page of matches, ordered by `ListQuery::compare` semantics.
    async fn search_restaurants(&self, query: &ListQuery) -> Result<Vec<RestaurantDto>, ServiceError>;
    /// All matches of the phrase, independent of any paging.
    async fn count_restaurants(&self, search_phrase: Option<&str>) -> Result<i64, ServiceError>;
    /// Inserts the restaurant and its address together and returns the new id.
    async fn create_restaurant(&self, restaurant: NewRestaurant) -> Result<i64, ServiceError>;
    /// Persists the mutable columns of an existing row. `id` and `created_by_id` are never written.
    async fn update_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError>;
    /// Removes the restaurant; its address and dishes go with it.
    async fn delete_restaurant(&self, id: i64) -> Result<(), ServiceError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Postgres ---

const LISTING_SELECT: &str = r#"
    SELECT
        r.id, r.name, r.description, r.category, r.has_delivery,
        r.contact_email, r.contact_number, r.created_by_id,
        a.city, a.street, a.postal_code
    FROM restaurants r
    LEFT JOIN addresses a ON a.restaurant_id = r.id
"#;

/// A restaurant joined with its (possibly missing) address.
#[derive(FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    restaurant: Restaurant,
    city: Option<String>,
    street: Option<String>,
    postal_code: Option<String>,
}

impl ListingRow {
    fn into_dto(self, dishes: Vec<Dish>) -> RestaurantDto {
        let address = match (self.city, self.street) {
            (Some(city), Some(street)) => Some(Address {
                city,
                street,
                postal_code: self.postal_code,
            }),
            _ => None,
        };
        RestaurantDto::assemble(self.restaurant, address, dishes)
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL (schema in `migrations/`).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn dishes_by_restaurant(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<Dish>>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let dishes = sqlx::query_as::<_, Dish>(
            "SELECT id, restaurant_id, name, description, price FROM dishes WHERE restaurant_id = ANY($1) ORDER BY id",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Dish>> = HashMap::new();
        for dish in dishes {
            grouped.entry(dish.restaurant_id).or_default().push(dish);
        }
        Ok(grouped)
    }
}

/// Appends the search predicate. `strpos` keeps it a literal substring match, so `%`
/// and `_` in the phrase carry no wildcard meaning.
fn push_search_filter(builder: &mut QueryBuilder<'_, Postgres>, search_phrase: Option<&str>) {
    if let Some(phrase) = search_phrase {
        builder.push(" WHERE (strpos(lower(r.name), lower(");
        builder.push_bind(phrase.to_string());
        builder.push(")) > 0 OR strpos(lower(r.description), lower(");
        builder.push_bind(phrase.to_string());
        builder.push(")) > 0)");
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, ServiceError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"SELECT id, name, description, category, has_delivery,
                      contact_email, contact_number, created_by_id
               FROM restaurants
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(restaurant)
    }

    async fn get_restaurant_details(&self, id: i64) -> Result<Option<RestaurantDto>, ServiceError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_SELECT);
        builder.push(" WHERE r.id = ");
        builder.push_bind(id);

        let Some(row) = builder
            .build_query_as::<ListingRow>()
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut dishes = self.dishes_by_restaurant(&[id]).await?;
        Ok(Some(row.into_dto(dishes.remove(&id).unwrap_or_default())))
    }

    /// search_restaurants
    ///
    /// Filter, order and page in one statement. Text columns are ordered with the `"C"`
    /// collation (byte-wise, case-sensitive) and `id` breaks ties so pages never overlap.
    async fn search_restaurants(&self, query: &ListQuery) -> Result<Vec<RestaurantDto>, ServiceError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_SELECT);
        push_search_filter(&mut builder, query.search_phrase());

        builder.push(" ORDER BY ");
        if let Some((column, direction)) = query.sort {
            builder.push(format!(
                "r.{} COLLATE \"C\" {}, ",
                column.column(),
                direction.sql_keyword()
            ));
        }
        builder.push("r.id ASC LIMIT ");
        builder.push_bind(query.limit());
        builder.push(" OFFSET ");
        builder.push_bind(query.offset());

        let rows = builder
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.restaurant.id).collect();
        let mut dishes = self.dishes_by_restaurant(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let own = dishes.remove(&row.restaurant.id).unwrap_or_default();
                row.into_dto(own)
            })
            .collect())
    }

    async fn count_restaurants(&self, search_phrase: Option<&str>) -> Result<i64, ServiceError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM restaurants r");
        push_search_filter(&mut builder, search_phrase);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> Result<i64, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO restaurants
                   (name, description, category, has_delivery, contact_email, contact_number, created_by_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(&restaurant.name)
        .bind(&restaurant.description)
        .bind(&restaurant.category)
        .bind(restaurant.has_delivery)
        .bind(&restaurant.contact_email)
        .bind(&restaurant.contact_number)
        .bind(restaurant.created_by_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO addresses (restaurant_id, city, street, postal_code) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&restaurant.address.city)
        .bind(&restaurant.address.street)
        .bind(&restaurant.address.postal_code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError> {
        let result = sqlx::query(
            r#"UPDATE restaurants
               SET name = $2, description = $3, category = $4, has_delivery = $5,
                   contact_email = $6, contact_number = $7
               WHERE id = $1"#,
        )
        .bind(restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.description)
        .bind(&restaurant.category)
        .bind(restaurant.has_delivery)
        .bind(&restaurant.contact_email)
        .bind(&restaurant.contact_number)
        .execute(&self.pool)
        .await?;

        // Deleted concurrently between load and save.
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("Restaurant"));
        }
        Ok(())
    }

    async fn delete_restaurant(&self, id: i64) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("Restaurant"));
        }
        Ok(())
    }
}

// --- In-Memory ---

#[derive(Debug)]
struct StoredRestaurant {
    restaurant: Restaurant,
    address: Address,
    dishes: Vec<Dish>,
}

impl StoredRestaurant {
    fn to_dto(&self) -> RestaurantDto {
        RestaurantDto::assemble(
            self.restaurant.clone(),
            Some(self.address.clone()),
            self.dishes.clone(),
        )
    }
}

#[derive(Debug, Default)]
struct Tables {
    last_restaurant_id: i64,
    last_dish_id: i64,
    restaurants: BTreeMap<i64, StoredRestaurant>,
}

/// InMemoryRepository
///
/// A process-local `Repository` with the same filtering, ordering and paging semantics
/// as the Postgres implementation. Used by the handler and router tests, which need a
/// working store without a database.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a dish to an existing restaurant. Returns the dish id, or `None` if the
    /// restaurant does not exist.
    pub async fn add_dish(
        &self,
        restaurant_id: i64,
        name: &str,
        description: Option<&str>,
        price: f64,
    ) -> Option<i64> {
        let mut tables = self.tables.write().await;
        tables.last_dish_id += 1;
        let id = tables.last_dish_id;
        let stored = tables.restaurants.get_mut(&restaurant_id)?;
        stored.dishes.push(Dish {
            id,
            restaurant_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            price,
        });
        Some(id)
    }

    /// Number of restaurants currently stored.
    pub async fn len(&self) -> usize {
        self.tables.read().await.restaurants.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.restaurants.get(&id).map(|s| s.restaurant.clone()))
    }

    async fn get_restaurant_details(&self, id: i64) -> Result<Option<RestaurantDto>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.restaurants.get(&id).map(StoredRestaurant::to_dto))
    }

    async fn search_restaurants(&self, query: &ListQuery) -> Result<Vec<RestaurantDto>, ServiceError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&StoredRestaurant> = tables
            .restaurants
            .values()
            .filter(|s| query.matches(&s.restaurant))
            .collect();
        matching.sort_by(|a, b| query.compare(&a.restaurant, &b.restaurant));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(StoredRestaurant::to_dto)
            .collect())
    }

    async fn count_restaurants(&self, search_phrase: Option<&str>) -> Result<i64, ServiceError> {
        let tables = self.tables.read().await;
        let count = tables
            .restaurants
            .values()
            .filter(|s| matches_phrase(search_phrase, &s.restaurant))
            .count();
        Ok(count as i64)
    }

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> Result<i64, ServiceError> {
        let mut tables = self.tables.write().await;
        tables.last_restaurant_id += 1;
        let id = tables.last_restaurant_id;

        tables.restaurants.insert(
            id,
            StoredRestaurant {
                restaurant: Restaurant {
                    id,
                    name: restaurant.name,
                    description: restaurant.description,
                    category: restaurant.category,
                    has_delivery: restaurant.has_delivery,
                    contact_email: restaurant.contact_email,
                    contact_number: restaurant.contact_number,
                    created_by_id: Some(restaurant.created_by_id),
                },
                address: restaurant.address,
                dishes: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .restaurants
            .get_mut(&restaurant.id)
            .ok_or_else(|| ServiceError::not_found("Restaurant"))?;

        let created_by_id = stored.restaurant.created_by_id;
        stored.restaurant = Restaurant {
            created_by_id,
            ..restaurant.clone()
        };
        Ok(())
    }

    async fn delete_restaurant(&self, id: i64) -> Result<(), ServiceError> {
        let mut tables = self.tables.write().await;
        tables
            .restaurants
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Restaurant"))
    }
}
