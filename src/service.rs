use tracing::{info, instrument, warn};

use crate::{
    auth::Principal,
    authorization::resource::{self, ResourceOperation},
    errors::ServiceError,
    models::{CreateRestaurantRequest, ModifyRestaurantRequest, PageResult, Restaurant, RestaurantDto},
    query::RestaurantQuery,
    repository::RepositoryState,
};

/// RestaurantService
///
/// The single entry point for reading and mutating restaurants. Reads are public;
/// `modify` and `delete` load the target first and consult the permission evaluator
/// before anything is written.
#[derive(Clone)]
pub struct RestaurantService {
    repo: RepositoryState,
}

impl RestaurantService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// Creates the restaurant owned by `principal`. Role restrictions are applied by the
    /// caller before this point.
    #[instrument(skip(self, request, principal), fields(user_id = principal.id))]
    pub async fn create(
        &self,
        request: CreateRestaurantRequest,
        principal: &Principal,
    ) -> Result<i64, ServiceError> {
        request.validate()?;
        let id = self
            .repo
            .create_restaurant(request.into_new_restaurant(principal.id))
            .await?;
        info!(restaurant_id = id, "restaurant created");
        Ok(id)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<RestaurantDto, ServiceError> {
        self.repo
            .get_restaurant_details(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Restaurant"))
    }

    /// get_all
    ///
    /// Validates the query, fetches the requested page and counts every match of the
    /// same filter separately, so `total_count` does not depend on paging.
    pub async fn get_all(&self, query: RestaurantQuery) -> Result<PageResult<RestaurantDto>, ServiceError> {
        let query = query.validate()?;
        let items = self.repo.search_restaurants(&query).await?;
        let total_count = self.repo.count_restaurants(query.search_phrase()).await?;
        Ok(PageResult::new(items, total_count, query.page_size, query.page_number))
    }

    #[instrument(skip(self, request, principal), fields(user_id = principal.id))]
    pub async fn modify(
        &self,
        id: i64,
        request: ModifyRestaurantRequest,
        principal: &Principal,
    ) -> Result<(), ServiceError> {
        let mut restaurant = self.load(id).await?;
        authorize(principal, &restaurant, ResourceOperation::Modify)?;

        request.validate()?;
        request.apply_to(&mut restaurant);
        self.repo.update_restaurant(&restaurant).await?;
        info!(restaurant_id = id, "restaurant modified");
        Ok(())
    }

    #[instrument(skip(self, principal), fields(user_id = principal.id))]
    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        warn!("Restaurant with id: {} DELETE action invoked", id);
        let restaurant = self.load(id).await?;
        authorize(principal, &restaurant, ResourceOperation::Delete)?;

        self.repo.delete_restaurant(id).await
    }

    async fn load(&self, id: i64) -> Result<Restaurant, ServiceError> {
        self.repo
            .get_restaurant(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Restaurant"))
    }
}

fn authorize(
    principal: &Principal,
    restaurant: &Restaurant,
    operation: ResourceOperation,
) -> Result<(), ServiceError> {
    if resource::evaluate(principal, restaurant, operation).succeeded() {
        Ok(())
    } else {
        info!(restaurant_id = restaurant.id, ?operation, "operation denied");
        Err(ServiceError::Forbidden)
    }
}
