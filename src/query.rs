use std::{cmp::Ordering, str::FromStr};

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::{errors::ServiceError, models::Restaurant};

/// RestaurantQuery
///
/// Raw query parameters accepted by `GET /api/restaurant`. Everything is optional at
/// this level so that missing or unknown values surface as `InvalidArgument` from
/// `validate` instead of a generic extractor rejection.
#[derive(Debug, Clone, Deserialize, Serialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct RestaurantQuery {
    /// Case-insensitive phrase matched against name and description.
    pub search_phrase: Option<String>,
    /// One of `Name`, `Description`, `Category`.
    pub sort_by: Option<String>,
    /// `Ascending` (default) or `Descending`.
    pub sort_direction: Option<String>,
    /// Required, at least 1.
    pub page_size: Option<i64>,
    /// 1-based, defaults to 1.
    pub page_number: Option<i64>,
}

impl RestaurantQuery {
    /// A query for one page with no filter and no sort.
    pub fn page(page_size: i64, page_number: i64) -> Self {
        Self {
            page_size: Some(page_size),
            page_number: Some(page_number),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn sql_keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            _ => Err(ServiceError::invalid(format!(
                "sort_direction must be Ascending or Descending (got '{}')",
                value
            ))),
        }
    }
}

/// SortBy
///
/// The closed set of sortable columns. Each key owns both its comparator (for
/// in-memory ordering) and its column name (for SQL ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum SortBy {
    Name,
    Description,
    Category,
}

impl SortBy {
    /// Byte-wise comparison, so `"Zeta"` sorts before `"alpha"`.
    pub fn compare(self, a: &Restaurant, b: &Restaurant) -> Ordering {
        match self {
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::Description => a.description.cmp(&b.description),
            SortBy::Category => a.category.cmp(&b.category),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortBy::Name => "name",
            SortBy::Description => "description",
            SortBy::Category => "category",
        }
    }
}

impl FromStr for SortBy {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "name" => Ok(SortBy::Name),
            "description" => Ok(SortBy::Description),
            "category" => Ok(SortBy::Category),
            _ => Err(ServiceError::invalid(format!(
                "sort_by must be one of Name, Description, Category (got '{}')",
                value
            ))),
        }
    }
}

/// ListQuery
///
/// A `RestaurantQuery` that passed validation. Both repository implementations derive
/// their filtering, ordering and paging from this value.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub search_phrase: Option<String>,
    pub sort: Option<(SortBy, SortDirection)>,
    pub page_size: i64,
    pub page_number: i64,
}

impl RestaurantQuery {
    pub fn validate(self) -> Result<ListQuery, ServiceError> {
        let page_size = self
            .page_size
            .ok_or_else(|| ServiceError::invalid("page_size is required"))?;
        if page_size < 1 {
            return Err(ServiceError::invalid("page_size must be a positive integer"));
        }
        let page_number = self.page_number.unwrap_or(1);
        if page_number < 1 {
            return Err(ServiceError::invalid("page_number must be a positive integer"));
        }

        let direction = match self.sort_direction.as_deref() {
            None | Some("") => SortDirection::default(),
            Some(raw) => raw.parse()?,
        };
        let sort = match self.sort_by.as_deref() {
            None | Some("") => None,
            Some(raw) => Some((raw.parse::<SortBy>()?, direction)),
        };

        Ok(ListQuery {
            search_phrase: self.search_phrase.filter(|phrase| !phrase.is_empty()),
            sort,
            page_size,
            page_number,
        })
    }
}

impl ListQuery {
    pub fn search_phrase(&self) -> Option<&str> {
        self.search_phrase.as_deref()
    }

    /// Number of matching items skipped before the requested page. Saturates, so a page
    /// far past the end is simply empty.
    pub fn offset(&self) -> i64 {
        page_offset(self.page_size, self.page_number)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        matches_phrase(self.search_phrase(), restaurant)
    }

    /// Full ordering used for paging: the requested column (if any), then `id` ascending.
    pub fn compare(&self, a: &Restaurant, b: &Restaurant) -> Ordering {
        let primary = match self.sort {
            Some((column, direction)) => direction.apply(column.compare(a, b)),
            None => Ordering::Equal,
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

pub(crate) fn page_offset(page_size: i64, page_number: i64) -> i64 {
    page_number.saturating_sub(1).max(0).saturating_mul(page_size)
}

/// Case-insensitive substring match on name or description. No phrase matches everything.
pub fn matches_phrase(phrase: Option<&str>, restaurant: &Restaurant) -> bool {
    match phrase {
        None => true,
        Some(phrase) => {
            let needle = phrase.to_lowercase();
            restaurant.name.to_lowercase().contains(&needle)
                || restaurant.description.to_lowercase().contains(&needle)
        }
    }
}
