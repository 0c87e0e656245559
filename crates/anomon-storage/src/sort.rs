use std::str::FromStr;

use crate::entities::{analysis, rule};
use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(StorageError::InvalidSort(format!("unknown sort order: {s}"))),
        }
    }
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

/// Columns a rule listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSortField {
    Id,
    #[default]
    Name,
    Expression,
    Severity,
    Duration,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for RuleSortField {
    type Err = StorageError;

    /// `create_time` and `update_time` are accepted as aliases for the
    /// timestamp columns.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "expression" => Ok(Self::Expression),
            "severity" => Ok(Self::Severity),
            "duration" => Ok(Self::Duration),
            "created_at" | "create_time" => Ok(Self::CreatedAt),
            "updated_at" | "update_time" => Ok(Self::UpdatedAt),
            other => Err(StorageError::InvalidSort(format!(
                "unknown rule sort field: {other}"
            ))),
        }
    }
}

impl RuleSortField {
    pub(crate) fn column(self) -> rule::Column {
        match self {
            Self::Id => rule::Column::Id,
            Self::Name => rule::Column::Name,
            Self::Expression => rule::Column::Expression,
            Self::Severity => rule::Column::Severity,
            Self::Duration => rule::Column::Duration,
            Self::CreatedAt => rule::Column::CreatedAt,
            Self::UpdatedAt => rule::Column::UpdatedAt,
        }
    }
}

/// Columns an analysis listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisSortField {
    Id,
    RuleId,
    #[default]
    RuleName,
    Status,
    Count,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for AnalysisSortField {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "rule_id" => Ok(Self::RuleId),
            "rule_name" => Ok(Self::RuleName),
            "status" => Ok(Self::Status),
            "count" => Ok(Self::Count),
            "created_at" | "create_time" => Ok(Self::CreatedAt),
            "updated_at" | "update_time" => Ok(Self::UpdatedAt),
            other => Err(StorageError::InvalidSort(format!(
                "unknown analysis sort field: {other}"
            ))),
        }
    }
}

impl AnalysisSortField {
    pub(crate) fn column(self) -> analysis::Column {
        match self {
            Self::Id => analysis::Column::Id,
            Self::RuleId => analysis::Column::RuleId,
            Self::RuleName => analysis::Column::RuleName,
            Self::Status => analysis::Column::Status,
            Self::Count => analysis::Column::Count,
            Self::CreatedAt => analysis::Column::CreatedAt,
            Self::UpdatedAt => analysis::Column::UpdatedAt,
        }
    }
}

/// Ordering for a listing. Defaults to the entity's default field, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F: FromStr<Err = StorageError> + Default> Sort<F> {
    /// Parses optional caller-supplied field and order, falling back to the
    /// defaults for whichever is absent or empty.
    ///
    /// ```
    /// use anomon_storage::{RuleSortField, Sort, SortOrder};
    ///
    /// let sort = Sort::<RuleSortField>::parse(Some("create_time"), Some("DESC")).unwrap();
    /// assert_eq!(sort.field, RuleSortField::CreatedAt);
    /// assert_eq!(sort.order, SortOrder::Desc);
    /// assert!(Sort::<RuleSortField>::parse(Some("name; drop table rules"), None).is_err());
    /// ```
    pub fn parse(field: Option<&str>, order: Option<&str>) -> Result<Self, StorageError> {
        let field = match field.map(str::trim).filter(|f| !f.is_empty()) {
            Some(f) => f.parse()?,
            None => F::default(),
        };
        let order = match order.map(str::trim).filter(|o| !o.is_empty()) {
            Some(o) => o.parse()?,
            None => SortOrder::default(),
        };
        Ok(Self { field, order })
    }
}
