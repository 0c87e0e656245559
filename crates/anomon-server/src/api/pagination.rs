use anomon_storage::{PageRequest, Sort, StorageError};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use utoipa::IntoParams;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = anomon_storage::store::MAX_PAGE_SIZE;

/// Filter, ordering and paging shared by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive substring match on the name
    #[param(required = false)]
    #[serde(default)]
    pub filter: Option<String>,
    /// Column to order by
    #[param(required = false)]
    #[serde(default)]
    pub sort_field: Option<String>,
    /// `asc` (default) or `desc`
    #[param(required = false)]
    #[serde(default)]
    pub sort_order: Option<String>,
    /// 1-indexed page (default 1)
    #[param(required = false)]
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub page_no: Option<u64>,
    /// Rows per page (default 10, max 1000)
    #[param(required = false)]
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum U64Input {
    Number(u64),
    Text(String),
}

pub(crate) fn deserialize_optional_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<U64Input>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(U64Input::Number(number)) => Ok(Some(number)),
        Some(U64Input::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(U64Input::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(DeError::custom),
    }
}

impl ListParams {
    /// Page window; zero values and oversized pages are rejected.
    pub fn page(&self) -> Result<PageRequest, String> {
        let page_no = self.page_no.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_no == 0 {
            return Err("page_no must be at least 1".to_string());
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {MAX_PAGE_SIZE}"));
        }
        let page = PageRequest { page_no, page_size };
        if page.offset().is_none() {
            return Err(format!("page_no {page_no} is out of range"));
        }
        Ok(page)
    }

    pub fn sort<F>(&self) -> Result<Sort<F>, String>
    where
        F: FromStr<Err = StorageError> + Default,
    {
        Sort::parse(self.sort_field.as_deref(), self.sort_order.as_deref()).map_err(|e| match e {
            StorageError::InvalidSort(msg) => msg,
            other => other.to_string(),
        })
    }

    pub fn filter(&self) -> Option<String> {
        self.filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anomon_storage::{RuleSortField, SortOrder};

    #[test]
    fn defaults() {
        let page = ListParams::default().page().unwrap();
        assert_eq!(page, PageRequest { page_no: 1, page_size: 10 });
    }

    #[test]
    fn zero_and_oversized_pages_rejected() {
        let p = ListParams { page_no: Some(0), ..Default::default() };
        assert!(p.page().is_err());
        let p = ListParams { page_size: Some(0), ..Default::default() };
        assert!(p.page().is_err());
        let p = ListParams { page_size: Some(1001), ..Default::default() };
        assert!(p.page().is_err());
        let p = ListParams { page_size: Some(1000), ..Default::default() };
        assert!(p.page().is_ok());
    }

    #[test]
    fn page_past_addressable_offset_rejected() {
        let p = ListParams { page_no: Some(u64::MAX), ..Default::default() };
        assert!(p.page().is_err());
        let p = ListParams {
            page_no: Some(i64::MAX as u64 / 1000 + 2),
            page_size: Some(1000),
            ..Default::default()
        };
        assert!(p.page().is_err());
        let p = ListParams { page_no: Some(1_000_000), page_size: Some(1000), ..Default::default() };
        assert!(p.page().is_ok());
    }

    #[test]
    fn sort_whitelist() {
        let p = ListParams {
            sort_field: Some("update_time".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let sort = p.sort::<RuleSortField>().unwrap();
        assert_eq!(sort.field, RuleSortField::UpdatedAt);
        assert_eq!(sort.order, SortOrder::Desc);

        let p = ListParams { sort_field: Some("1; DROP TABLE rules".into()), ..Default::default() };
        assert!(p.sort::<RuleSortField>().is_err());
    }

    #[test]
    fn blank_filter_is_none() {
        let p = ListParams { filter: Some("  ".into()), ..Default::default() };
        assert_eq!(p.filter(), None);
    }
}
