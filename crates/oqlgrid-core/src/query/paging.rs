//! Page arithmetic shared by the paging executors.

use oqlgrid_proto::PageRequest;

use crate::error::{Error, Result};

use super::method::{Arguments, QueryMethod};

/// Whether `page` is the first page.
pub fn is_first_page(page: &PageRequest) -> bool {
    page.page_number == 0
}

/// Rows that must be fetched from row 0 to cover `page`.
pub fn result_bound_for_page(page: &PageRequest) -> usize {
    page.page_number
        .saturating_add(1)
        .saturating_mul(page.page_size)
}

/// Index of the first row on `page`.
pub fn start_offset(page: &PageRequest) -> usize {
    page.page_number.saturating_mul(page.page_size)
}

/// Index one past the last row on `page`.
pub fn end_offset(page: &PageRequest) -> usize {
    start_offset(page).saturating_add(page.page_size)
}

/// Whether the method asks for a page rather than a collection or scalar.
pub fn is_paging_requested(method: &QueryMethod) -> bool {
    method.is_page_query()
}

/// The validated page request of a paged invocation.
///
/// Declines with `UnsupportedQueryShape` when the invocation is not paged, so
/// the executor chain can fall through.
pub fn page_request<'a>(method: &QueryMethod, args: &'a Arguments) -> Result<&'a PageRequest> {
    if !is_paging_requested(method) {
        return Err(Error::unsupported(format!(
            "method '{}' does not return a page",
            method.name
        )));
    }
    let page = args.page().ok_or_else(|| {
        Error::unsupported(format!("method '{}' was invoked without a page request", method.name))
    })?;
    if page.page_size == 0 {
        return Err(Error::InvalidPageRequest(
            "page size must be greater than zero".to_string(),
        ));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::method::{EntityMetadata, ReturnShape};

    fn paged_method() -> QueryMethod {
        QueryMethod::new("findAll", EntityMetadata::new("Person"), ReturnShape::Page)
    }

    #[test]
    fn test_offsets() {
        let page = PageRequest::of(5, 10);
        assert!(!is_first_page(&page));
        assert_eq!(start_offset(&page), 50);
        assert_eq!(end_offset(&page), 60);
        assert_eq!(result_bound_for_page(&page), 60);

        let first = PageRequest::first(20);
        assert!(is_first_page(&first));
        assert_eq!(start_offset(&first), 0);
        assert_eq!(result_bound_for_page(&first), 20);
    }

    #[test]
    fn test_offsets_saturate() {
        let page = PageRequest::of(usize::MAX, 2);
        assert_eq!(result_bound_for_page(&page), usize::MAX);
        assert_eq!(end_offset(&page), usize::MAX);
    }

    #[test]
    fn test_paging_requested_only_for_page_shape() {
        assert!(is_paging_requested(&paged_method()));
        let collection =
            QueryMethod::new("findAll", EntityMetadata::new("Person"), ReturnShape::Collection);
        assert!(!is_paging_requested(&collection));
    }

    #[test]
    fn test_page_request_validation() {
        let method = paged_method();

        let args = Arguments::none();
        assert!(page_request(&method, &args).unwrap_err().is_decline());

        let args = Arguments::none().with_page(PageRequest::of(1, 0));
        assert!(matches!(
            page_request(&method, &args),
            Err(Error::InvalidPageRequest(_))
        ));

        let args = Arguments::none().with_page(PageRequest::of(1, 5));
        assert_eq!(page_request(&method, &args).unwrap(), &PageRequest::of(1, 5));
    }
}
