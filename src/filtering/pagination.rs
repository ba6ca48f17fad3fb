pub const MIN_PER_PAGE: u64 = 1;
pub const MAX_PER_PAGE: u64 = 100;
pub const DEFAULT_PER_PAGE: u64 = 15;

/// A resolved page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Resolve `page`/`per_page` parameters. Missing or malformed sizes use
    /// `default_per_page`; sizes are clamped to `[MIN_PER_PAGE, MAX_PER_PAGE]`.
    #[must_use]
    pub fn resolve(page: Option<&str>, per_page: Option<&str>, default_per_page: u64) -> Self {
        Self {
            page: parse_page(page),
            per_page: clamp_per_page(per_page, default_per_page),
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Clamp a requested page size into `[MIN_PER_PAGE, MAX_PER_PAGE]`.
#[must_use]
pub fn clamp_per_page(raw: Option<&str>, default_per_page: u64) -> u64 {
    let requested = raw.and_then(|value| value.trim().parse::<i64>().ok());
    match requested {
        Some(size) => u64::try_from(size.max(0))
            .unwrap_or(MIN_PER_PAGE)
            .clamp(MIN_PER_PAGE, MAX_PER_PAGE),
        None => default_per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE),
    }
}

/// 1-based page number; anything missing, malformed or below 1 is page 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}
