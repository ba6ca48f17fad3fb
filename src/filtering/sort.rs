use sea_orm::Order;

/// Convert sort order string to Order enum. Anything but `desc` is ascending.
fn parse_order(sort_order: &str) -> Order {
    if sort_order.trim().eq_ignore_ascii_case("desc") {
        Order::Desc
    } else {
        Order::Asc
    }
}

/// Find an allow-listed column by name, ignoring ASCII case
fn find_column<C: Copy>(column_name: &str, columns: &[(&str, C)]) -> Option<C> {
    let column_name = column_name.trim();
    columns
        .iter()
        .find(|&&(col_name, _)| col_name.eq_ignore_ascii_case(column_name))
        .map(|&(_, col)| col)
}

/// Resolve `sort`/`order` against an allow-list.
///
/// An allow-listed column is used with the requested direction (`asc` when
/// the direction is missing or unrecognized). A missing or unlisted column
/// falls back to the entity default, direction included.
pub fn resolve_sort<C: Copy>(
    sort: Option<&str>,
    order: Option<&str>,
    sortable: &[(&str, C)],
    default: (C, Order),
) -> (C, Order) {
    match sort.and_then(|name| find_column(name, sortable)) {
        Some(column) => (column, order.map_or(Order::Asc, parse_order)),
        None => {
            if let Some(name) = sort {
                tracing::debug!(sort = name, "Unsortable column requested, using default ordering");
            }
            default
        }
    }
}
