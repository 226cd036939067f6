use crate::models::Filters;

/// Default search page the deep link points at
pub const DEFAULT_LINK_BASE: &str = "https://evengo.space/search";

/// Render an integral number without a fractional part
pub(crate) fn fmt_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Build the canonical deep link for a filter set
///
/// Keys appear in a fixed order (city, district, date, guest_count,
/// price_per_guest_max, cuisine) followed by comma-joined features. Only
/// keys present in `filters` are emitted.
pub fn build_link(base_url: &str, filters: &Filters) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if let Some(city) = &filters.city {
        params.push(("city", city.clone()));
    }
    if let Some(district) = &filters.district {
        params.push(("district", district.clone()));
    }
    if let Some(date) = &filters.date {
        params.push(("date", date.clone()));
    }
    params.push(("guest_count", filters.guest_count.to_string()));
    if let Some(price) = filters.price_per_guest_max {
        params.push(("price_per_guest_max", fmt_number(price)));
    }
    if let Some(cuisine) = &filters.cuisine {
        params.push(("cuisine", cuisine.clone()));
    }

    let mut query: Vec<String> = params
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
        .collect();

    if !filters.features.is_empty() {
        let joined = filters
            .features
            .iter()
            .map(|f| urlencoding::encode(f).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        query.push(format!("features={}", joined));
    }

    format!("{}?{}", base_url, query.join("&"))
}
