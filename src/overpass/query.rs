//! Overpass QL templates.

/// Escape a value for use inside a double-quoted Overpass QL string
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Query for every boundary relation named `location` inside the area named
/// `country`, recursed down to its member ways and nodes.
pub fn build_boundary_query(country: &str, location: &str) -> String {
    format!(
        r#"[out:json];
area[name="{}"];
(
relation["type"="boundary"]["name"="{}"](area);
);
(._;>;);
out body;
"#,
        escape(country),
        escape(location)
    )
}
