//! Exports intended for internal use only.
//!
//! These need to be exported for access from the main CLI, but they are not
//! intended for use by external code. This module's API may change without
//! semantic versioning!

use std::fmt::Write;

use thiserror::Error;

use crate::catalog;
use crate::route::Route;
use crate::types::TypeError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Catalog error")]
    Catalog(#[from] TypeError),
    #[error("Formatting error")]
    Fmt(#[from] std::fmt::Error),
}

/// Render the example catalog as an indexed listing, one segment per line.
pub fn catalog_report() -> Result<String, ReportError> {
    let mut r = String::new();
    for (i, seg) in catalog::segments()?.iter().enumerate() {
        writeln!(&mut r, "{i:>3}  {seg}")?;
    }
    Ok(r)
}

/// Summarize an assembled route, one feature per line.
pub fn route_report(route: &Route) -> Result<String, std::fmt::Error> {
    let mut r = String::new();
    writeln!(
        &mut r,
        "{} segments in {} features, {:.1} in total",
        route.len(),
        route.num_features(),
        route.length()
    )?;
    for feature in route.geo_features() {
        writeln!(
            &mut r,
            "  {} ({} segments)",
            feature,
            feature.num_segments()
        )?;
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    #[test]
    fn test_catalog_report() -> Result<()> {
        let report = catalog_report()?;
        assert_eq!(report.lines().count(), 16);
        assert!(report.starts_with("  0  Hankin Road from (32.782269 N, 35.013820 E)"));
        Ok(())
    }

    #[test]
    fn test_route_report() -> Result<()> {
        let route = Route::from_segments(catalog::segments()?.into_iter().take(3))?;
        let report = route_report(&route)?;
        let lines = report.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("3 segments in 2 features"));
        assert!(lines[2].ends_with("(2 segments)"));
        Ok(())
    }
}
