//! A fixed catalog of example segments
//!
//! Streets around the Technion campus in Haifa, as (lat, lon) in millionths of
//! a degree. Front ends offer these for the user to pick from when assembling
//! a route.

use crate::types::{GeoPoint, GeoSegment, TypeError};

const POINTS: [(i32, i32, &str); 14] = [
    (32_782_269, 35_013_820, "Hankin Road, Natan Komoi & A.D. Gordon"),
    (32_783_098, 35_014_528, "Ziv Square"),
    (32_785_295, 35_017_833, "Trumpeldor Avenue & Hanita"),
    (32_787_081, 35_020_735, "Trumpeldor Avenue & Hagalil"),
    (32_789_768, 35_018_578, "Water Tower (Hagalil)"),
    (32_795_631, 35_010_296, "Hagalil & Hanita"),
    (32_786_801, 35_016_991, "Hanita & Simha Golan Road"),
    (32_789_205, 35_008_467, "Grand Canyon Shopping Center"),
    (32_790_170, 35_003_944, "Simha Golan Road & Ruppin Road"),
    (32_787_419, 34_999_041, "Hankin Road & Ruppin Road"),
    (32_784_334, 35_003_381, "Hankin Road & Moshe Got Levin"),
    (32_782_241, 35_008_821, "International & Hankin Road"),
    (32_778_200, 35_010_097, "International & Me'ir Ya'ari"),
    (32_779_939, 35_013_248, "Me'ir Ya'ari & Natan Komoi"),
];

/// (street name, start point index, end point index)
const SEGMENTS: [(&str, usize, usize); 16] = [
    ("Hankin Road", 0, 1),
    ("Trumpeldor Avenue", 1, 2),
    ("Trumpeldor Avenue", 2, 3),
    ("Hagalil", 3, 4),
    ("Hagalil", 4, 5),
    ("Hanita", 5, 6),
    ("Hanita", 6, 2),
    ("Simha Golan Road", 6, 7),
    ("Simha Golan Road", 7, 8),
    ("Ruppin Road", 8, 9),
    ("Hankin Road", 9, 10),
    ("Hankin Road", 10, 11),
    ("Hankin Road", 11, 0),
    ("International", 11, 12),
    ("Me'ir Ya'ari", 12, 13),
    ("Natan Komoi", 13, 0),
];

/// A landmark point of the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Landmark {
    pub point: GeoPoint,
    pub description: &'static str,
}

/// All catalog points, in catalog order.
pub fn landmarks() -> Result<Vec<Landmark>, TypeError> {
    POINTS
        .iter()
        .map(|&(lat, lon, description)| {
            Ok(Landmark {
                point: GeoPoint::new(lat, lon)?,
                description,
            })
        })
        .collect()
}

/// All catalog segments, in catalog order.
pub fn segments() -> Result<Vec<GeoSegment>, TypeError> {
    SEGMENTS.iter().map(build_segment).collect()
}

/// Look up a single catalog segment by its index.
pub fn segment(index: usize) -> Result<Option<GeoSegment>, TypeError> {
    SEGMENTS.get(index).map(build_segment).transpose()
}

fn build_segment(&(name, from, to): &(&str, usize, usize)) -> Result<GeoSegment, TypeError> {
    let (lat1, lon1, _) = POINTS[from];
    let (lat2, lon2, _) = POINTS[to];
    GeoSegment::new(name, GeoPoint::new(lat1, lon1)?, GeoPoint::new(lat2, lon2)?)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::route::Route;

    #[test]
    fn test_catalog_is_valid() -> Result<()> {
        assert_eq!(landmarks()?.len(), 14);
        let segments = segments()?;
        assert_eq!(segments.len(), 16);
        assert!(segments.iter().all(|s| !s.is_zero_length()));
        Ok(())
    }

    #[test]
    fn test_catalog_segments_share_landmarks() -> Result<()> {
        let landmarks = landmarks()?;
        for seg in segments()? {
            assert!(landmarks.iter().any(|l| l.point == seg.p1()));
            assert!(landmarks.iter().any(|l| l.point == seg.p2()));
        }
        Ok(())
    }

    #[test]
    fn test_catalog_loop() -> Result<()> {
        // Around the block: Hankin, Trumpeldor, then back down Hanita, which
        // the catalog lists in the opposite direction.
        let picks = [0, 1, 6];
        let route = Route::from_segments(
            picks
                .iter()
                .map(|&i| segment(i))
                .collect::<std::result::Result<Option<Vec<_>>, _>>()?
                .ok_or(anyhow::anyhow!("missing catalog segment"))?,
        )?;
        assert_eq!(route.len(), 3);
        assert_eq!(route.num_features(), 3);
        assert_eq!(route.end(), landmarks()?[6].point);
        Ok(())
    }

    #[test]
    fn test_segment_out_of_range() -> Result<()> {
        assert_eq!(segment(16)?, None);
        assert!(segment(15)?.is_some());
        Ok(())
    }

    #[test]
    fn test_segment_matches_listing() -> Result<()> {
        for (i, seg) in segments()?.into_iter().enumerate() {
            assert_eq!(segment(i)?, Some(seg));
        }
        Ok(())
    }
}
