//! Force a package to an exact slide count.

use crate::package::{SlidePackage, StructuralMutationWarning};
use crate::placeholder;
use deck_core::{Error, Result};
use serde::Serialize;

/// Outcome of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub before: usize,
    pub after: usize,
    /// Part names of removed slides, last slide first.
    pub removed: Vec<String>,
    /// Part names of added slides.
    pub added: Vec<String>,
    /// Inconsistencies found on load or while removing.
    pub warnings: Vec<StructuralMutationWarning>,
}

/// Add or remove slides until the package holds exactly `target` slides.
///
/// Surplus slides are removed from the end. Missing slides are appended on
/// the package's best layout. A package without layouts cannot grow and is
/// rejected before anything changes.
pub fn normalize(pkg: &mut SlidePackage, target: usize) -> Result<NormalizeReport> {
    let before = pkg.slide_count();
    let mut report = NormalizeReport {
        before,
        ..Default::default()
    };

    let layout_part = if before < target {
        let layout = placeholder::best_layout(pkg).ok_or_else(|| {
            Error::InvalidPackage("Package has no slide layouts to add slides from".to_string())
        })?;
        Some(layout.part_name().to_string())
    } else {
        None
    };

    while pkg.slide_count() > target {
        let Some(removal) = pkg.remove_slide(pkg.slide_count() - 1) else {
            break;
        };
        report.removed.push(removal.part_name);
    }

    if let Some(layout_part) = layout_part {
        while pkg.slide_count() < target {
            let index = pkg.add_slide(&layout_part)?;
            if let Some(slide) = pkg.slide(index) {
                report.added.push(slide.part_name().to_string());
            }
        }
    }

    report.after = pkg.slide_count();
    report.warnings = pkg.take_warnings();

    if report.before != report.after {
        log::info!(
            "Normalized deck from {} to {} slides ({} removed, {} added)",
            report.before,
            report.after,
            report.removed.len(),
            report.added.len()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{WIDESCREEN_CX, WIDESCREEN_CY};

    fn package_with(slides: usize) -> SlidePackage {
        let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        let layout = pkg.layouts()[0].part_name().to_string();
        for _ in 0..slides {
            pkg.add_slide(&layout).unwrap();
        }
        pkg
    }

    #[test]
    fn test_shrinks_from_the_end() {
        let mut pkg = package_with(7);
        let report = normalize(&mut pkg, 5).unwrap();

        assert_eq!(pkg.slide_count(), 5);
        assert_eq!(report.before, 7);
        assert_eq!(report.after, 5);
        assert_eq!(report.removed, vec!["ppt/slides/slide7.xml", "ppt/slides/slide6.xml"]);
        assert!(report.added.is_empty());
        assert_eq!(pkg.slide_ids(), vec![256, 257, 258, 259, 260]);
    }

    #[test]
    fn test_grows_on_best_layout() {
        let mut pkg = package_with(2);
        let report = normalize(&mut pkg, 5).unwrap();

        assert_eq!(pkg.slide_count(), 5);
        assert_eq!(report.added.len(), 3);
        assert!(pkg
            .slides()
            .all(|s| s.layout_part() == Some("ppt/slideLayouts/slideLayout1.xml")));
    }

    #[test]
    fn test_equal_count_is_noop() {
        let mut pkg = package_with(5);
        let ids = pkg.slide_ids();
        let report = normalize(&mut pkg, 5).unwrap();
        assert_eq!(report, NormalizeReport { before: 5, after: 5, ..Default::default() });
        assert_eq!(pkg.slide_ids(), ids);
    }

    #[test]
    fn test_normalize_to_zero_empties_the_deck() {
        let mut pkg = package_with(3);
        normalize(&mut pkg, 0).unwrap();
        assert_eq!(pkg.slide_count(), 0);

        let reloaded = SlidePackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.slide_count(), 0);
    }
}
