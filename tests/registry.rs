//! Exhaustive checks of the report type registry.

use annoreport::report::registry::{self, DECLARED};
use annoreport::report::{ReportType, SourceKind};
use annoreport::restriction::ReportOptions;
use annoreport::ReportError;

#[test]
fn every_source_and_type_combination_resolves_to_its_generator() {
    for kind in SourceKind::ALL {
        for report_type in ReportType::ALL {
            let factory = registry::resolve(kind, report_type.name())
                .unwrap_or_else(|| panic!("{kind} / {report_type} is not resolvable"));
            let generator = factory.build(&ReportOptions::default()).unwrap();
            assert_eq!(generator.source_kind(), kind);
            assert_eq!(generator.report_type(), report_type);
        }
    }
    assert_eq!(DECLARED.len(), SourceKind::ALL.len() * ReportType::ALL.len());
}

#[test]
fn undeclared_names_are_absent() {
    for name in ["", "annotations", "Annotations-Basic", "annotations_basic", "area-report"] {
        for kind in SourceKind::ALL {
            assert!(registry::resolve(kind, name).is_none(), "{name:?} resolved");
            match registry::require(kind, name) {
                Err(ReportError::UnknownReportType { source_kind, name: n }) => {
                    assert_eq!(source_kind, kind);
                    assert_eq!(n, name);
                }
                other => panic!("expected UnknownReportType, got {other:?}"),
            }
        }
    }
}

#[test]
fn report_metadata_matches_type_table() {
    let table = [
        ("annotations-basic", "basic_annotation_report", "pdf", "basic_report"),
        ("annotations-extended", "extended_annotation_report", "xlsx", "extended_report"),
        ("annotations-full", "full_annotation_report", "xlsx", "full_report"),
        ("annotations-csv", "csv_annotation_report", "csv", "csv_report"),
        ("image-labels-basic", "basic_image_label_report", "xlsx", "basic_image_label_report"),
        ("image-labels-csv", "csv_image_label_report", "csv", "csv_report"),
        (
            "image-labels-location",
            "image_location_image_label_report",
            "ndjson",
            "image_location_report",
        ),
    ];
    for (name, filename, extension, script) in table {
        let report_type = ReportType::from_name(name).unwrap();
        assert_eq!(report_type.base_filename(), filename);
        assert_eq!(report_type.extension(), extension);
        assert_eq!(report_type.script(), script);
    }
}

#[test]
fn image_label_types_do_not_report_annotations() {
    let annotation_types: Vec<_> = ReportType::ALL
        .into_iter()
        .filter(ReportType::reports_annotations)
        .map(|t| t.name())
        .collect();
    assert!(annotation_types.iter().all(|n| n.starts_with("annotations-")));
    assert_eq!(annotation_types.len(), 4);
}

#[test]
fn image_location_report_is_declared_for_volumes_and_projects() {
    for kind in SourceKind::ALL {
        let factory = registry::require(kind, "image-labels-location").unwrap();
        assert_eq!(factory.report_type(), ReportType::ImageLabelsLocation);
    }
    assert_eq!(
        ReportType::ImageLabelsLocation.base_name(),
        "image location image label report"
    );
    assert!(!ReportType::ImageLabelsLocation.reports_annotations());
}
