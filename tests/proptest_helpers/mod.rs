#![allow(dead_code)]

use annoreport::model::{
    Annotation, AnnotationId, AnnotationLabel, AnnotationLabelId, ExportArea, Image, ImageId,
    Label, LabelId, LabelTree, LabelTreeId, ShapeKind, Timestamp, User, UserId, Volume, VolumeId,
};
use annoreport::store::{Catalog, CatalogData};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const VOLUME: VolumeId = VolumeId(1);

/// Label chain 1 > 2 > 3 plus the unrelated root 4, all in tree 1.
pub const LABELS: [LabelId; 4] = [LabelId(1), LabelId(2), LabelId(3), LabelId(4)];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// An annotation label as generated: label index, user and minute offset.
#[derive(Clone, Debug)]
pub struct GenLabel {
    pub label: usize,
    pub user: u64,
    pub minute: i64,
}

/// A generated annotation with its labels.
#[derive(Clone, Debug)]
pub struct GenAnnotation {
    pub image: u64,
    pub shape: ShapeKind,
    pub points: Vec<f64>,
    pub labels: Vec<GenLabel>,
}

pub fn arb_coord() -> impl Strategy<Value = f64> {
    // Whole and half pixels make boundary hits likely.
    (-40i32..=80).prop_map(|v| v as f64 / 2.0)
}

pub fn arb_area() -> impl Strategy<Value = ExportArea> {
    (arb_coord(), arb_coord(), arb_coord(), arb_coord())
        .prop_map(|(x1, y1, x2, y2)| ExportArea::from_corners(x1, y1, x2, y2))
}

pub fn arb_geometry() -> BoxedStrategy<(ShapeKind, Vec<f64>)> {
    prop_oneof![
        (arb_coord(), arb_coord()).prop_map(|(x, y)| (ShapeKind::Point, vec![x, y])),
        (arb_coord(), arb_coord(), 1i32..10)
            .prop_map(|(x, y, r)| (ShapeKind::Circle, vec![x, y, r as f64])),
        prop::collection::vec(arb_coord(), 4..=12).prop_map(|mut points| {
            points.truncate(points.len() / 2 * 2);
            (ShapeKind::Polygon, points)
        }),
    ]
    .boxed()
}

pub fn arb_label() -> impl Strategy<Value = GenLabel> {
    (0..LABELS.len(), 1u64..=3, 0i64..30).prop_map(|(label, user, minute)| GenLabel {
        label,
        user,
        minute,
    })
}

pub fn arb_annotation() -> impl Strategy<Value = GenAnnotation> {
    (
        1u64..=3,
        arb_geometry(),
        prop::collection::vec(arb_label(), 1..5),
    )
        .prop_map(|(image, (shape, points), labels)| GenAnnotation {
            image,
            shape,
            points,
            labels,
        })
}

pub fn arb_annotations() -> impl Strategy<Value = Vec<GenAnnotation>> {
    prop::collection::vec(arb_annotation(), 0..40)
}

/// Builds a single-volume catalog holding `annotations`.
///
/// Annotation IDs follow generation order starting at 1. Annotation label
/// IDs are assigned in the same order.
pub fn catalog_for(annotations: &[GenAnnotation], area: Option<ExportArea>) -> Catalog {
    let mut volume = Volume::new(VOLUME, "generated");
    volume.export_area = area;

    let mut data = CatalogData {
        volumes: vec![volume],
        images: (1u64..=3)
            .map(|id| Image::new(id, VOLUME, format!("{id}.jpg")))
            .collect(),
        label_trees: vec![LabelTree {
            id: LabelTreeId(1),
            name: "tree".into(),
        }],
        labels: vec![
            Label::new(LABELS[0], "l1", "000001", 1u64),
            Label::new(LABELS[1], "l2", "000002", 1u64).with_parent(LABELS[0]),
            Label::new(LABELS[2], "l3", "000003", 1u64).with_parent(LABELS[1]),
            Label::new(LABELS[3], "l4", "000004", 1u64),
        ],
        users: (1u64..=3)
            .map(|id| User {
                id: UserId(id),
                firstname: format!("user{id}"),
                lastname: "test".into(),
            })
            .collect(),
        ..Default::default()
    };

    let mut next_label = 1u64;
    for (index, generated) in annotations.iter().enumerate() {
        let id = AnnotationId(index as u64 + 1);
        data.annotations.push(Annotation {
            id,
            image_id: ImageId(generated.image),
            shape: generated.shape,
            points: generated.points.clone(),
            created_at: base_time(),
        });
        for label in &generated.labels {
            data.annotation_labels.push(AnnotationLabel {
                id: AnnotationLabelId(next_label),
                annotation_id: id,
                label_id: LABELS[label.label],
                user_id: UserId(label.user),
                created_at: base_time() + Duration::minutes(label.minute),
            });
            next_label += 1;
        }
    }

    Catalog::new(data).expect("generated catalog is consistent")
}
