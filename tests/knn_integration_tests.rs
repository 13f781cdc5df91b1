use std::sync::Arc;

use proxima::{
    BoundingBox, Euclidean, GeoPoint, Haversine, IndexBuilder, IndexConfig, IndexedPoint,
    PointId, PointSet, SpatialIndex,
};
use rstest::rstest;

fn clients() -> PointSet {
    PointSet::from(vec![
        IndexedPoint::new(1, GeoPoint::new(0.0, 0.0)),
        IndexedPoint::new(2, GeoPoint::new(10.0, 0.0)),
        IndexedPoint::new(3, GeoPoint::new(0.0, 10.0)),
    ])
}

fn build(
    points: PointSet,
    leaf_capacity: usize,
) -> SpatialIndex {
    IndexBuilder::new(IndexConfig::default().with_leaf_capacity(leaf_capacity))
        .build(points)
        .unwrap()
}

/// Тест проверяет пример с ничьей для разных вместимостей листа: порядок
/// ответа не зависит от формы дерева.
#[rstest]
#[case(1, vec![1])]
#[case(2, vec![1, 2])]
#[case(3, vec![1, 2, 3])]
#[case(10, vec![1, 2, 3])]
fn test_worked_example_ranking(
    #[values(1, 2, 16)] leaf_capacity: usize,
    #[case] k: usize,
    #[case] expected: Vec<i64>,
) {
    let index = build(clients(), leaf_capacity);
    let result = index.knn(GeoPoint::new(1.0, 1.0), k);

    let expected: Vec<PointId> = expected.into_iter().map(PointId::Int).collect();
    assert_eq!(result.ids(), expected);
    assert!((result[0].distance - 2f64.sqrt()).abs() < 1e-12);
}

#[rstest]
#[case(GeoPoint::new(0.0, 0.0), 1)]
#[case(GeoPoint::new(10.0, 0.0), 2)]
#[case(GeoPoint::new(0.0, 10.0), 3)]
fn test_coincident_point_has_zero_distance(
    #[case] query: GeoPoint,
    #[case] id: i64,
) {
    let index = build(clients(), 16);
    let nearest = index.knn(query, 1);
    assert_eq!(nearest[0].point.id, PointId::Int(id));
    assert_eq!(nearest[0].distance, 0.0);
}

/// Тест проверяет, что одинаковые координаты у разных `id` допустимы и
/// возвращаются в порядке входа.
#[test]
fn test_colocated_points_follow_input_order() {
    let points: PointSet = ["c", "a", "b"]
        .into_iter()
        .map(|id| IndexedPoint::new(id, GeoPoint::new(5.0, 5.0)))
        .collect();
    let index = build(points, 1);

    let result = index.knn(GeoPoint::new(5.0, 5.0), 3);
    assert_eq!(
        result.ids(),
        vec![PointId::from("c"), PointId::from("a"), PointId::from("b")]
    );
    assert!(result.iter().all(|n| n.distance == 0.0));
}

/// Тест проверяет поиск по реальным координатам с метрикой haversine: на
/// высоких широтах ближайшая по градусам точка не ближайшая по метрам.
#[test]
fn test_haversine_ranks_by_meters() {
    let points = PointSet::from(vec![
        // 1° по долготе на широте 70° ≈ 38 км
        IndexedPoint::new("east", GeoPoint::from_lon_lat(21.0, 70.0)),
        // 0.5° по широте ≈ 55.6 км
        IndexedPoint::new("north", GeoPoint::from_lon_lat(20.0, 70.5)),
    ]);
    let query = GeoPoint::from_lon_lat(20.0, 70.0);

    let planar = IndexBuilder::default().build(points.clone()).unwrap();
    assert_eq!(planar.knn(query, 1)[0].point.id, PointId::from("north"));

    let geo = IndexBuilder::new(IndexConfig::default().with_metric(Arc::new(Haversine::default())))
        .build(points)
        .unwrap();
    let nearest = geo.knn(query, 1);
    assert_eq!(nearest[0].point.id, PointId::from("east"));
    assert!((nearest[0].distance - 38_000.0).abs() < 500.0);
}

#[test]
fn test_within_and_range() {
    let points: PointSet = (0..400)
        .map(|i| IndexedPoint::new(i, GeoPoint::new((i % 20) as f64, (i / 20) as f64)))
        .collect();
    let index = build(points, 8);

    let hits = index.within(GeoPoint::new(10.0, 10.0), 2.0);
    // 13 точек решётки в круге радиуса 2
    assert_eq!(hits.len(), 13);
    assert!(hits.iter().all(|n| n.distance <= 2.0));
    assert_eq!(hits.nearest().unwrap().point.id, PointId::Int(210));

    let boxed = index.range(&BoundingBox::new(-1.0, 1.0, -1.0, 1.0));
    let ids: Vec<PointId> = boxed.into_iter().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec![PointId::Int(0), PointId::Int(1), PointId::Int(20), PointId::Int(21)]
    );
}

#[test]
fn test_empty_index_any_k() {
    let index = SpatialIndex::empty(Arc::new(Euclidean));
    for k in [0, 1, 10, usize::MAX] {
        assert!(index.knn(GeoPoint::new(1.0, 2.0), k).is_empty());
    }
    assert!(index.within(GeoPoint::new(0.0, 0.0), 1e9).is_empty());
    assert!(index.range(&BoundingBox::new(-1e9, 1e9, -1e9, 1e9)).is_empty());
}
