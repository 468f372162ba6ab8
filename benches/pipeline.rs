use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use curriculum_tree::colors::exam_subject_colors;
use curriculum_tree::layout::{enforce_hierarchical_order, layout_tree, resolve_node_overlaps};
use curriculum_tree::status::AllTodo;
use curriculum_tree::tree::subject_order;
use curriculum_tree::{Catalog, Config, GraphView, LayoutConfig, build_tree, normalize_catalog};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::hint::black_box;

fn synthetic_catalog(subjects: usize, modules: usize, courses: usize) -> Catalog {
    let sections: Vec<Value> = (0..subjects)
        .map(|s| {
            let modules: Vec<Value> = (0..modules)
                .map(|m| {
                    // Every third module has a single course and flattens.
                    let count = if m % 3 == 0 { 1 } else { courses };
                    let courses: Vec<Value> = (0..count)
                        .map(|c| {
                            let kind = ["VO", "UE", "VU", "PR", "SE"][c % 5];
                            json!({
                                "code": format!("{kind}-{s}{m:02}{c}"),
                                "name": format!("Course {s}.{m}.{c}"),
                                "ects": 1.5 + (c % 4) as f32 * 1.5,
                            })
                        })
                        .collect();
                    json!({
                        "code": format!("M{s}-{m}"),
                        "name": format!("Module {s}.{m}"),
                        "category": ["mandatory", "core", "elective"][m % 3],
                        "courses": courses,
                    })
                })
                .collect();
            json!({ "pruefungsfach": format!("Subject {s}"), "modules": modules })
        })
        .collect();
    normalize_catalog(&json!({ "sections": sections }))
}

const SIZES: [(&str, usize, usize, usize); 3] = [
    ("small", 3, 4, 3),
    ("medium", 8, 10, 4),
    ("large", 16, 20, 6),
];

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (name, subjects, modules, courses) in SIZES {
        let catalog = synthetic_catalog(subjects, modules, courses);
        let tree = build_tree(&catalog, &exam_subject_colors(&catalog.subject_names()));
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, tree| {
            b.iter(|| {
                let layout = layout_tree(black_box(tree), &BTreeSet::new(), &AllTodo, &config);
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_position_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("position_passes");
    let config = LayoutConfig::default();
    for (name, subjects, modules, courses) in SIZES {
        let catalog = synthetic_catalog(subjects, modules, courses);
        let tree = build_tree(&catalog, &exam_subject_colors(&catalog.subject_names()));
        let order = subject_order(&tree);
        let layout = layout_tree(&tree, &BTreeSet::new(), &AllTodo, &config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &layout.nodes, |b, nodes| {
            b.iter(|| {
                let swept = resolve_node_overlaps(black_box(nodes.clone()), &config);
                let ordered = enforce_hierarchical_order(swept, &order, &BTreeSet::new(), &config);
                black_box(ordered.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    for (name, subjects, modules, courses) in SIZES {
        let catalog = synthetic_catalog(subjects, modules, courses);
        let mut view = GraphView::new(catalog, "033 521", Config::default());
        view.expand_all();
        let collapsible: Vec<String> = view.collapse().universe().iter().take(4).cloned().collect();
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                for id in &collapsible {
                    view.toggle_collapse(id);
                }
                black_box(view.render_set().nodes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_position_passes, bench_end_to_end
);
criterion_main!(benches);
