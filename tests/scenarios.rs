use relalg_opt::catalog::Catalogue;
use relalg_opt::cost::{Cost, Estimator};
use relalg_opt::error::OptError;
use relalg_opt::optimizer::{Optimizer, OptimizerConfig};
use relalg_opt::plan::{LogicalPlanBuilder, Plan};
use relalg_opt::predicate::Predicate;
use relalg_opt::schema::Attribute;

fn catalogue() -> Catalogue {
    let mut catalogue = Catalogue::new();
    catalogue.create_relation("A", 100, [("A.a", 100)]).unwrap();
    catalogue
        .create_relation("B", 200, [("B.b", 50), ("B.c", 20)])
        .unwrap();
    catalogue
        .create_relation("C", 30, [("C.c", 30), ("C.d", 5)])
        .unwrap();
    catalogue
        .create_relation("R", 1000, [("R.r1", 10), ("R.r2", 20)])
        .unwrap();
    catalogue
}

fn optimizer() -> Optimizer {
    Optimizer::new(OptimizerConfig {
        report_candidates: false,
        ..OptimizerConfig::default()
    })
}

/// Optimizes `plan` and returns the result, its cost and every candidate cost in search order.
fn optimise(plan: &Plan) -> (Plan, Cost, Vec<Cost>) {
    let mut candidates = vec![];
    let best = optimizer()
        .optimise_with_sink(plan, &mut |cost: Cost, _: &Plan| candidates.push(cost))
        .unwrap();
    let cost = Estimator::new().cost(&best).unwrap();
    (best, cost, candidates)
}

fn cost(plan: &Plan) -> Cost {
    Estimator::new().cost(plan).unwrap()
}

#[test]
fn test_single_scan() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let plan = builder.build(builder.scan(cat.lookup("A").unwrap()));

    let (best, best_cost, candidates) = optimise(&plan);
    assert_eq!(best.to_string(), "SCAN [A]");
    assert_eq!(best_cost, Cost::from(100));
    assert_eq!(candidates, vec![Cost::from(100)]);
}

#[test]
fn test_value_selection_stays_on_scan() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let scan = builder.scan(cat.lookup("A").unwrap());
    let plan = builder.build(builder.select(scan, Predicate::value_equals("A.a", "5")));

    let (best, best_cost, _) = optimise(&plan);
    assert_eq!(best.to_string(), "SELECT [A.a=\"5\"] (SCAN [A])");
    assert_eq!(best_cost, Cost::from(101));
}

#[test]
fn test_product_and_selection_become_join() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let product = builder.product(
        builder.scan(cat.lookup("B").unwrap()),
        builder.scan(cat.lookup("C").unwrap()),
    );
    let plan = builder.build(builder.select(product, Predicate::attribute_equals("B.c", "C.c")));
    assert_eq!(cost(&plan), Cost::from(6430));

    let (best, best_cost, _) = optimise(&plan);
    assert_eq!(best.to_string(), "JOIN [B.c=C.c] (SCAN [B], SCAN [C])");
    assert_eq!(best_cost, Cost::from(430));
    assert_eq!(best.root().output().unwrap().tuple_count(), 200);
}

#[test]
fn test_root_projection_is_kept() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let product = builder.product(
        builder.scan(cat.lookup("A").unwrap()),
        builder.scan(cat.lookup("B").unwrap()),
    );
    let plan = builder.build(builder.project(product, [Attribute::named("A.a")]));

    let (best, best_cost, _) = optimise(&plan);
    assert_eq!(best.to_string(), "PROJECT [A.a] (PRODUCT (SCAN [A], SCAN [B]))");
    assert_eq!(best_cost, Cost::from(100 + 200 + 20000 + 20000));

    let output = best.root().output().unwrap();
    assert_eq!(output.tuple_count(), 20000);
    assert_eq!(output.attributes(), &[Attribute::named("A.a")]);
}

/// `R(x)`, `S(y, z)`, `U(w)`; joining `S` and `U` first is the expensive ordering.
fn ordering_plan() -> Plan {
    let mut cat = Catalogue::new();
    cat.create_relation("R", 1000, [("x", 1000)]).unwrap();
    cat.create_relation("S", 100, [("y", 100), ("z", 10)]).unwrap();
    cat.create_relation("U", 1000, [("w", 10)]).unwrap();

    let builder = LogicalPlanBuilder::new();
    let rs = builder.product(
        builder.scan(cat.lookup("R").unwrap()),
        builder.scan(cat.lookup("S").unwrap()),
    );
    let rsu = builder.product(rs, builder.scan(cat.lookup("U").unwrap()));
    let zw = builder.select(rsu, Predicate::attribute_equals("z", "w"));
    builder.build(builder.select(zw, Predicate::attribute_equals("x", "y")))
}

#[test]
fn test_cheaper_predicate_ordering_wins() {
    let (best, best_cost, candidates) = optimise(&ordering_plan());

    assert_eq!(candidates, vec![Cost::from(22100), Cost::from(12200)]);
    assert_eq!(best_cost, Cost::from(12200));
    assert_eq!(
        best.to_string(),
        "JOIN [z=w] (JOIN [x=y] (SCAN [R], SCAN [S]), SCAN [U])"
    );
}

#[test]
fn test_local_attribute_pair_selection() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let scan = builder.scan(cat.lookup("R").unwrap());
    let plan = builder.build(builder.select(scan, Predicate::attribute_equals("R.r1", "R.r2")));

    let (best, best_cost, candidates) = optimise(&plan);
    assert_eq!(best.to_string(), "SELECT [R.r1=R.r2] (SCAN [R])");
    assert_eq!(best_cost, Cost::from(1000 + 50));
    // Nothing left for the search to order.
    assert_eq!(candidates.len(), 1);
}

#[test]
fn test_selections_pushed_below_join() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let product = builder.product(
        builder.scan(cat.lookup("B").unwrap()),
        builder.scan(cat.lookup("C").unwrap()),
    );
    let join = builder.select(product, Predicate::attribute_equals("B.c", "C.c"));
    let local = builder.select(join, Predicate::value_equals("C.d", "x"));
    let plan = builder.build(builder.project(local, [Attribute::named("B.b")]));

    let (best, best_cost, _) = optimise(&plan);
    assert_eq!(
        best.to_string(),
        "PROJECT [B.b] (JOIN [B.c=C.c] (SCAN [B], PROJECT [C.c] (SELECT [C.d=\"x\"] (SCAN [C]))))"
    );
    // B 200, C 30, select 6, project 6, join 200 * 6 / 20 = 60, project 60.
    assert_eq!(best_cost, Cost::from(200 + 30 + 6 + 6 + 60 + 60));
    assert!(best_cost < cost(&plan));
}

#[test]
fn test_algebraic_laws() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();

    let scan = builder.build(builder.scan(cat.lookup("B").unwrap()));
    assert_eq!(cost(&scan), Cost::from(200));

    let project = builder.build(builder.project(
        builder.scan(cat.lookup("B").unwrap()),
        [Attribute::named("B.b")],
    ));
    assert_eq!(cost(&project), Cost::from(2 * 200));

    let select = builder.build(builder.select(
        builder.scan(cat.lookup("B").unwrap()),
        Predicate::value_equals("B.b", "1"),
    ));
    assert_eq!(cost(&select), Cost::from(200 + 200 / 50));
}

#[test]
fn test_optimising_twice_does_not_get_worse() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let product = builder.product(
        builder.scan(cat.lookup("A").unwrap()),
        builder.scan(cat.lookup("B").unwrap()),
    );
    let projected = builder.build(builder.project(product, [Attribute::named("A.a")]));

    for plan in [ordering_plan(), projected] {
        let (once, once_cost, _) = optimise(&plan);
        let (twice, twice_cost, _) = optimise(&once);
        assert!(twice_cost <= once_cost);
        assert_eq!(twice.table_names(), plan.table_names());
    }
}

#[test]
fn test_unknown_attribute_is_reported() {
    let cat = catalogue();
    let builder = LogicalPlanBuilder::new();
    let scan = builder.scan(cat.lookup("A").unwrap());
    let plan = builder.build(builder.select(scan, Predicate::value_equals("Z.z", "1")));

    let err = optimizer().optimise(&plan).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<OptError>(),
        Some(OptError::UnknownAttribute { attribute, .. }) if attribute == "Z.z"
    ));
}

#[test]
fn test_product_beyond_u64_saturates() {
    let mut cat = Catalogue::new();
    let builder = LogicalPlanBuilder::new();
    let mut root = None;
    for name in ["P", "Q", "S", "U"] {
        let attr = format!("{}.k", name);
        cat.create_relation(name, 100_000, [(attr.as_str(), 1000)])
            .unwrap();
        let scan = builder.scan(cat.lookup(name).unwrap());
        root = Some(match root {
            Some(left) => builder.product(left, scan),
            None => scan,
        });
    }
    let plan = builder.build(root.unwrap());

    assert_eq!(cost(&plan).value(), u64::MAX);
    let (best, best_cost, candidates) = optimise(&plan);
    assert_eq!(candidates, vec![Cost::from(u64::MAX)]);
    assert_eq!(best_cost.value(), u64::MAX);
    assert_eq!(best.table_names(), plan.table_names());
}
