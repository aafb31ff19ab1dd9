use std::collections::HashSet;

use log::debug;

use crate::cost::Estimator;
use crate::error::OptResult;
use crate::operator::LogicalOperator;
use crate::plan::{LogicalPlanBuilder, Plan, PlanNode, PlanNodeRef};
use crate::predicate::Predicate;
use crate::schema::Attribute;

/// What the optimizer needs to know about an input plan.
///
/// Collected in a single walk: fresh copies of the scanned relations in leaf order, the distinct
/// predicates of every selection and join, and the attributes the plan must output.
#[derive(Debug)]
pub struct QueryShape {
    scans: Vec<PlanNodeRef>,
    predicates: Vec<Predicate>,
    root_projection: Option<Vec<Attribute>>,
    required_output: Vec<Attribute>,
}

impl QueryShape {
    /// Walks `plan`, creating the scan copies through `builder`.
    ///
    /// If the root is not a projection, the plan estimated as given decides the required output,
    /// which populates the output slots of `plan`.
    pub fn ingest(plan: &Plan, builder: &LogicalPlanBuilder) -> OptResult<Self> {
        let mut shape = Self {
            scans: vec![],
            predicates: vec![],
            root_projection: None,
            required_output: vec![],
        };
        shape.collect(&plan.root(), builder);

        let root = plan.root();
        match root.operator() {
            LogicalOperator::Project(projection) => {
                shape.root_projection = Some(projection.attributes().to_vec());
                shape.required_output = projection.attributes().to_vec();
            }
            _ => {
                let cost = Estimator::new().cost(plan)?;
                debug!("Input plan cost: {}", cost);
                shape.required_output = root.output()?.attributes().to_vec();
            }
        }

        Ok(shape)
    }

    fn collect(&mut self, node: &PlanNode, builder: &LogicalPlanBuilder) {
        for input in node.inputs() {
            self.collect(input, builder);
        }

        match node.operator() {
            LogicalOperator::Scan(scan) => {
                self.scans.push(builder.scan(scan.named_relation().clone()));
            }
            LogicalOperator::Select(_) | LogicalOperator::Join(_) => {
                if let Some(predicate) = node.operator().predicate() {
                    if !self.predicates.contains(predicate) {
                        self.predicates.push(predicate.clone());
                    }
                }
            }
            LogicalOperator::Project(_) | LogicalOperator::Product(_) => {}
        }
    }

    pub fn scans(&self) -> &[PlanNodeRef] {
        &self.scans
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Attribute list of the input's root projection, if the root is one.
    pub fn root_projection(&self) -> Option<&[Attribute]> {
        self.root_projection.as_deref()
    }

    pub fn required_output(&self) -> &[Attribute] {
        &self.required_output
    }

    /// Attributes still needed while `pending` predicates remain to be applied.
    pub fn needed_attributes<'a, I>(&self, pending: I) -> HashSet<Attribute>
    where
        I: IntoIterator<Item = &'a Predicate>,
    {
        let mut needed: HashSet<Attribute> = self.required_output.iter().cloned().collect();
        needed.extend(pending.into_iter().flat_map(|predicate| predicate.attributes()).cloned());
        needed
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::catalog::Catalogue;

    fn catalogue() -> Catalogue {
        let mut catalogue = Catalogue::new();
        catalogue.create_relation("A", 100, [("a", 100)]).unwrap();
        catalogue
            .create_relation("B", 200, [("b", 50), ("c", 20)])
            .unwrap();
        catalogue
    }

    #[test]
    fn test_ingest_canonical_plan() {
        let cat = catalogue();
        let builder = LogicalPlanBuilder::new();
        let a = builder.scan(cat.lookup("A").unwrap());
        let b = builder.scan(cat.lookup("B").unwrap());
        let product = builder.product(a.clone(), b);
        let inner = builder.select(product, Predicate::value_equals("c", "1"));
        let outer = builder.select(inner, Predicate::attribute_equals("a", "b"));
        let again = builder.select(outer, Predicate::value_equals("c", "1"));
        let plan = builder.build(builder.project(again, [Attribute::named("b")]));

        let shape = QueryShape::ingest(&plan, &LogicalPlanBuilder::new()).unwrap();
        let names: Vec<&str> = shape
            .scans()
            .iter()
            .map(|s| s.operator().as_scan().unwrap().table_name())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(!Rc::ptr_eq(&shape.scans()[0], &a));
        assert_eq!(
            shape.predicates(),
            &[
                Predicate::value_equals("c", "1"),
                Predicate::attribute_equals("a", "b"),
            ]
        );
        assert_eq!(shape.root_projection(), Some(&[Attribute::named("b")][..]));

        let needed = shape.needed_attributes(shape.predicates());
        let expected: HashSet<Attribute> =
            ["a", "b", "c"].into_iter().map(Attribute::named).collect();
        assert_eq!(needed, expected);
        assert_eq!(shape.needed_attributes(&Vec::<Predicate>::new()).len(), 1);
    }

    #[test]
    fn test_required_output_without_projection() {
        let cat = catalogue();
        let builder = LogicalPlanBuilder::new();
        let join = builder.join(
            builder.scan(cat.lookup("A").unwrap()),
            builder.scan(cat.lookup("B").unwrap()),
            Predicate::attribute_equals("a", "b"),
        );
        let plan = builder.build(join);

        let shape = QueryShape::ingest(&plan, &LogicalPlanBuilder::new()).unwrap();
        assert!(shape.root_projection().is_none());
        assert_eq!(shape.predicates(), &[Predicate::attribute_equals("a", "b")]);
        let required: Vec<&str> = shape.required_output().iter().map(Attribute::name).collect();
        assert_eq!(required, vec!["a", "b", "c"]);
    }
}
