//! Dependency-gated evaluation steps.
//!
//! A pipeline is a hand-ordered sequence of steps, each declaring the
//! fields it reads and the single field it writes. The executor walks the
//! sequence once: a step whose inputs are all present runs and appends its
//! output to the container; a step with a missing input is skipped and
//! recorded, which transitively skips everything downstream of it. The
//! declared order is validated against the dependency graph before
//! anything runs, so a mis-ordered sequence is a configuration error
//! rather than a silent wrong answer.

use crate::container::ModelContainer;
use crate::errors::{EtLookError, EtLookResult};
use crate::parameters::Parameters;
use crate::variable::Substitution;
use ndarray::ArrayD;
use petgraph::algo::toposort;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use std::collections::HashMap;

/// One evaluation step: a pure function of already-present fields.
#[derive(Clone, Copy)]
pub struct Step {
    /// Name of the field this step writes.
    pub provides: &'static str,
    /// Names of the fields this step reads. All must be present (as inputs
    /// or as outputs of earlier steps) for the step to run.
    pub requires: &'static [&'static str],
    /// The formula. Only called once all of `requires` are present.
    pub run: fn(&ModelContainer, &Parameters) -> ArrayD<f64>,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("provides", &self.provides)
            .field("requires", &self.requires)
            .finish()
    }
}

/// A step that did not run, and which inputs it was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedStep {
    pub provides: &'static str,
    pub missing: Vec<String>,
}

/// What happened during one pipeline run.
///
/// Lets callers distinguish "model ran, output has gaps" (skipped steps,
/// substituted defaults) from "model could not run" (an `Err` from the
/// pipeline entry point).
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Optional inputs that were substituted with constant defaults.
    pub substituted: Vec<Substitution>,
    /// Fields computed by this run, in evaluation order.
    pub computed: Vec<&'static str>,
    /// Steps skipped because of missing inputs.
    pub skipped: Vec<SkippedStep>,
}

/// Check that the hand-written step order respects the dependency graph.
///
/// Builds a directed graph with an edge from each producing step to each
/// consuming step and rejects sequences where a step reads a field that
/// only a *later* step provides, as well as cyclic dependencies.
pub fn validate_order(steps: &[Step]) -> EtLookResult<()> {
    let mut graph: DiGraph<&'static str, ()> = DiGraph::new();
    let indexes: Vec<_> = steps.iter().map(|s| graph.add_node(s.provides)).collect();

    let mut position: HashMap<&'static str, usize> = HashMap::new();
    for (i, step) in steps.iter().enumerate() {
        if position.insert(step.provides, i).is_some() {
            panic!("step {} declared twice", step.provides);
        }
    }

    for (i, step) in steps.iter().enumerate() {
        for required in step.requires {
            if let Some(&j) = position.get(required) {
                if j >= i {
                    return Err(EtLookError::StepOrdering {
                        step: step.provides.to_string(),
                        variable: required.to_string(),
                    });
                }
                graph.add_edge(indexes[j], indexes[i], ());
            }
        }
    }

    toposort(&graph, None).map_err(|cycle| EtLookError::StepOrdering {
        step: graph[cycle.node_id()].to_string(),
        variable: "<cycle>".to_string(),
    })?;

    Ok(())
}

/// Render the step dependency graph in DOT format, for debugging.
pub fn dependency_dot(steps: &[Step]) -> String {
    let mut graph: DiGraph<&'static str, ()> = DiGraph::new();
    let indexes: Vec<_> = steps.iter().map(|s| graph.add_node(s.provides)).collect();
    let position: HashMap<&'static str, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.provides, i))
        .collect();

    for (i, step) in steps.iter().enumerate() {
        for required in step.requires {
            if let Some(&j) = position.get(required) {
                graph.add_edge(indexes[j], indexes[i], ());
            }
        }
    }

    format!("{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
}

/// Run a validated step sequence over the container.
///
/// Steps whose output already exists (supplied by the caller as an input)
/// are left untouched; steps with missing inputs are skipped and recorded.
pub fn execute(
    container: &mut ModelContainer,
    steps: &[Step],
    params: &Parameters,
) -> EtLookResult<RunReport> {
    validate_order(steps)?;

    let mut report = RunReport::default();
    for step in steps {
        if container.contains(step.provides) {
            log::debug!("`{}` already present, not recomputed", step.provides);
            continue;
        }

        let missing: Vec<String> = step
            .requires
            .iter()
            .filter(|name| !container.contains(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "skipping `{}`, missing inputs: {}",
                step.provides,
                missing.join(", ")
            );
            report.skipped.push(SkippedStep {
                provides: step.provides,
                missing,
            });
            continue;
        }

        log::debug!("computing `{}`", step.provides);
        let data = (step.run)(container, params);
        container.insert(step.provides, data)?;
        report.computed.push(step.provides);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use ndarray::array;

    fn container() -> ModelContainer {
        ModelContainer::new(Grid::daily(array![180.0], array![29.0], array![30.5]))
    }

    fn double(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
        c.expect_array("a").mapv(|v| v * 2.0)
    }

    fn add(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
        c.expect_array("b") + c.expect_array("a")
    }

    const GOOD: &[Step] = &[
        Step {
            provides: "b",
            requires: &["a"],
            run: double,
        },
        Step {
            provides: "c",
            requires: &["a", "b"],
            run: add,
        },
    ];

    const SHUFFLED: &[Step] = &[
        Step {
            provides: "c",
            requires: &["a", "b"],
            run: add,
        },
        Step {
            provides: "b",
            requires: &["a"],
            run: double,
        },
    ];

    #[test]
    fn ordered_sequence_validates() {
        assert!(validate_order(GOOD).is_ok());
    }

    #[test]
    fn shuffled_sequence_is_rejected() {
        let err = validate_order(SHUFFLED).unwrap_err();
        assert!(matches!(err, EtLookError::StepOrdering { .. }));
    }

    #[test]
    fn execute_computes_in_order() {
        let mut c = container();
        c.insert_constant("a", 3.0);

        let report = execute(&mut c, GOOD, &Parameters::default()).unwrap();
        assert_eq!(report.computed, vec!["b", "c"]);
        assert!(report.skipped.is_empty());
        assert_eq!(c.expect_array("b")[[0, 0, 0]], 6.0);
        assert_eq!(c.expect_array("c")[[0, 0, 0]], 9.0);
    }

    #[test]
    fn missing_inputs_skip_transitively() {
        let mut c = container();
        // "a" never provided: both steps must be skipped, not panic.
        let report = execute(&mut c, GOOD, &Parameters::default()).unwrap();

        assert!(report.computed.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].provides, "b");
        assert_eq!(report.skipped[0].missing, vec!["a".to_string()]);
        assert_eq!(report.skipped[1].provides, "c");
    }

    #[test]
    fn precomputed_outputs_are_not_recomputed() {
        let mut c = container();
        c.insert_constant("a", 3.0);
        c.insert_constant("b", 100.0);

        let report = execute(&mut c, GOOD, &Parameters::default()).unwrap();
        assert_eq!(report.computed, vec!["c"]);
        assert_eq!(c.expect_array("b")[[0, 0, 0]], 100.0);
        assert_eq!(c.expect_array("c")[[0, 0, 0]], 103.0);
    }

    #[test]
    fn dot_rendering_names_steps() {
        let dot = dependency_dot(GOOD);
        assert!(dot.contains("\"b\""));
        assert!(dot.contains("\"c\""));
    }
}
