//! Runs a small build-style graph and prints the failure report.
//!
//! The test stage is compound: it expands into a database-backed sub-graph
//! and always tears the database down, even when the tests fail.
//!
//! ```text
//! RUST_LOG=debug cargo run --example pipeline
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use trestle_core::{SubWork, Work};
use trestle_runtime::run;
use trestle_schedule::DagScheduler;

struct Plan {
    deps: HashMap<&'static str, Vec<&'static str>>,
    compound: HashMap<&'static str, (Step, Step)>,
}

#[derive(Clone)]
struct Step {
    id: &'static str,
    plan: Arc<Plan>,
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Step {}

impl Hash for Step {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Work for Step {
    fn dependencies(&self) -> Vec<Self> {
        self.plan
            .deps
            .get(self.id)
            .map(|deps| {
                deps.iter()
                    .map(|id| Step {
                        id,
                        plan: self.plan.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sub_work(&self) -> Option<SubWork<Self>> {
        self.plan.compound.get(self.id).map(|(sub, finally)| {
            SubWork::new(
                Box::new(DagScheduler::from_root(sub)),
                Box::new(DagScheduler::from_root(finally)),
            )
        })
    }
}

fn plan(
    deps: &[(&'static str, &[&'static str])],
    compound: &[(&'static str, Step, Step)],
) -> impl Fn(&'static str) -> Step {
    let plan = Arc::new(Plan {
        deps: deps.iter().map(|(id, deps)| (*id, deps.to_vec())).collect(),
        compound: compound
            .iter()
            .map(|(id, sub, finally)| (*id, (sub.clone(), finally.clone())))
            .collect(),
    });
    move |id| Step {
        id,
        plan: plan.clone(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let test_sub = plan(&[("db-start", &[]), ("unit-tests", &["db-start"])], &[]);
    let test_finally = plan(&[("db-stop", &[])], &[]);
    let step = plan(
        &[
            ("fetch", &[]),
            ("compile", &["fetch"]),
            ("compile-tests", &["compile"]),
            ("test", &["compile-tests"]),
            ("package", &["test"]),
        ],
        &[(
            "test",
            test_sub("unit-tests"),
            test_finally("db-stop"),
        )],
    );

    let failures = run(
        &step("package"),
        |step| step.id.to_string(),
        |step| {
            tracing::info!("running");
            thread::sleep(Duration::from_millis(50));
            if step.id == "unit-tests" {
                Some("2 tests failed".to_string())
            } else {
                None
            }
        },
        4,
        |step| tracing::info_span!("step", name = %step.id),
    )
    .expect("scheduler contract violated");

    if failures.is_empty() {
        println!("build succeeded");
    } else {
        for failure in &failures {
            println!("{:?}: {}", failure.work, failure.message);
        }
    }
}
