//! Running policies through the host pipeline with downstream consumers.

use std::cell::RefCell;
use std::rc::Rc;

use quala::checkers::taint::TAINTED;
use quala::frontend::{ProgramBuilder, TranslationUnit, TypeId};
use quala::sema::AnnotationTable;
use quala::{
    JsonTableWriter, LabelConsumer, NullnessPolicy, PassOrder, Pipeline, PipelineError, TaintPolicy,
};

/// `tainted int x = 1; int y = x;` in `main`.
fn leaky_unit(name: &str) -> TranslationUnit {
    let mut b = ProgramBuilder::new();
    let tainted_int = b.annotate(TypeId::INT, TAINTED);
    let x = b.at(2).var_init("x", tainted_int, b.int_lit(1));
    let y = b.at(3).var_init("y", TypeId::INT, b.rvalue(b.var_ref(&x)));
    let main = b.function("main", vec![], TypeId::INT);
    let body = vec![
        b.at(2).decl_stmt(vec![x]),
        b.at(3).decl_stmt(vec![y]),
        b.at(4).ret(Some(b.int_lit(0))),
    ];
    b.define(main, body);
    b.finish(name)
}

fn clean_unit(name: &str) -> TranslationUnit {
    let mut b = ProgramBuilder::new();
    let main = b.function("main", vec![], TypeId::INT);
    let body = vec![b.ret(Some(b.int_lit(0)))];
    b.define(main, body);
    b.finish(name)
}

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    unit: String,
    had_labels: bool,
    declarations: usize,
}

struct Recorder {
    needs_labels: bool,
    seen: Rc<RefCell<Vec<Seen>>>,
}

impl Recorder {
    fn new(needs_labels: bool) -> (Self, Rc<RefCell<Vec<Seen>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = Self {
            needs_labels,
            seen: Rc::clone(&seen),
        };
        (recorder, seen)
    }
}

impl LabelConsumer for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn needs_labels(&self) -> bool {
        self.needs_labels
    }

    fn consume(
        &mut self,
        unit: &TranslationUnit,
        labels: Option<&AnnotationTable>,
    ) -> Result<(), PipelineError> {
        self.seen.borrow_mut().push(Seen {
            unit: unit.name.clone(),
            had_labels: labels.is_some(),
            declarations: labels.map_or(0, |t| t.declarations.len()),
        });
        Ok(())
    }
}

struct Failing;

impl LabelConsumer for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn consume(
        &mut self,
        _unit: &TranslationUnit,
        _labels: Option<&AnnotationTable>,
    ) -> Result<(), PipelineError> {
        Err(PipelineError::Consumer {
            consumer: self.name().to_string(),
            source: "instrumentation failed".into(),
        })
    }
}

#[test]
fn consumers_see_labels_after_checking() {
    let policy = TaintPolicy::new();
    let (recorder, seen) = Recorder::new(true);
    let mut pipeline = Pipeline::new(&policy).consumer(recorder);

    let mut unit = leaky_unit("leaky.c");
    let output = pipeline.run(&mut unit).unwrap();

    assert_eq!(output.error_count(), 1);
    assert!(output.has_errors());
    let labels = output.labels.as_ref().unwrap();
    assert_eq!(labels.policy, "taint");
    assert!(labels.declarations.iter().any(|d| d.name == "x"));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].had_labels);
    assert_eq!(seen[0].declarations, labels.declarations.len());
}

#[test]
fn checker_after_label_consumer_is_rejected() {
    let policy = TaintPolicy::new();
    let (recorder, seen) = Recorder::new(true);
    let mut pipeline = Pipeline::new(&policy)
        .order(PassOrder::AfterConsumers)
        .consumer(recorder);

    let mut unit = leaky_unit("leaky.c");
    let err = pipeline.run(&mut unit).unwrap_err();

    assert!(matches!(err, PipelineError::LabelsUnavailable { ref consumer } if consumer == "recorder"));
    assert!(seen.borrow().is_empty());
}

#[test]
fn label_free_consumer_may_run_first() {
    let policy = TaintPolicy::new();
    let (recorder, seen) = Recorder::new(false);
    let mut pipeline = Pipeline::new(&policy)
        .order(PassOrder::AfterConsumers)
        .consumer(recorder);

    let mut unit = leaky_unit("leaky.c");
    let output = pipeline.run(&mut unit).unwrap();

    assert_eq!(output.error_count(), 1);
    assert!(output.labels.is_none());
    assert_eq!(
        *seen.borrow(),
        vec![Seen {
            unit: "leaky.c".to_string(),
            had_labels: false,
            declarations: 0,
        }]
    );
}

#[test]
fn consumer_failure_propagates() {
    let policy = NullnessPolicy::new();
    let mut pipeline = Pipeline::new(&policy).consumer(Failing);

    let mut unit = clean_unit("clean.c");
    let err = pipeline.run(&mut unit).unwrap_err();

    assert!(matches!(err, PipelineError::Consumer { .. }));
    assert_eq!(err.to_string(), "consumer `failing` failed");
}

#[test]
fn json_writer_emits_parseable_tables() {
    let policy = TaintPolicy::new();
    let mut buffer = Vec::new();
    {
        let mut pipeline = Pipeline::new(&policy).consumer(JsonTableWriter::new(&mut buffer));
        let mut unit = leaky_unit("leaky.c");
        pipeline.run(&mut unit).unwrap();
    }

    let json = String::from_utf8(buffer).unwrap();
    let table = AnnotationTable::from_json(json.trim()).unwrap();
    assert_eq!(table.unit, "leaky.c");
    let x = table.declarations.iter().find(|d| d.name == "x").unwrap();
    assert_eq!(x.labels[0].label, TAINTED);
    assert_eq!(x.labels[0].level, 0);
}

#[test]
fn units_are_checked_independently() {
    let policy = TaintPolicy::new();
    let (recorder, seen) = Recorder::new(true);
    let mut pipeline = Pipeline::new(&policy).consumer(recorder);

    let mut first = leaky_unit("first.c");
    let mut second = clean_unit("second.c");
    let first_out = pipeline.run(&mut first).unwrap();
    let second_out = pipeline.run(&mut second).unwrap();

    assert_eq!(first_out.error_count(), 1);
    assert!(second_out.diagnostics.is_empty());
    assert_eq!(second_out.stats.violations, 0);
    let names: Vec<_> = seen.borrow().iter().map(|s| s.unit.clone()).collect();
    assert_eq!(names, ["first.c", "second.c"]);
}

#[test]
fn rendered_output_names_the_violation() {
    let policy = TaintPolicy::new();
    let mut pipeline = Pipeline::new(&policy);
    let mut unit = leaky_unit("leaky.c");
    let output = pipeline.run(&mut unit).unwrap();

    assert_eq!(output.warning_count(), 0);
    let rendered = output.render(&unit);
    assert!(rendered.contains("tainted incompatible with unannotated"));
    assert!(rendered.contains("Q0001"));
}
