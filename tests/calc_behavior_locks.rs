use gradebookd::calc::{self, PASSING_MARK};
use gradebookd::gradebook::Gradebook;
use gradebookd::model::{Outcome, Rejection};
use gradebookd::store::MemoryStore;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn book_with(students: &[&str], subjects: &[(&str, &str)]) -> Gradebook<MemoryStore> {
    let mut book = Gradebook::open(MemoryStore::new());
    for s in students {
        assert!(book.add_student(s).is_applied());
    }
    for (name, total) in subjects {
        assert!(book.add_subject(name, total).is_applied());
    }
    book
}

#[test]
fn unset_marks_count_as_zero() {
    let mut book = book_with(&["Asha", "Ben"], &[("Math", "50"), ("Science", "100")]);
    // One mark anywhere enables compute; Ben stays entirely unset.
    assert!(book.set_mark(0, "Math", "0").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    for r in &snapshot.results {
        assert!(approx(r.average, 0.0), "{:?}", r);
        assert!(approx(r.total_marks, 0.0), "{:?}", r);
    }
    assert!(approx(snapshot.class_average, 0.0));
    assert!(approx(snapshot.pass_percentage, 0.0));
}

#[test]
fn full_marks_average_exactly_twenty() {
    let mut book = book_with(&["Asha"], &[("Math", "50"), ("Science", "100"), ("Art", "7")]);
    assert!(book.set_mark(0, "Math", "50").is_applied());
    assert!(book.set_mark(0, "Science", "100").is_applied());
    assert!(book.set_mark(0, "Art", "7").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    assert_eq!(format!("{:.2}", snapshot.results[0].average), "20.00");
    assert!(approx(snapshot.results[0].total_marks, 157.0));
    assert!(approx(snapshot.pass_percentage, 100.0));
}

#[test]
fn subjects_are_normalized_before_averaging() {
    let mut book = book_with(&["Asha"], &[("Math", "50"), ("Science", "100")]);
    assert!(book.set_mark(0, "Math", "40").is_applied());
    assert!(book.set_mark(0, "Science", "80").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    let asha = &snapshot.results[0];
    assert!(approx(calc::normalized_score(40.0, 50), 16.0));
    assert!(approx(calc::normalized_score(80.0, 100), 16.0));
    assert!(approx(asha.average, 16.0));
    assert!(approx(asha.total_marks, 120.0));
    assert_eq!(asha.rank, 1);
}

#[test]
fn each_subject_weighs_equally_regardless_of_total() {
    let mut book = book_with(&["Asha"], &[("Quiz", "10"), ("Exam", "200")]);
    assert!(book.set_mark(0, "Quiz", "10").is_applied());
    assert!(book.set_mark(0, "Exam", "0").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    // 20 and 0 on the normalized scale; raw totals would give 10/210.
    assert!(approx(snapshot.results[0].average, 10.0));
    assert!(approx(snapshot.results[0].total_marks, 10.0));
}

#[test]
fn single_failing_student_scenario() {
    let mut book = book_with(&["Asha"], &[("Math", "100")]);
    assert!(book.set_mark(0, "Math", "5").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    assert_eq!(format!("{:.2}", snapshot.results[0].average), "1.00");
    assert_eq!(format!("{:.2}", snapshot.class_average), "1.00");
    assert_eq!(format!("{:.2}", snapshot.pass_percentage), "0.00");
}

#[test]
fn passing_threshold_is_inclusive() {
    let mut book = book_with(&["Pass", "Fail"], &[("Math", "20")]);
    assert!(book.set_mark(0, "Math", "10").is_applied());
    assert!(book.set_mark(1, "Math", "9.99").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    assert!(approx(snapshot.results[0].average, PASSING_MARK));
    assert!(approx(snapshot.pass_percentage, 50.0));
}

#[test]
fn ranks_follow_descending_average_and_ties_keep_roster_order() {
    let mut book = book_with(&["Low", "TieA", "Top", "TieB"], &[("Math", "20")]);
    assert!(book.set_mark(0, "Math", "5").is_applied());
    assert!(book.set_mark(1, "Math", "12").is_applied());
    assert!(book.set_mark(2, "Math", "18").is_applied());
    assert!(book.set_mark(3, "Math", "12").is_applied());

    let snapshot = book.compute().applied().expect("computed").clone();
    let ranked: Vec<(usize, &str)> = snapshot
        .results
        .iter()
        .map(|r| (r.rank, r.student.as_str()))
        .collect();
    assert_eq!(
        ranked,
        vec![(1, "Top"), (2, "TieA"), (3, "TieB"), (4, "Low")]
    );
    for pair in snapshot.results.windows(2) {
        assert!(pair[0].average >= pair[1].average);
        assert_eq!(pair[0].rank + 1, pair[1].rank);
    }
    assert!(approx(snapshot.class_average, (5.0 + 12.0 + 18.0 + 12.0) / 4.0));
    assert!(approx(snapshot.pass_percentage, 75.0));
}

#[test]
fn empty_inputs_never_produce_nan() {
    let book = book_with(&[], &[]);
    let snapshot = calc::compute_results(book.students(), book.subjects(), &Default::default());
    assert!(snapshot.results.is_empty());
    assert_eq!(snapshot.class_average, 0.0);
    assert_eq!(snapshot.pass_percentage, 0.0);

    let book = book_with(&["Asha", "Ben"], &[]);
    let snapshot = calc::compute_results(book.students(), book.subjects(), &Default::default());
    assert_eq!(snapshot.results.len(), 2);
    for r in &snapshot.results {
        assert_eq!(r.average, 0.0);
        assert!(!r.average.is_nan());
    }
    assert_eq!(snapshot.class_average, 0.0);
    assert_eq!(snapshot.pass_percentage, 0.0);

    assert_eq!(calc::class_average(&[]), 0.0);
    assert_eq!(calc::pass_percentage(&[]), 0.0);
}

#[test]
fn compute_requires_at_least_one_mark() {
    let mut book = book_with(&["Asha"], &[("Math", "20")]);
    assert!(!book.can_compute());
    assert_eq!(book.compute(), Outcome::Rejected(Rejection::NoMarks));
    assert!(book.last_results().is_none());

    assert!(book.set_mark(0, "Math", "12").is_applied());
    assert!(book.can_compute());
    assert!(book.compute().is_applied());

    // Clearing the only mark disables compute again but keeps the last snapshot.
    assert!(book.set_mark(0, "Math", "").is_applied());
    assert!(!book.can_compute());
    assert!(book.last_results().is_some());
}

#[test]
fn compute_does_not_mutate_the_model() {
    let mut book = book_with(&["Asha", "Ben"], &[("Math", "20")]);
    assert!(book.set_mark(1, "Math", "15").is_applied());
    let before = book.mark_records();
    let names: Vec<String> = book.students().iter().map(|s| s.name.clone()).collect();

    let first = book.compute().applied().expect("computed").clone();
    let second = book.compute().applied().expect("computed").clone();

    assert_eq!(first, second);
    assert_eq!(book.mark_records(), before);
    let after: Vec<String> = book.students().iter().map(|s| s.name.clone()).collect();
    assert_eq!(after, names);
}
