use super::*;

fn pass(name: &str, inputs: &[&str], outputs: &[&str]) -> PassDecl {
    PassDecl {
        name: name.to_string(),
        kernel: format!("k_{name}"),
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        outputs: outputs.iter().map(|s| s.to_string()).collect(),
        scale: 1.0,
    }
}

fn names(passes: &[&PassDecl]) -> Vec<String> {
    passes.iter().map(|p| p.name.clone()).collect()
}

#[test]
fn blur_down_up_orders_down_first() {
    let passes = vec![
        pass("down", &["source"], &["half"]),
        pass("up", &["half"], &["result"]),
    ];
    assert_eq!(names(&order(&passes).unwrap()), vec!["down", "up"]);
}

#[test]
fn dependencies_override_declaration_order() {
    let passes = vec![
        pass("composite", &["a", "b"], &["out"]),
        pass("make_b", &["source"], &["b"]),
        pass("make_a", &["source"], &["a"]),
    ];
    assert_eq!(
        names(&order(&passes).unwrap()),
        vec!["make_b", "make_a", "composite"]
    );
}

#[test]
fn independent_passes_keep_declaration_order() {
    // Diamond: 0 -> {1, 2} -> 3, ties resolved by declaration index.
    let passes = vec![
        pass("split", &["source"], &["s"]),
        pass("left", &["s"], &["l"]),
        pass("right", &["s"], &["r"]),
        pass("join", &["l", "r"], &["out"]),
    ];
    for _ in 0..8 {
        assert_eq!(order_indices(&passes).unwrap(), vec![0, 1, 2, 3]);
    }
}

#[test]
fn scheduler_api_is_topological() {
    let passes = vec![
        pass("a", &["source"], &["x"]),
        pass("b", &["source"], &["y"]),
        pass("c", &["x", "y"], &["z"]),
        pass("d", &["z"], &["w"]),
    ];
    let mut sched = PassScheduler::new(&passes);
    let mut out = Vec::new();
    while let Some(next) = sched.pop_ready() {
        out.push(next);
        sched.mark_done(next);
    }
    assert_eq!(out, vec![0, 1, 2, 3]);
    assert_eq!(sched.remaining(), 0);
}

#[test]
fn cycle_is_reported_with_offending_passes_only() {
    let passes = vec![
        pass("head", &["source"], &["h"]),
        pass("a", &["h", "b_out"], &["a_out"]),
        pass("b", &["a_out"], &["b_out"]),
        pass("tail", &["b_out"], &["result"]),
    ];
    let err = order(&passes).unwrap_err();
    assert_eq!(err.passes, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn self_loop_is_a_cycle() {
    let passes = vec![pass("feedback", &["source", "acc"], &["acc"])];
    let err = order_indices(&passes).unwrap_err();
    assert_eq!(err.passes, vec!["feedback".to_string()]);
}

#[test]
fn empty_pass_list_orders_to_empty() {
    assert!(order(&[]).unwrap().is_empty());
}
