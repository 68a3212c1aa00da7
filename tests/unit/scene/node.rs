use super::*;
use crate::scheduler::runtime::{Scheduler, SchedulerConfig};

fn cell(key: &str, x: f64) -> Node {
    Node::new("rect")
        .with_key(key)
        .with_static("size", 64)
        .unwrap()
        .with_prop("opacity", 1.0)
        .with_prop("position", Vec2::new(x, 0.0))
        .with_prop("stroke", Color::parse("#999").unwrap())
        .with_prop("text", "?".to_owned())
}

fn grid() -> Node {
    Node::new("layout")
        .with_key("grid")
        .with_prop("scale", 1.0)
        .with_child(cell("a", 0.0))
        .with_child(cell("b", 100.0).with_child(cell("b.inner", 5.0)))
}

#[test]
fn typed_property_access() {
    let n = cell("a", 3.0);
    assert_eq!(n.get::<f64>("opacity").unwrap(), 1.0);
    assert_eq!(n.get::<Vec2>("position").unwrap(), Vec2::new(3.0, 0.0));
    assert_eq!(n.signal::<f64>("opacity").unwrap().label(), "a.opacity");
    assert_eq!(n.prop("stroke").unwrap().type_name(), "color");
    assert_eq!(n.static_value("size"), Some(&serde_json::json!(64)));

    n.set("opacity", 0.25).unwrap();
    assert_eq!(n.get::<f64>("opacity").unwrap(), 0.25);
    let names: Vec<&str> = n.prop_names().collect();
    assert_eq!(names, ["opacity", "position", "stroke", "text"]);
}

#[test]
fn missing_or_mistyped_property_is_a_validation_error() {
    let n = cell("a", 0.0);
    assert!(matches!(
        n.signal::<f64>("nope"),
        Err(FlowError::Validation(_))
    ));
    let err = n.signal::<bool>("opacity").unwrap_err();
    assert!(err.to_string().contains("holds f64, not bool"));
    assert!(n.animate("stroke", 1.0, 0.5, Ease::Linear).is_err());
}

#[test]
fn find_searches_depth_first() {
    let mut g = grid();
    assert_eq!(g.find("grid").map(Node::kind), Some("layout"));
    assert!(g.find("b.inner").is_some());
    assert!(g.find("zzz").is_none());

    g.find_mut("b.inner").unwrap().set_static("size", 8).unwrap();
    assert_eq!(
        g.find("b.inner").unwrap().static_value("size"),
        Some(&serde_json::json!(8))
    );
}

#[test]
fn add_and_remove_children() {
    let mut g = grid();
    let b = g.remove_child("b").unwrap();
    assert_eq!(b.key(), Some("b"));
    assert_eq!(g.children().len(), 1);
    assert!(g.remove_child("b").is_none());

    g.add(b);
    let removed = g.remove_children();
    assert_eq!(removed.len(), 2);
    assert!(g.children().is_empty());
}

#[test]
fn deep_clone_copies_values_into_fresh_signals() {
    let g = grid();
    g.find("b").unwrap().set("opacity", 0.5).unwrap();

    let copy = g.deep_clone().unwrap();
    assert_eq!(copy.children().len(), 2);
    let src = g.find("b.inner").unwrap();
    let dst = copy.find("b.inner").unwrap();
    assert_eq!(dst.static_value("size"), src.static_value("size"));
    assert_eq!(copy.find("b").unwrap().get::<f64>("opacity").unwrap(), 0.5);
    assert!(
        !src.signal::<Vec2>("position")
            .unwrap()
            .same_cell(&dst.signal::<Vec2>("position").unwrap())
    );
    assert_eq!(copy.values().unwrap(), g.values().unwrap());

    src.set("text", "9".to_owned()).unwrap();
    assert_eq!(dst.get::<String>("text").unwrap(), "?");
    dst.set("opacity", 0.0).unwrap();
    assert_eq!(src.get::<f64>("opacity").unwrap(), 1.0);
}

#[test]
fn computed_properties_are_frozen_by_clone() {
    let base = Signal::new(2.0);
    let derived = {
        let base = base.clone();
        Signal::computed(move |d| Ok(d.read(&base)? * 10.0))
    };
    let n = Node::new("label").with_signal("width", derived);
    let copy = n.deep_clone().unwrap();

    base.write(3.0);
    assert_eq!(n.get::<f64>("width").unwrap(), 30.0);
    assert_eq!(copy.get::<f64>("width").unwrap(), 20.0);
}

#[test]
fn running_tween_on_source_does_not_reach_the_clone() {
    let src = cell("a", 0.0);
    let copy = src.deep_clone().unwrap();
    let root = src
        .animate("position", Vec2::new(50.0, 50.0), 0.5, Ease::OutCubic)
        .unwrap();
    let mut s = Scheduler::new(root, SchedulerConfig::at_fps(10, 1).unwrap()).unwrap();
    s.run().unwrap();

    assert_eq!(src.get::<Vec2>("position").unwrap(), Vec2::new(50.0, 50.0));
    assert_eq!(copy.get::<Vec2>("position").unwrap(), Vec2::new(0.0, 0.0));
}

#[test]
fn vector_values_sample_as_pairs() {
    let n = cell("a", 7.0);
    let values = n.values().unwrap();
    assert_eq!(values["position"], serde_json::json!([7.0, 0.0]));
    assert_eq!(values["text"], serde_json::json!("?"));
}
