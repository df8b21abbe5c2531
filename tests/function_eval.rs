use std::rc::Rc;

use aerofn::{ConfigNode, Function, SimContext};

fn build(ctx: &Rc<SimContext>, json: &str) -> Rc<Function> {
    let node: ConfigNode = serde_json::from_str(json).unwrap();
    Function::from_config(ctx, &node, "").unwrap()
}

#[test]
fn aero_coefficient_fixture_evaluates_and_publishes() {
    let ctx = Rc::new(SimContext::new());
    let pm = ctx.properties();
    pm.set("aero/qbar-area", 100.0).unwrap();
    pm.set("metrics/bw-ft", 30.0).unwrap();
    pm.set("aero/bi2vel", 0.05).unwrap();
    pm.set("velocities/r-aero-rad_sec", 0.2).unwrap();
    pm.set("aero/alpha-rad", 0.047).unwrap();

    let node: ConfigNode = serde_json::from_str(include_str!("data/clr_moment.json")).unwrap();
    let f = Function::from_config(&ctx, &node, "").unwrap();

    assert_eq!(f.name(), Some("aero/moment/Clr"));
    // alpha = 0.047 sits halfway through the table rows: 0.135.
    // 100 * 30 * 0.05 * 0.2 * 0.135 = 4.05
    assert!((f.evaluate() - 4.05).abs() < 1e-9);
    // The published property reads through to the same computation.
    assert!((pm.get("aero/moment/Clr").unwrap() - 4.05).abs() < 1e-9);
}

#[test]
fn sum_of_mixed_children_with_zeroed_properties() {
    let ctx = Rc::new(SimContext::new());
    ctx.properties().set("velocities/mach", 0.0).unwrap();
    ctx.properties().set("metrics/wingarea", 0.0).unwrap();

    let f = build(
        &ctx,
        r#"{
            "tag": "sum",
            "children": [
                { "tag": "value", "text": "3.14159" },
                { "tag": "property", "text": "velocities/mach" },
                {
                    "tag": "product",
                    "children": [
                        { "tag": "value", "text": "0.125" },
                        { "tag": "property", "text": "metrics/wingarea" }
                    ]
                }
            ]
        }"#,
    );
    assert_eq!(f.evaluate(), 3.14159);
}

#[test]
fn ifthen_with_comparison_condition() {
    let ctx = Rc::new(SimContext::new());
    ctx.properties().set("control/pitch-lag", 0.7).unwrap();

    let f = build(
        &ctx,
        r#"{
            "tag": "ifthen",
            "children": [
                {
                    "tag": "gt",
                    "children": [
                        { "tag": "v", "text": "3" },
                        { "tag": "v", "text": "2" }
                    ]
                },
                { "tag": "v", "text": "0.0" },
                { "tag": "p", "text": "control/pitch-lag" }
            ]
        }"#,
    );
    assert_eq!(f.evaluate(), 0.0);

    // Flip the condition around and the property branch is selected.
    let g = build(
        &ctx,
        r#"{
            "tag": "ifthen",
            "children": [
                {
                    "tag": "gt",
                    "children": [
                        { "tag": "v", "text": "2" },
                        { "tag": "v", "text": "3" }
                    ]
                },
                { "tag": "v", "text": "0.0" },
                { "tag": "p", "text": "control/pitch-lag" }
            ]
        }"#,
    );
    assert_eq!(g.evaluate(), 0.7);
}

#[test]
fn switch_driven_by_flight_mode_property() {
    let ctx = Rc::new(SimContext::new());
    ctx.properties().set("executive/flight-mode", 2.0).unwrap();

    let f = build(
        &ctx,
        r#"{
            "tag": "switch",
            "children": [
                { "tag": "p", "text": "executive/flight-mode" },
                { "tag": "v", "text": "0.25" },
                { "tag": "v", "text": "0.50" },
                { "tag": "v", "text": "0.75" },
                { "tag": "v", "text": "1.00" }
            ]
        }"#,
    );
    assert_eq!(f.evaluate(), 0.75);

    ctx.properties().set("executive/flight-mode", 0.0).unwrap();
    assert_eq!(f.evaluate(), 0.25);
}

#[test]
fn interpolate1d_tracks_a_property_lookup() {
    let ctx = Rc::new(SimContext::new());
    ctx.properties().set("velocities/mach", 0.4).unwrap();

    let f = build(
        &ctx,
        r#"{
            "tag": "interpolate1d",
            "children": [
                { "tag": "p", "text": "velocities/mach" },
                { "tag": "v", "text": "0.00" }, { "tag": "v", "text": "0.25" },
                { "tag": "v", "text": "0.80" }, { "tag": "v", "text": "0.50" },
                { "tag": "v", "text": "0.90" }, { "tag": "v", "text": "0.60" }
            ]
        }"#,
    );
    assert!((f.evaluate() - 0.375).abs() < 1e-12);

    ctx.properties().set("velocities/mach", 1.5).unwrap();
    assert_eq!(f.evaluate(), 0.60);

    ctx.properties().set("velocities/mach", -0.2).unwrap();
    assert_eq!(f.evaluate(), 0.25);
}

#[test]
fn published_functions_compose_through_the_namespace() {
    let ctx = Rc::new(SimContext::new());
    ctx.properties().set("aero/alpha-deg", 90.0).unwrap();

    // First function publishes alpha in radians.
    build(
        &ctx,
        r#"{
            "tag": "function",
            "attributes": { "name": "aero/alpha-rad" },
            "children": [
                {
                    "tag": "toradians",
                    "children": [ { "tag": "p", "text": "aero/alpha-deg" } ]
                }
            ]
        }"#,
    );

    // Second function consumes the published property like any other.
    let f = build(
        &ctx,
        r#"{
            "tag": "sin",
            "children": [ { "tag": "p", "text": "aero/alpha-rad" } ]
        }"#,
    );
    assert!((f.evaluate() - 1.0).abs() < 1e-12);

    ctx.properties().set("aero/alpha-deg", 0.0).unwrap();
    assert!(f.evaluate().abs() < 1e-12);
}
