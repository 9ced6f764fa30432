//! Scans the branch rate constant of a branched pathway and prints how the two control
//! patterns of the branch flux coefficient shift.
//!
//! Run with `RUST_LOG=info cargo run --example branch_scan`.

use std::rc::Rc;

use symca::prelude::*;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let model = load_model("tests/data/branched_pathway.json")?.into_shared();
    model.borrow_mut().recompute_steady_state(Verbosity::Loud)?;

    let shared: SharedModel = model.clone();
    let renderer: SharedRenderer = Rc::new(DefaultLatexRenderer);
    let sigma = Rc::new(CCBase::new(
        shared.clone(),
        "Sigma",
        SymExpr::parse("J_R2 * ecR2_S + J_R3 * ecR3_S - J_R1 * ecR1_S")?,
        renderer.clone(),
    ));
    let coefficient = CCoef::new(
        shared,
        "ccJR2_R2",
        SymExpr::parse("J_R3 * ecR3_S - J_R1 * ecR1_S")?,
        sigma,
        renderer,
    );

    println!("{}", coefficient.repr_latex()?);
    println!("{coefficient}");

    let range: Vec<f64> = (1..=10).map(|i| i as f64 * 0.5).collect();
    let result = coefficient.par_scan("k3", &range, "percentage", true)?;
    println!("{}", result.data);

    let values = coefficient.par_scan("k3", &range, "value", true)?;
    println!("{}", values.data);

    coefficient.recompute()?;
    println!("{coefficient}");

    Ok(())
}
