#[cfg(test)]
mod test_symca {
    use std::{cell::Cell, cell::RefCell, rc::Rc};

    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use symca::prelude::*;

    /// Renderer that counts how often it is asked to render.
    #[derive(Default)]
    struct CountingRenderer {
        latex_calls: Cell<usize>,
        string_calls: Cell<usize>,
    }

    impl LatexRenderer for CountingRenderer {
        fn expression_to_latex(&self, expr: &SymExpr) -> String {
            self.latex_calls.set(self.latex_calls.get() + 1);
            DefaultLatexRenderer.expression_to_latex(expr)
        }

        fn expression_to_string(&self, expr: &SymExpr) -> String {
            self.string_calls.set(self.string_calls.get() + 1);
            expr.to_string()
        }
    }

    /// Loads the branched pathway X0 -> S -> {X1, X2} and solves it once.
    fn branched_model() -> Rc<RefCell<AssignmentModel>> {
        let model = load_model("tests/data/branched_pathway.json")
            .unwrap()
            .into_shared();
        model
            .borrow_mut()
            .recompute_steady_state(Verbosity::Quiet)
            .unwrap();
        model
    }

    /// Builds the flux control coefficient of J_R2 with respect to R2.
    ///
    /// With k1 = 10, km1 = 1, k2 = k3 = 2 and X0 = 1 the steady state is S = 2,
    /// J_R1 = 8, J_R2 = J_R3 = 4 and ecR1_S = -0.25, so the denominator is 10 and the
    /// two patterns are 0.4 and 0.2.
    fn flux_coefficient(
        model: &Rc<RefCell<AssignmentModel>>,
        renderer: SharedRenderer,
    ) -> Rc<CCoef> {
        let shared: SharedModel = model.clone();
        let denominator = Rc::new(CCBase::new(
            shared.clone(),
            "Sigma",
            SymExpr::parse("J_R2 * ecR2_S + J_R3 * ecR3_S - J_R1 * ecR1_S").unwrap(),
            renderer.clone(),
        ));

        CCoef::new(
            shared,
            "ccJR2_R2",
            SymExpr::parse("J_R3 * ecR3_S - J_R1 * ecR1_S").unwrap(),
            denominator,
            renderer,
        )
    }

    #[test]
    fn test_value_matches_sum_of_patterns() {
        // ARRANGE
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));

        // ACT
        let value = coefficient.value().unwrap();
        let patterns: Vec<f64> = coefficient
            .control_patterns()
            .values()
            .map(|p| p.value().unwrap())
            .collect();

        // ASSERT
        assert_relative_eq!(value, 0.6, epsilon = 1e-12);
        assert_relative_eq!(patterns[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(patterns[1], 0.2, epsilon = 1e-12);
        assert_relative_eq!(value, patterns.iter().sum::<f64>(), epsilon = 1e-12);
    }

    #[test]
    fn test_coefficient_matches_direct_evaluation() {
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        let shared: SharedModel = model.clone();
        let direct = CCBase::new(
            shared,
            "direct",
            coefficient.expression().clone(),
            Rc::new(DefaultLatexRenderer),
        );

        assert_relative_eq!(
            coefficient.value().unwrap(),
            direct.value().unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_decomposition_is_deterministic() {
        let model = branched_model();
        let first = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        let second = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));

        let describe = |c: &CCoef| -> Vec<(String, String)> {
            c.control_patterns()
                .iter()
                .map(|(name, p)| (name.clone(), p.numerator().to_string()))
                .collect()
        };

        assert_eq!(describe(&first), describe(&second));
        assert_eq!(
            describe(&first),
            vec![
                ("CP1".to_string(), "J_R3*ecR3_S".to_string()),
                ("CP2".to_string(), "-J_R1*ecR1_S".to_string()),
            ]
        );
    }

    #[test]
    fn test_percentages_partition_same_sign_patterns() {
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));

        assert!(coefficient.check_control_patterns().unwrap());

        let percentages: Vec<f64> = coefficient
            .control_patterns()
            .values()
            .map(|p| p.percentage().unwrap())
            .collect();

        assert_relative_eq!(percentages.iter().sum::<f64>(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(percentages[0], 200.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_percentage_is_stable_across_calls() {
        // ARRANGE
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        let pattern = coefficient.pattern("CP1").unwrap();
        assert_relative_eq!(pattern.value().unwrap(), 0.4, epsilon = 1e-12);

        model.borrow_mut().set("k3", 1.0).unwrap();
        model
            .borrow_mut()
            .recompute_steady_state(Verbosity::Quiet)
            .unwrap();

        // ACT
        let first = pattern.percentage().unwrap();
        let second = pattern.percentage().unwrap();

        // ASSERT
        assert_relative_eq!(first, second, epsilon = 1e-12);
        assert_relative_eq!(first, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cached_value_survives_model_change() {
        // ARRANGE
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        let before = coefficient.value().unwrap();

        // ACT
        model.borrow_mut().set("k3", 1.0).unwrap();
        model
            .borrow_mut()
            .recompute_steady_state(Verbosity::Quiet)
            .unwrap();

        // ASSERT
        assert_relative_eq!(coefficient.value().unwrap(), before, epsilon = 1e-12);

        let fresh = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        assert_relative_eq!(fresh.value().unwrap(), 0.5, epsilon = 1e-12);

        assert_relative_eq!(coefficient.recompute().unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_renderings_are_computed_once() {
        let model = branched_model();
        let renderer = Rc::new(CountingRenderer::default());
        let coefficient = flux_coefficient(&model, renderer.clone());
        let pattern = coefficient.pattern("CP1").unwrap();

        let first = coefficient.latex_expression();
        let second = coefficient.latex_expression();
        assert_eq!(first, second);
        assert_eq!(renderer.latex_calls.get(), 1);

        pattern.latex_expression();
        pattern.latex_expression();
        assert_eq!(renderer.latex_calls.get(), 2);

        coefficient.string_expression();
        coefficient.string_expression();
        pattern.string_expression();
        pattern.string_expression();
        assert_eq!(renderer.string_calls.get(), 2);
    }

    #[test]
    fn test_latex_full_expression() {
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));

        assert_eq!(coefficient.latex_name(), "C^{JR2}_{R2}");
        assert_eq!(
            coefficient.latex_expression_full(),
            "\\frac{J_{R3} \\cdot \\varepsilon^{R3}_{S} - J_{R1} \\cdot \\varepsilon^{R1}_{S}}\
             {J_{R2} \\cdot \\varepsilon^{R2}_{S} + J_{R3} \\cdot \\varepsilon^{R3}_{S} \
             - J_{R1} \\cdot \\varepsilon^{R1}_{S}}"
        );
        assert_eq!(
            coefficient.pattern("CP2").unwrap().repr_latex().unwrap(),
            "$CP2 = -J_{R1} \\cdot \\varepsilon^{R1}_{S}/ \\,\\Sigma = 0.200$"
        );
    }

    #[test]
    fn test_display_table() {
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        let table = coefficient.to_string();

        assert!(table.contains("CP1"));
        assert!(table.contains("0.400"));
        assert!(table.contains("ccJR2_R2"));
        assert!(table.contains("0.600"));
    }

    #[test]
    fn test_unbound_symbol_propagates() {
        let model = branched_model();
        let shared: SharedModel = model.clone();
        let renderer: SharedRenderer = Rc::new(DefaultLatexRenderer);
        let denominator = Rc::new(CCBase::new(
            shared.clone(),
            "Sigma",
            SymExpr::number(1.0),
            renderer.clone(),
        ));
        let coefficient = CCoef::new(
            shared,
            "ccJ_x",
            SymExpr::parse("J_R1 + ecR9_S").unwrap(),
            denominator,
            renderer,
        );

        assert!(matches!(
            coefficient.value(),
            Err(SymcaError::UnboundVariable(name)) if name == "ecR9_S"
        ));
    }

    #[test]
    fn test_composition_discards_cache_state() {
        let model = branched_model();
        let coefficient = flux_coefficient(&model, Rc::new(DefaultLatexRenderer));
        coefficient.value().unwrap();

        let sum = coefficient
            .pattern("CP1")
            .unwrap()
            .add_expr(coefficient.pattern("CP2").unwrap());
        let shared: SharedModel = model.clone();
        let combined = CCBase::new(shared, "sum", sum, Rc::new(DefaultLatexRenderer));

        assert_relative_eq!(combined.value().unwrap(), 0.6, epsilon = 1e-12);
    }
}
