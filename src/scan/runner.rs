//! Parameter scan runner
//!
//! Scans assign a sequence of values to one model parameter. After each assignment the
//! model is quietly re-solved, the coefficient and all of its patterns are re-evaluated
//! in one batched pass, and either the pattern percentages or the pattern and
//! coefficient values are recorded.
//!
//! Scans validate their inputs and read the parameter's initial value before touching
//! the model. Once stepping has started, a failure leaves the parameter at the value of
//! the failing step; nothing is rolled back.

use log::{debug, info, warn};

use crate::{
    control::{coefficient::CCoef, error::SymcaError},
    model::Verbosity,
    scan::{
        result::{AxisProperties, AxisScale, ScanResult},
        setup::{ScanSetup, ScanSetupBuilder, ScanType},
    },
};

impl CCoef {
    /// Scans `parameter` over `scan_range` and tabulates the control patterns.
    ///
    /// # Arguments
    ///
    /// * `parameter` - Name of a settable model attribute
    /// * `scan_range` - Values to assign, in order
    /// * `scan_type` - `"percentage"` or `"value"`
    /// * `init_return` - Restore the parameter and re-solve the model afterwards
    ///
    /// # Errors
    ///
    /// Raised before the model is modified:
    ///
    /// * [`SymcaError::InvalidScanType`] for an unknown `scan_type`
    /// * [`SymcaError::InvalidScanRange`] for an empty or non-finite range
    /// * [`SymcaError::UnknownParameter`] for a parameter the model lacks
    /// * [`SymcaError::DuplicateColumn`] when the parameter shares its name with a
    ///   pattern or the coefficient
    pub fn par_scan(
        &self,
        parameter: &str,
        scan_range: &[f64],
        scan_type: &str,
        init_return: bool,
    ) -> Result<ScanResult, SymcaError> {
        let setup = ScanSetupBuilder::default()
            .parameter(parameter)
            .scan_range(scan_range.to_vec())
            .scan_type(scan_type.parse::<ScanType>()?)
            .init_return(init_return)
            .build()?;

        self.scan(&setup)
    }

    /// Runs the scan described by `setup`.
    ///
    /// Entity caches hold the values of the last scan step when this returns, even if
    /// the parameter was restored. Call [`CCoef::recompute`] to re-evaluate them.
    pub fn scan(&self, setup: &ScanSetup) -> Result<ScanResult, SymcaError> {
        setup.validate()?;

        let parameter = setup.parameter.as_str();
        let model = self.model().clone();
        let initial = model
            .borrow()
            .get(parameter)
            .map_err(|_| SymcaError::UnknownParameter(parameter.to_string()))?;

        let mut column_names = vec![parameter.to_string()];
        column_names.extend(self.control_patterns().keys().cloned());
        if setup.scan_type == ScanType::Value {
            column_names.push(self.name().to_string());
        }
        if column_names[1..].iter().any(|name| name == parameter) {
            return Err(SymcaError::DuplicateColumn(parameter.to_string()));
        }

        info!(
            "Scanning {parameter} over {} values ({}) for {}",
            setup.scan_range.len(),
            setup.scan_type,
            self.name()
        );

        let n_patterns = self.control_patterns().len();
        let n_columns = match setup.scan_type {
            ScanType::Percentage => n_patterns,
            ScanType::Value => n_patterns + 1,
        };
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(setup.scan_range.len()); n_columns];

        for (step, value) in setup.scan_range.iter().enumerate() {
            {
                let mut model = model.borrow_mut();
                model.set(parameter, *value)?;
                model.recompute_steady_state(Verbosity::Quiet)?;
            }

            let total = self.recompute()?;
            if step == 0 && !self.check_control_patterns()? {
                warn!(
                    "{} has control patterns of mixed sign, percentages do not partition it",
                    self.name()
                );
            }

            for (column, pattern) in columns.iter_mut().zip(self.control_patterns().values()) {
                column.push(match setup.scan_type {
                    ScanType::Percentage => pattern.percentage()?,
                    ScanType::Value => pattern.value()?,
                });
            }
            if setup.scan_type == ScanType::Value {
                columns[n_patterns].push(total);
            }

            debug!("{parameter} = {value}: {} = {total}", self.name());
        }

        if setup.init_return {
            let mut model = model.borrow_mut();
            model.set(parameter, initial)?;
            model.recompute_steady_state(Verbosity::Quiet)?;
            debug!("{parameter} restored to {initial}");
        }

        let x_label = if model.borrow().is_species(parameter) {
            format!("[{}]", parameter.replace('_', " "))
        } else {
            parameter.to_string()
        };
        let axis = AxisProperties {
            x_label,
            y_label: setup.scan_type.y_label().to_string(),
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            x_lim: [
                setup.scan_range[0],
                setup.scan_range[setup.scan_range.len() - 1],
            ],
        };

        let mut data = vec![setup.scan_range.clone()];
        data.extend(columns);

        info!("Finished scan of {parameter} for {}", self.name());
        ScanResult::new(&column_names, data, axis, setup.scan_type)
    }
}
