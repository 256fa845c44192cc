//! NSSF (National Social Security Fund) contribution calculation.
//!
//! Computes employee and employer contributions on the NSSF-applicable
//! gross, subject to a monthly cap on the contribution base and three
//! independent exemption paths.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::NssfConfig;

use super::rounding::{clamp_non_negative, RoundingPolicy};

/// Why an employee was exempted from NSSF contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NssfExemption {
    /// An explicit exemption was declared on the employee record.
    Declared {
        /// The declared reason.
        reason: String,
    },
    /// The employee is older than the exemption age.
    OverAge {
        /// The employee's age used for the check.
        age: u32,
    },
    /// The employment category is exempt from contributions.
    ExemptCategory {
        /// The exempt category name.
        category: String,
    },
}

/// Per-employee inputs to the NSSF calculation beyond the gross amount.
///
/// Each field feeds one of the exemption paths. `age` should be the
/// employee's age at the end of the period; when absent the configured
/// default age is assumed.
#[derive(Debug, Clone, Default)]
pub struct NssfOptions {
    /// Explicit exemption reason declared on the employee record.
    pub declared_exemption: Option<String>,
    /// The employee's age, if a date of birth is on record.
    pub age: Option<u32>,
    /// An exempt employment category, if the employee is in one.
    pub exempt_category: Option<String>,
}

/// The complete result of an NSSF calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NssfBreakdown {
    /// The gross amount the contribution was based on, after capping.
    pub contribution_base: Decimal,
    /// The employee's contribution.
    pub employee_contribution: Decimal,
    /// The employer's contribution.
    pub employer_contribution: Decimal,
    /// Whether the applicable gross exceeded the monthly cap.
    pub capped_at_maximum: bool,
    /// The exemption applied, if any. When set, both contributions are 0.
    pub exemption: Option<NssfExemption>,
}

impl NssfBreakdown {
    fn exempt(exemption: NssfExemption) -> Self {
        Self {
            contribution_base: Decimal::ZERO,
            employee_contribution: Decimal::ZERO,
            employer_contribution: Decimal::ZERO,
            capped_at_maximum: false,
            exemption: Some(exemption),
        }
    }
}

/// Computes NSSF contributions on the NSSF-applicable gross.
///
/// The exemption paths short-circuit in order: declared exemption, age
/// above the configured threshold, exempt employment category. Otherwise
/// the contribution base is the applicable gross capped at the configured
/// monthly maximum, and the employee/employer rates apply to the base.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_nssf, NssfOptions, RoundingPolicy};
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::uganda_defaults();
/// let breakdown = calculate_nssf(
///     Decimal::from(1_000_000),
///     &NssfOptions::default(),
///     &config.statutory().nssf,
///     RoundingPolicy::Round,
/// );
/// assert_eq!(breakdown.employee_contribution, Decimal::from(50_000));
/// assert_eq!(breakdown.employer_contribution, Decimal::from(100_000));
/// assert!(!breakdown.capped_at_maximum);
/// ```
pub fn calculate_nssf(
    applicable_gross: Decimal,
    options: &NssfOptions,
    config: &NssfConfig,
    rounding: RoundingPolicy,
) -> NssfBreakdown {
    if let Some(reason) = &options.declared_exemption {
        return NssfBreakdown::exempt(NssfExemption::Declared {
            reason: reason.clone(),
        });
    }

    let age = options.age.unwrap_or(config.default_employee_age);
    if age > config.exemption_age {
        return NssfBreakdown::exempt(NssfExemption::OverAge { age });
    }

    if let Some(category) = &options.exempt_category {
        return NssfBreakdown::exempt(NssfExemption::ExemptCategory {
            category: category.clone(),
        });
    }

    let gross = clamp_non_negative(applicable_gross);
    let capped_at_maximum = gross > config.monthly_cap;
    let contribution_base = gross.min(config.monthly_cap);

    NssfBreakdown {
        contribution_base,
        employee_contribution: rounding.apply(contribution_base * config.employee_rate),
        employer_contribution: rounding.apply(contribution_base * config.employer_rate),
        capped_at_maximum,
        exemption: None,
    }
}
