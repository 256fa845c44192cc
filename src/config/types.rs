//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Statutory tables and
//! policy defaults the engine relies on are all explicit fields here; the
//! calculators never fall back to hidden literals.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::RoundingPolicy;

/// One band in the progressive PAYE table.
///
/// Bands are ordered by `lower` bound; the final band has no upper bound.
#[derive(Debug, Clone, Deserialize)]
pub struct PayeBand {
    /// Lower bound of the band (exclusive, except 0 on the first band).
    pub lower: Decimal,
    /// Upper bound of the band (inclusive); `None` for the open top band.
    pub upper: Option<Decimal>,
    /// Marginal tax rate applied to income inside this band (e.g. `0.30`).
    pub rate: Decimal,
}

/// PAYE configuration: the ordered progressive band table.
#[derive(Debug, Clone, Deserialize)]
pub struct PayeConfig {
    /// Progressive bands ordered by ascending lower bound.
    pub bands: Vec<PayeBand>,
}

/// NSSF contribution configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NssfConfig {
    /// Employee contribution rate (e.g. `0.05`).
    pub employee_rate: Decimal,
    /// Employer contribution rate (e.g. `0.10`).
    pub employer_rate: Decimal,
    /// Monthly cap on the contribution base.
    pub monthly_cap: Decimal,
    /// Employees strictly older than this age are exempt.
    pub exemption_age: u32,
    /// Age assumed when an employee record carries no date of birth.
    pub default_employee_age: u32,
}

/// One band in the LST table, keyed by projected annual income.
///
/// Bands are contiguous and non-overlapping; the final band has no
/// upper bound.
#[derive(Debug, Clone, Deserialize)]
pub struct LstBand {
    /// Lower bound of annual income (exclusive, except 0 on the first band).
    pub lower: Decimal,
    /// Upper bound of annual income (inclusive); `None` for the top band.
    pub upper: Option<Decimal>,
    /// The annual LST liability for income in this band.
    pub annual_tax: Decimal,
}

/// LST configuration: the annual-income band table.
#[derive(Debug, Clone, Deserialize)]
pub struct LstConfig {
    /// Annual-income bands ordered by ascending lower bound.
    pub bands: Vec<LstBand>,
}

/// Statutory configuration loaded from `statutory.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatutoryConfig {
    /// Progressive PAYE band table.
    pub paye: PayeConfig,
    /// NSSF contribution rates and cap.
    pub nssf: NssfConfig,
    /// LST annual-income band table.
    pub lst: LstConfig,
    /// Rounding policy applied to every monetary output.
    pub rounding: RoundingPolicy,
    /// First calendar month of the fiscal year (7 = July).
    pub fiscal_year_start_month: u32,
}

/// The denominator used when computing a proration factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationBasis {
    /// Every calendar day of the month counts.
    CalendarDays,
    /// Only working days (Monday through Saturday) count.
    WorkingDays,
}

/// Proration policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProrationPolicy {
    /// Which days make up the proration denominator.
    pub basis: ProrationBasis,
}

/// Overtime policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimePolicy {
    /// Standard working hours per month used to derive the hourly rate
    /// from the monthly basic salary.
    pub standard_monthly_hours: Decimal,
    /// Multiplier for regular (weekday) overtime.
    pub regular_multiplier: Decimal,
    /// Multiplier for weekend overtime.
    pub weekend_multiplier: Decimal,
    /// Multiplier for public-holiday overtime.
    pub holiday_multiplier: Decimal,
}

/// Approval workflow policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalPolicy {
    /// Batches with total net pay at or above this amount require CEO
    /// approval in addition to HR and Finance.
    pub ceo_threshold_amount: Decimal,
}

/// Policy configuration loaded from `policy.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Proration settings.
    pub proration: ProrationPolicy,
    /// Overtime settings.
    pub overtime: OvertimePolicy,
    /// Approval workflow settings.
    pub approvals: ApprovalPolicy,
}

/// The complete payroll configuration.
///
/// Aggregates the statutory tables and policy settings loaded from the
/// configuration directory. Tests may construct one in code instead of
/// loading YAML.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    statutory: StatutoryConfig,
    policy: PolicyConfig,
}

impl PayrollConfig {
    /// Creates a new configuration from its component parts.
    pub fn new(statutory: StatutoryConfig, policy: PolicyConfig) -> Self {
        Self { statutory, policy }
    }

    /// Returns the built-in Ugandan statutory tables and default policy.
    ///
    /// Matches the shipped `config/uganda` YAML files. Useful for tests and
    /// for callers that do not load configuration from disk.
    pub fn uganda_defaults() -> Self {
        fn ugx(n: i64) -> Decimal {
            Decimal::from(n)
        }

        let paye = PayeConfig {
            bands: vec![
                PayeBand {
                    lower: ugx(0),
                    upper: Some(ugx(235_000)),
                    rate: Decimal::ZERO,
                },
                PayeBand {
                    lower: ugx(235_000),
                    upper: Some(ugx(335_000)),
                    rate: Decimal::new(10, 2),
                },
                PayeBand {
                    lower: ugx(335_000),
                    upper: Some(ugx(410_000)),
                    rate: Decimal::new(20, 2),
                },
                PayeBand {
                    lower: ugx(410_000),
                    upper: Some(ugx(10_000_000)),
                    rate: Decimal::new(30, 2),
                },
                PayeBand {
                    lower: ugx(10_000_000),
                    upper: None,
                    rate: Decimal::new(40, 2),
                },
            ],
        };

        let nssf = NssfConfig {
            employee_rate: Decimal::new(5, 2),
            employer_rate: Decimal::new(10, 2),
            monthly_cap: ugx(1_800_000),
            exemption_age: 55,
            default_employee_age: 35,
        };

        let lst = LstConfig {
            bands: vec![
                LstBand {
                    lower: ugx(0),
                    upper: Some(ugx(2_400_000)),
                    annual_tax: ugx(0),
                },
                LstBand {
                    lower: ugx(2_400_000),
                    upper: Some(ugx(4_800_000)),
                    annual_tax: ugx(10_000),
                },
                LstBand {
                    lower: ugx(4_800_000),
                    upper: Some(ugx(7_200_000)),
                    annual_tax: ugx(20_000),
                },
                LstBand {
                    lower: ugx(7_200_000),
                    upper: Some(ugx(9_600_000)),
                    annual_tax: ugx(30_000),
                },
                LstBand {
                    lower: ugx(9_600_000),
                    upper: Some(ugx(12_000_000)),
                    annual_tax: ugx(60_000),
                },
                LstBand {
                    lower: ugx(12_000_000),
                    upper: None,
                    annual_tax: ugx(100_000),
                },
            ],
        };

        let statutory = StatutoryConfig {
            paye,
            nssf,
            lst,
            rounding: RoundingPolicy::Round,
            fiscal_year_start_month: 7,
        };

        let policy = PolicyConfig {
            proration: ProrationPolicy {
                basis: ProrationBasis::CalendarDays,
            },
            overtime: OvertimePolicy {
                standard_monthly_hours: ugx(208),
                regular_multiplier: Decimal::new(15, 1),
                weekend_multiplier: ugx(2),
                holiday_multiplier: ugx(2),
            },
            approvals: ApprovalPolicy {
                ceo_threshold_amount: ugx(100_000_000),
            },
        };

        Self::new(statutory, policy)
    }

    /// Returns the statutory configuration.
    pub fn statutory(&self) -> &StatutoryConfig {
        &self.statutory
    }

    /// Returns the policy configuration.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Returns the rounding policy applied to monetary outputs.
    pub fn rounding(&self) -> RoundingPolicy {
        self.statutory.rounding
    }

    /// Returns the fiscal year containing the given calendar year/month,
    /// labelled by the calendar year it starts in.
    ///
    /// With a July start, 2025-07 through 2026-06 all belong to fiscal
    /// year 2025.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::PayrollConfig;
    ///
    /// let config = PayrollConfig::uganda_defaults();
    /// assert_eq!(config.fiscal_year_for(2025, 7), 2025);
    /// assert_eq!(config.fiscal_year_for(2026, 6), 2025);
    /// assert_eq!(config.fiscal_year_for(2026, 7), 2026);
    /// ```
    pub fn fiscal_year_for(&self, year: i32, month: u32) -> i32 {
        if month >= self.statutory.fiscal_year_start_month {
            year
        } else {
            year - 1
        }
    }

    /// Returns how many fiscal-year months remain from the given calendar
    /// month, counting the month itself.
    ///
    /// With a July start: July has 12 remaining months, June has 1.
    pub fn remaining_fiscal_months(&self, month: u32) -> u32 {
        let start = self.statutory.fiscal_year_start_month;
        let index = (month + 12 - start) % 12 + 1;
        13 - index
    }
}
